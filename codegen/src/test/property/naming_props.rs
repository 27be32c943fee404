use proptest::prelude::*;

use crate::gemm::generator::GemmParameters;
use crate::gemm::routine_name;

fn class() -> impl Strategy<Value = String> {
    prop_oneof![Just("0".to_string()), Just("1".to_string()), Just("generic".to_string())]
}

prop_compose! {
    fn parameters()(
        (m, n, k) in (1usize..64, 1usize..64, 1usize..64),
        (lda, ldb, ldc) in (0usize..128, 0usize..128, 0usize..128),
        alpha in class(),
        beta in class(),
        flags in any::<[bool; 4]>(),
        prefetch in prop_oneof![Just("BL2viaC".to_string()), Just("pfsigonly".to_string())],
    ) -> GemmParameters {
        let [aligned_a, aligned_c, trans_a, trans_b] = flags;
        GemmParameters { m, n, k, lda, ldb, ldc, alpha, beta, aligned_a, aligned_c, trans_a, trans_b, prefetch }
    }
}

proptest! {
    /// Equal inputs give equal names.
    #[test]
    fn name_is_deterministic(params in parameters()) {
        prop_assert_eq!(routine_name("libxsmm", &params, None), routine_name("libxsmm", &params.clone(), None));
    }

    /// Distinct parameters never share a name.
    #[test]
    fn name_is_injective(a in parameters(), b in parameters()) {
        prop_assume!(a != b);
        prop_assert_ne!(routine_name("gemm", &a, None), routine_name("gemm", &b, None));
    }

    /// Sparse routines never collide with dense ones or with other patterns.
    #[test]
    fn sparsity_changes_name(
        params in parameters(),
        a in prop::collection::btree_set((0usize..8, 0usize..8), 1..6),
        b in prop::collection::btree_set((0usize..8, 0usize..8), 1..6),
    ) {
        let a: Vec<_> = a.into_iter().collect();
        let b: Vec<_> = b.into_iter().collect();
        let dense = routine_name("pspamm", &params, None);
        let sparse = routine_name("pspamm", &params, Some(&a));
        prop_assert_ne!(&dense, &sparse);
        if a != b {
            prop_assert_ne!(sparse, routine_name("pspamm", &params, Some(&b)));
        }
    }
}
