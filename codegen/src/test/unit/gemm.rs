use logemm_ir::{BoundingBox, DenseLayout, Range, SparsityPattern, TensorDescription};

use crate::error::*;
use crate::gemm::{GemmDescription, Sparsity};
use crate::test::fixtures::*;

#[test]
fn test_dense_flops() {
    let arch = hsw();
    let d = GemmDescription::builder()
        .result(dense("C", 8, 8))
        .left(dense("A", 8, 8))
        .right(dense("B", 8, 8))
        .arch(&arch)
        .build()
        .unwrap();

    assert_eq!(d.mnk(), (Range::new(0, 8), Range::new(0, 8), Range::new(0, 8)));
    assert_eq!(d.flops(), 1024);
    assert_eq!(d.leading_dimensions(), (8, 8, 8));
    assert!(d.aligned_a() && d.aligned_c());
    assert!(d.sparsity().is_none());
}

#[test]
fn test_sparse_flops_count_window_nonzeros() {
    let arch = hsw();
    let d = GemmDescription::builder()
        .result(dense("C", 4, 8))
        .left(csc("A", 4, 4, &[[0, 0], [1, 1], [2, 2], [3, 3]]))
        .right(dense("B", 4, 8))
        .arch(&arch)
        .build()
        .unwrap();

    assert!(d.is_a_csc());
    assert_eq!(d.flops(), 64);
    assert_eq!(d.leading_dimensions(), (0, 4, 4));
    assert_eq!(d.sparsity(), Some(Sparsity { entries: vec![(0, 0), (1, 1), (2, 2), (3, 3)], rows: 4 }));
}

#[test]
fn test_pattern_restricts_window() {
    let arch = hsw();
    let d = GemmDescription::builder()
        .result(dense("C", 8, 8))
        .left(dense_with_pattern("A", 8, 8, &[[4, 0], [7, 3]]))
        .right(dense_with_pattern("B", 8, 8, &[[0, 0], [3, 5]]))
        .arch(&arch)
        .build()
        .unwrap();

    assert_eq!(d.mnk(), (Range::new(4, 8), Range::new(0, 6), Range::new(0, 4)));
    assert_eq!(d.flops(), 192);
    assert_eq!(d.pointers().unwrap(), ("A + 4".to_string(), "B".to_string(), "C + 4".to_string()));
}

#[test]
fn test_transposed_pointer() {
    let a = dense("A", 8, 8);
    assert_eq!(GemmDescription::pointer(&a, (1, 2), true).unwrap(), "A + 10");
    assert_eq!(GemmDescription::pointer(&a, (1, 2), false).unwrap(), "A + 17");
    assert_eq!(GemmDescription::pointer(&a, (0, 0), false).unwrap(), "A");
}

#[test]
fn test_transposed_k_axis() {
    let arch = hsw();
    let d = GemmDescription::builder()
        .result(dense("C", 2, 3))
        .left(dense("A", 4, 2))
        .right(dense("B", 3, 4))
        .arch(&arch)
        .trans_a(true)
        .trans_b(true)
        .build()
        .unwrap();

    assert_eq!(d.mnk(), (Range::new(0, 2), Range::new(0, 3), Range::new(0, 4)));
    assert!(!d.aligned_a());
    d.check_windows().unwrap();
}

#[test]
fn test_unaligned_start_clears_flags() {
    let arch = hsw();
    let d = GemmDescription::builder()
        .result(dense("C", 6, 4))
        .left(dense_with_pattern("A", 6, 3, &[[1, 0], [3, 2]]))
        .right(dense("B", 3, 4))
        .arch(&arch)
        .build()
        .unwrap();

    assert_eq!(d.mnk().0, Range::new(1, 4));
    assert!(!d.aligned_a());
    assert!(!d.aligned_c());
}

#[test]
fn test_aligned_start_flags_are_honored() {
    let arch = hsw();
    let d = GemmDescription::builder()
        .result(dense("C", 8, 8))
        .left(dense("A", 8, 8))
        .right(dense("B", 8, 8))
        .arch(&arch)
        .aligned_start_a(false)
        .build()
        .unwrap();

    assert!(!d.aligned_a());
    assert!(d.aligned_c());
}

#[test]
fn test_sparse_times_sparse() {
    let arch = hsw();
    let result = GemmDescription::builder()
        .result(dense("C", 2, 2))
        .left(csc("A", 2, 2, &[[0, 0]]))
        .right(csc("B", 2, 2, &[[1, 1]]))
        .arch(&arch)
        .build();
    assert!(matches!(result, Err(Error::SparseTimesSparse { .. })));
}

#[test]
fn test_operand_rank() {
    let arch = hsw();
    let vector = TensorDescription::new("A", DenseLayout::new(&[4]), SparsityPattern::dense(&[4]));
    let result =
        GemmDescription::builder().result(dense("C", 4, 4)).left(vector).right(dense("B", 4, 4)).arch(&arch).build();
    assert!(matches!(result, Err(Error::OperandRank { rank: 1, .. })));
}

#[test]
fn test_result_too_small() {
    let arch = hsw();
    let result = GemmDescription::builder()
        .result(dense("C", 4, 4))
        .left(dense("A", 8, 4))
        .right(dense("B", 4, 4))
        .arch(&arch)
        .build();
    assert!(matches!(result, Err(Error::OutOfBounds { axis, .. }) if axis == "m"));
}

#[test]
fn test_window_outside_stored_box() {
    let arch = hsw();
    let layout = DenseLayout::with_bounding_box(&[8, 8], BoundingBox::new([Range::new(0, 4), Range::new(0, 8)])).unwrap();
    let a = TensorDescription::new("A", layout, SparsityPattern::dense(&[8, 8]));
    let d =
        GemmDescription::builder().result(dense("C", 8, 8)).left(a).right(dense("B", 8, 8)).arch(&arch).build().unwrap();
    assert!(matches!(d.check_windows(), Err(Error::OutOfBounds { operand, .. }) if operand == "A"));
}

#[test]
fn test_query() {
    let arch = hsw();
    let mut d = GemmDescription::builder()
        .result(dense("C", 4, 4))
        .left(dense("A", 4, 4))
        .right(dense("B", 4, 4))
        .arch(&arch)
        .alpha("alpha")
        .build()
        .unwrap();
    d.set_beta(1.0);

    let q = d.query(arch.target());
    assert_eq!((q.m, q.n, q.k), (4, 4, 4));
    assert!(!q.alpha.is_literal());
    assert!(q.beta.is_one());
}
