use std::collections::HashSet;

use proptest::prelude::*;

use crate::{BoundingBox, DenseLayout, Indices};

use super::generators::*;

proptest! {
    /// Column-major addresses are distinct and fit into the allocation.
    #[test]
    fn dense_addresses_injective(shape in small_shape()) {
        let layout = DenseLayout::new(&shape);
        let entries = BoundingBox::from_shape(&shape).entries();
        let mut seen = HashSet::new();
        for entry in &entries {
            let address = layout.address(entry).unwrap();
            prop_assert!(address < layout.required_reals());
            prop_assert!(seen.insert(address));
        }
        prop_assert_eq!(seen.len(), shape.iter().product::<usize>());
    }

    /// Every fused coordinate lies inside the defused per-index box.
    #[test]
    fn defuse_covers_fused_range(((rows, cols), fused) in fused_range()) {
        let indices = Indices::new("ij", &[rows, cols]).unwrap();
        let ranges = DenseLayout::new(&[rows, cols]).defuse(fused, &indices, &indices);
        for x in fused.iter() {
            prop_assert!(ranges[&'i'].contains_index(x % rows));
            prop_assert!(ranges[&'j'].contains_index(x / rows));
        }
    }
}
