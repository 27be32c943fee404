use crate::error::Error;
use crate::{
    DenseLayout, IndexedTensorDescription, Indices, LoopRanges, Range, SparsityPattern, loop_ranges_contained,
    loop_ranges_equal,
};

fn ranges(entries: &[(char, usize, usize)]) -> LoopRanges {
    entries.iter().map(|&(n, a, b)| (n, Range::new(a, b))).collect()
}

#[test]
fn test_shape_validation() {
    let indices = Indices::new("ij", &[4, 4]).unwrap();
    let result =
        IndexedTensorDescription::new("A", indices.clone(), DenseLayout::new(&[4, 4]), SparsityPattern::dense(&[4, 3]));
    assert!(matches!(result, Err(Error::ShapeMismatch { .. })));

    let result =
        IndexedTensorDescription::new("A", indices, DenseLayout::new(&[4, 5]), SparsityPattern::dense(&[4, 4]));
    assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
}

#[test]
fn test_loop_ranges_from_pattern() {
    let indices = Indices::new("ij", &[4, 4]).unwrap();
    let pattern = SparsityPattern::from_nonzeros(&[4, 4], [[1, 0], [2, 3]]).unwrap();
    let term = IndexedTensorDescription::new("A", indices, DenseLayout::new(&[4, 4]), pattern).unwrap();

    let loops = Indices::new("jx", &[4, 2]).unwrap();
    assert_eq!(term.loop_ranges(&loops), ranges(&[('j', 0, 4)]));

    let all = Indices::new("ij", &[4, 4]).unwrap();
    assert_eq!(term.loop_ranges(&all), ranges(&[('i', 1, 3), ('j', 0, 4)]));
}

#[test]
fn test_flags_carry_into_view() {
    let term = IndexedTensorDescription::dense("_tmp0", Indices::new("ij", &[2, 2]).unwrap()).temporary(true);
    let view = term.with_view(term.layout.clone(), term.pattern.clone());
    assert!(view.is_temporary);
    assert!(!view.is_compute_constant);
    assert_eq!(view.name, "_tmp0");
}

#[test]
fn test_loop_range_comparisons() {
    let a = ranges(&[('i', 0, 2)]);
    let b = ranges(&[('i', 0, 2), ('j', 1, 3)]);
    let c = ranges(&[('i', 0, 3)]);
    assert!(loop_ranges_equal(&a, &b));
    assert!(!loop_ranges_equal(&a, &c));
    assert!(loop_ranges_contained(&a, &c));
    assert!(!loop_ranges_contained(&c, &a));
    assert!(loop_ranges_contained(&ranges(&[('k', 0, 9)]), &a), "unshared indices are unconstrained");
}
