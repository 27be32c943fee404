use smallvec::SmallVec;

use crate::{BoundingBox, Indices, LoopRanges, Range};

fn entry(values: &[usize]) -> SmallVec<[usize; 4]> {
    SmallVec::from_slice(values)
}

#[test]
fn test_entries_first_axis_fastest() {
    let bbox = BoundingBox::new([Range::new(0, 2), Range::new(1, 3)]);
    assert_eq!(bbox.entries(), vec![entry(&[0, 1]), entry(&[1, 1]), entry(&[0, 2]), entry(&[1, 2])]);
    assert_eq!(bbox.size(), 4);
}

#[test]
fn test_entries_degenerate() {
    assert_eq!(BoundingBox::new([]).entries(), vec![entry(&[])]);
    assert!(BoundingBox::new([Range::new(0, 3), Range::empty()]).entries().is_empty());
}

#[test]
fn test_contains_and_intersection() {
    let outer = BoundingBox::from_shape(&[4, 4]);
    let inner = BoundingBox::new([Range::new(1, 3), Range::new(0, 2)]);
    assert!(outer.contains(&inner));
    assert!(!inner.contains(&outer));
    assert!(!outer.contains(&BoundingBox::from_shape(&[4])), "rank mismatch is never contained");

    let other = BoundingBox::new([Range::new(2, 4), Range::new(1, 4)]);
    assert_eq!(inner.intersection(&other), BoundingBox::new([Range::new(2, 3), Range::new(1, 2)]));
    assert!(inner.contains_entry(&[2, 1]));
    assert!(!inner.contains_entry(&[3, 1]));
}

#[test]
fn test_from_loop_ranges() {
    let indices = Indices::new("ij", &[4, 5]).unwrap();
    let mut ranges = LoopRanges::new();
    ranges.insert('j', Range::new(1, 2));
    assert_eq!(BoundingBox::from_loop_ranges(&indices, &ranges), None);

    ranges.insert('i', Range::new(0, 3));
    let bbox = BoundingBox::from_loop_ranges(&indices, &ranges).unwrap();
    assert_eq!(bbox.ranges(), &[Range::new(0, 3), Range::new(1, 2)]);
}

#[test]
fn test_display() {
    let bbox = BoundingBox::new([Range::new(0, 2), Range::new(1, 3)]);
    assert_eq!(bbox.to_string(), "([0, 2), [1, 3))");
}
