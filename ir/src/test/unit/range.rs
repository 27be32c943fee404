//! Interval algebra tests.

use test_case::test_case;

use crate::Range;
use crate::error::Error;

#[test_case(Range::new(2, 5), Range::new(4, 8), Range::new(4, 5); "overlapping")]
#[test_case(Range::new(0, 10), Range::new(3, 4), Range::new(3, 4); "nested")]
#[test_case(Range::new(0, 2), Range::new(5, 7), Range::new(5, 5); "disjoint collapses to empty")]
fn test_intersection(a: Range, b: Range, expected: Range) {
    assert_eq!(a & b, expected);
    assert_eq!(b & a, expected);
}

#[test_case(Range::new(3, 13), 8, Range::new(0, 16); "both ends move")]
#[test_case(Range::new(8, 16), 8, Range::new(8, 16); "already aligned")]
#[test_case(Range::new(5, 7), 1, Range::new(5, 7); "unit alignment")]
#[test_case(Range::new(0, 0), 4, Range::new(0, 0); "empty")]
fn test_aligned(range: Range, alignment: usize, expected: Range) {
    assert_eq!(range.aligned(alignment), expected);
}

#[test]
fn test_contains() {
    let outer = Range::new(0, 10);
    assert!(outer.contains(&Range::new(2, 3)));
    assert!(outer.contains(&Range::new(20, 20)), "empty ranges are contained everywhere");
    assert!(!Range::new(2, 3).contains(&outer));
    assert!(outer.contains_index(9));
    assert!(!outer.contains_index(10));
}

#[test]
fn test_try_new_rejects_inverted() {
    assert_eq!(Range::try_new(5, 2), Err(Error::InvalidRange { start: 5, stop: 2 }));
    assert_eq!(Range::try_new(2, 2), Ok(Range::new(2, 2)));
}

#[test]
fn test_size_and_iter() {
    let range = Range::try_from(3..7).unwrap();
    assert_eq!(range.size(), 4);
    assert_eq!(range.iter().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
    assert!(!range.is_empty());
    assert!(Range::empty().is_empty());
}

#[test]
fn test_try_from_inverted_range() {
    #[allow(clippy::reversed_empty_ranges)]
    let inverted = Range::try_from(6..2);
    assert_eq!(inverted, Err(Error::InvalidRange { start: 6, stop: 2 }));
}

#[test]
fn test_display() {
    assert_eq!(Range::new(1, 4).to_string(), "[1, 4)");
}
