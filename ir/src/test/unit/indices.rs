use test_case::test_case;

use crate::Indices;
use crate::error::Error;

#[test]
fn test_new_and_queries() {
    let indices = Indices::new("ijk", &[2, 3, 4]).unwrap();
    assert_eq!(indices.len(), 3);
    assert_eq!(indices.to_string(), "ijk");
    assert_eq!(indices.shape().as_slice(), &[2, 3, 4]);
    assert_eq!(indices.position('k'), Some(2));
    assert_eq!(indices.size_of('j'), Ok(3));
    assert_eq!(indices.first(), Some('i'));
    assert!(Indices::empty().first().is_none());
}

#[test]
fn test_duplicate_index() {
    assert_eq!(Indices::new("iji", &[1, 2, 3]), Err(Error::DuplicateIndex { index: 'i', names: "iji".into() }));
}

#[test]
fn test_arity_mismatch() {
    assert!(matches!(
        Indices::new("ij", &[1]),
        Err(Error::IndexArity { names_len: 2, sizes_len: 1, .. })
    ));
}

#[test]
fn test_unknown_index() {
    let indices = Indices::new("ij", &[1, 2]).unwrap();
    assert!(matches!(indices.size_of('x'), Err(Error::UnknownIndex { index: 'x', .. })));
}

#[test_case("ijk", "j", "ik"; "middle")]
#[test_case("ijk", "kji", ""; "everything")]
#[test_case("ijk", "xy", "ijk"; "unrelated")]
fn test_difference(left: &str, right: &str, expected: &str) {
    let a = Indices::new(left, &vec![2; left.len()]).unwrap();
    let b = Indices::new(right, &vec![2; right.len()]).unwrap();
    assert_eq!((&a - &b).to_string(), expected);
}

#[test]
fn test_intersection_keeps_left_order() {
    let a = Indices::new("ijk", &[2, 3, 4]).unwrap();
    let b = Indices::new("kj", &[4, 3]).unwrap();
    assert_eq!((&a & &b).to_string(), "jk");
    assert_eq!((&b & &a).to_string(), "kj");
}

#[test]
fn test_positions_sorted() {
    let a = Indices::new("ijk", &[2, 3, 4]).unwrap();
    let b = Indices::new("kix", &[4, 2, 1]).unwrap();
    assert_eq!(a.positions(&b).as_slice(), &[0, 2]);
}
