use crate::flops::Flops;

#[test]
fn test_exact_arithmetic() {
    let total: Flops = [Flops::Exact(2), Flops::Exact(3)].into_iter().sum();
    assert_eq!(total, Flops::Exact(5));
    assert_eq!(total.scaled(4), Flops::Exact(20));
    assert_eq!(total.exact(), Some(5));
}

#[test]
fn test_unknown_is_absorbing() {
    let mut flops = Flops::Exact(10);
    flops += Flops::Unknown;
    assert_eq!(flops, Flops::Unknown);
    assert_eq!(flops.scaled(3), Flops::Unknown);
    assert_eq!(flops.exact(), None);
    assert_eq!(flops.to_string(), "unknown");
}

#[test]
fn test_default_is_zero() {
    assert_eq!(Flops::default(), Flops::ZERO);
}
