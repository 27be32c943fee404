use std::str::FromStr;

use test_case::test_case;

use crate::arch::{Architecture, Target};
use crate::error::Error;
use logemm_dtype::ScalarDType;

#[test_case("dhsw", "hsw", ScalarDType::Float64, 32, false; "haswell_double")]
#[test_case("ssnb", "snb", ScalarDType::Float32, 32, false; "sandy_bridge_single")]
#[test_case("dskx", "skx", ScalarDType::Float64, 64, true; "skylake_prefetch")]
#[test_case("da64fx", "a64fx", ScalarDType::Float64, 64, true; "a64fx")]
#[test_case("sneon", "neon", ScalarDType::Float32, 16, false; "neon")]
fn test_from_identifier(identifier: &str, name: &str, dtype: ScalarDType, alignment: usize, prefetch: bool) {
    let arch = Architecture::from_identifier(identifier).unwrap();
    assert_eq!(arch.name(), name);
    assert_eq!(arch.dtype(), dtype);
    assert_eq!(arch.alignment(), alignment);
    assert_eq!(arch.enable_prefetch(), prefetch);
    assert_eq!(arch.target(), Target::Cpu);
}

#[test_case("xhsw"; "bad_precision")]
#[test_case("dpentium"; "unknown_name")]
#[test_case(""; "empty")]
fn test_unknown_identifier(identifier: &str) {
    let result = Architecture::from_identifier(identifier);
    assert!(matches!(result, Err(Error::UnknownArchitecture { .. })));
}

#[test]
fn test_aligned_reals() {
    let double = Architecture::from_identifier("dhsw").unwrap();
    assert_eq!(double.aligned_reals(), 4);
    assert!(double.check_alignment(8));
    assert!(!double.check_alignment(6));

    let single = Architecture::from_identifier("sskx").unwrap();
    assert_eq!(single.aligned_reals(), 16);
    assert_eq!(single.typename(), "float");
    assert_eq!(single.precision(), 'S');
}

#[test]
fn test_builder_defaults() {
    let arch = Architecture::builder().name("custom").build();
    assert_eq!(arch.dtype(), ScalarDType::Float64);
    assert_eq!(arch.alignment(), 32);
    assert_eq!(arch.backend(), "cpp");
    assert!(!arch.is_batched());
    assert!(!arch.has_accelerator());
    assert_eq!(arch.host_name(), "custom");
}

#[test]
fn test_host_name_override() {
    let arch = Architecture::builder().name("skx").host_name("skylake-avx512").build();
    assert_eq!(arch.name(), "skx");
    assert_eq!(arch.host_name(), "skylake-avx512");
}

#[test]
fn test_target_names() {
    assert_eq!(Target::from_str("gpu").unwrap(), Target::Gpu);
    assert_eq!(Target::Cpu.to_string(), "cpu");
    let gpu = Architecture::builder().name("sm_80").target(Target::Gpu).build();
    assert!(gpu.is_batched());
}
