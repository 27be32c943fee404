use std::path::Path;

use test_case::test_case;

use crate::arch::Architecture;
use crate::cache::RoutineGenerator;
use crate::config::{CodeGenerator, GemmConfiguration, GemmTool};
use crate::error::*;
use crate::flops::Flops;
use crate::gemm::generator::{ExternalGemmRoutine, GemmParameters, PREFETCH_L2_VIA_C};
use crate::gemm::{GemmDescription, Sparsity, routine_name, sparsity_hash};
use crate::session::{EmitContext, Session};
use crate::sink::CodeSink;
use crate::test::fixtures::*;

fn params() -> GemmParameters {
    GemmParameters {
        m: 4,
        n: 4,
        k: 1,
        lda: 4,
        ldb: 6,
        ldc: 4,
        alpha: "1".to_string(),
        beta: "0".to_string(),
        aligned_a: true,
        aligned_c: true,
        trans_a: false,
        trans_b: false,
        prefetch: "pfsigonly".to_string(),
    }
}

fn routine(generator: CodeGenerator, sparsity: Option<Sparsity>) -> ExternalGemmRoutine {
    ExternalGemmRoutine {
        generator,
        params: params(),
        sparsity,
        host_arch: "hsw".to_string(),
        precision: 'D',
        typename: "double",
    }
}

#[test]
fn test_routine_name() {
    assert_eq!(
        routine_name("libxsmm", &params(), None),
        "libxsmm_m4_n4_k1_ldA4_ldB6_ldC4_alpha1_beta0_alignedA1_alignedC1_pfsigonly"
    );
}

#[test]
fn test_routine_name_transpose_suffix() {
    let transposed = GemmParameters { trans_b: true, ..params() };
    assert_eq!(
        routine_name("gemm", &transposed, None),
        "gemm_m4_n4_k1_ldA4_ldB6_ldC4_alpha1_beta0_alignedA1_alignedC1_transA0_transB1_pfsigonly"
    );
}

#[test]
fn test_routine_name_sparse() {
    let entries = [(0, 0), (2, 1)];
    let name = routine_name("pspamm", &params(), Some(&entries));
    let hash = sparsity_hash(&entries);

    assert_eq!(hash.len(), 16);
    assert!(name.starts_with(&format!("pspammsparse_{hash}_m4_")));
    assert_ne!(hash, sparsity_hash(&[(0, 0), (1, 2)]));
}

#[test]
fn test_libxsmm_arguments() {
    let args = routine(CodeGenerator::libxsmm("gen"), None).arg_list("kern", Path::new("/tmp/k.cpp"), None);
    assert_eq!(
        args,
        [
            "gen", "dense", "/tmp/k.cpp", "kern", "4", "4", "1", "4", "6", "4", "1", "0", "1", "1", "hsw", "pfsigonly",
            "DP"
        ]
    );
}

#[test]
fn test_libxsmm_sparse_arguments() {
    let args = routine(CodeGenerator::libxsmm("gen"), None).arg_list(
        "kern",
        Path::new("/tmp/k.cpp"),
        Some(Path::new("/tmp/a.mtx")),
    );
    assert_eq!(args[1], "sparse");
    assert_eq!(args.last().unwrap(), "/tmp/a.mtx");
}

#[test]
fn test_pspamm_arguments() {
    let args = routine(CodeGenerator::pspamm("pspamm.py"), None).arg_list(
        "kern",
        Path::new("/tmp/k.cpp"),
        Some(Path::new("/tmp/b.mtx")),
    );
    assert_eq!(
        args,
        [
            "pspamm.py",
            "4",
            "4",
            "1",
            "4",
            "6",
            "4",
            "1",
            "0",
            "--arch",
            "hsw",
            "--prefetching",
            "pfsigonly",
            "--output_funcname",
            "kern",
            "--output_filename",
            "/tmp/k.cpp",
            "--precision",
            "D",
            "--mtx_filename",
            "/tmp/b.mtx",
        ]
    );
}

#[test_case(CodeGenerator::libxsmm("gen"), "void k(const double* A, const double* B, double* C, const double* A_prefetch, const double* B_prefetch, const double* C_prefetch);"; "libxsmm")]
#[test_case(CodeGenerator::pspamm("gen"), "void k(const double* A, const double* B, double* C, double alpha, double beta, const double* prefetch);"; "pspamm")]
fn test_declaration(generator: CodeGenerator, expected: &str) {
    assert_eq!(routine(generator, None).declaration("k"), expected);
}

#[test]
fn test_identity_covers_sparsity() {
    let dense = routine(CodeGenerator::libxsmm("gen"), None);
    let sparse = routine(CodeGenerator::libxsmm("gen"), Some(Sparsity { entries: vec![(0, 0)], rows: 4 }));
    assert_ne!(dense.identity(), sparse.identity());
    assert_eq!(dense.identity(), routine(CodeGenerator::libxsmm("gen"), None).identity());
}

#[test]
fn test_identity_ignores_allocated_rows() {
    let sparsity = |rows| Some(Sparsity { entries: vec![(0, 0), (1, 1)], rows });
    let six = routine(CodeGenerator::pspamm("gen"), sparsity(6));
    let eight = routine(CodeGenerator::pspamm("gen"), sparsity(8));
    assert_eq!(six.identity(), eight.identity());
}

#[test]
fn test_prefetch_mode() {
    let arch = Architecture::from_identifier("dskx").unwrap();
    let d = GemmDescription::builder()
        .result(dense("C", 8, 8))
        .left(dense("A", 8, 8))
        .right(dense("B", 8, 8))
        .arch(&arch)
        .prefetch_name("Cprefetch")
        .build()
        .unwrap();
    assert_eq!(GemmParameters::new(&d, true).prefetch, PREFETCH_L2_VIA_C);
    assert_eq!(GemmParameters::new(&d, false).prefetch, "pfsigonly");
}

fn libxsmm_session(cmd: &str) -> Session {
    let configuration = GemmConfiguration::new(vec![GemmTool::Generator(CodeGenerator::libxsmm(cmd))]);
    Session::with_configuration(hsw(), configuration)
}

#[test]
fn test_call_site_and_registration() {
    let mut session = libxsmm_session("true");
    let mut sink = CodeSink::new();
    let arch = hsw();
    let d = GemmDescription::builder()
        .result(dense("C", 4, 4))
        .left(dense("A", 4, 4))
        .right(dense("B", 4, 4))
        .arch(&arch)
        .build()
        .unwrap();

    let flops = session.generate_gemm(&mut sink, &d).unwrap();
    session.generate_gemm(&mut sink, &d).unwrap();

    let name = "libxsmm_m4_n4_k4_ldA4_ldB4_ldC4_alpha1_beta0_alignedA1_alignedC1_pfsigonly";
    assert_eq!(flops, Flops::Exact(128));
    let call = format!("{name}(A, B, C, nullptr, nullptr, nullptr);");
    assert_eq!(sink.lines(), [call.clone(), call]);
    assert_eq!(session.cache().names().collect::<Vec<_>>(), [name]);

    let dir = tempfile::tempdir().unwrap();
    let mut header = CodeSink::new();
    assert_eq!(session.finish(&dir.path().join("gemms.cpp"), &mut header).unwrap(), 1);
    assert!(header.lines().iter().any(|l| l == "#include <immintrin.h>"));
    assert!(header.lines().last().unwrap().starts_with(&format!("void {name}(const double* A")));
}

#[test]
fn test_pspamm_call_passes_scalars() {
    let configuration = GemmConfiguration::new(vec![GemmTool::Generator(CodeGenerator::pspamm("true"))]);
    let mut session = Session::with_configuration(hsw(), configuration);
    let mut sink = CodeSink::new();
    let arch = hsw();
    let d = GemmDescription::builder()
        .result(dense("C", 4, 4))
        .left(dense("A", 4, 4))
        .right(csc("B", 4, 4, &[[0, 0], [3, 3]]))
        .arch(&arch)
        .alpha(2.0)
        .beta(1.0)
        .build()
        .unwrap();

    assert_eq!(session.generate_gemm(&mut sink, &d).unwrap(), Flops::Exact(16));
    let line = &sink.lines()[0];
    assert!(line.starts_with("pspammsparse_"));
    assert!(line.ends_with("(A, B, C, 2.0, 1.0, nullptr);"));
}

#[test]
fn test_transpose_rejected() {
    let mut session = libxsmm_session("true");
    let mut sink = CodeSink::new();
    let arch = hsw();
    let generator = CodeGenerator::libxsmm("true");
    let transposed = GemmDescription::builder()
        .result(dense("C", 4, 4))
        .left(dense("A", 4, 4))
        .right(dense("B", 4, 4))
        .arch(&arch)
        .trans_a(true)
        .build()
        .unwrap();

    let mut ctx = EmitContext::new(&mut sink, &mut session);
    let result = crate::gemm::generator::generate(&generator, &transposed, &mut ctx);
    assert!(matches!(result, Err(Error::TransposeUnsupported { .. })));
}

#[test]
fn test_missing_generator_surfaces_at_finish() {
    let mut session = libxsmm_session("logemm-no-such-generator");
    let mut sink = CodeSink::new();
    let arch = hsw();
    let d = GemmDescription::builder()
        .result(dense("C", 4, 4))
        .left(dense("A", 4, 4))
        .right(dense("B", 4, 4))
        .arch(&arch)
        .build()
        .unwrap();
    session.generate_gemm(&mut sink, &d).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let result = session.finish(&dir.path().join("gemms.cpp"), &mut CodeSink::new());
    assert!(matches!(result, Err(Error::ToolNotFound { .. })));
}

/// `C(4x4) = A(4xR) * B(Rx4)` with `B` compressed and nonzero on the diagonal only.
fn diagonal_product(arch: &Architecture, rows: usize) -> GemmDescription {
    GemmDescription::builder()
        .result(dense("C", 4, 4))
        .left(dense("A", 4, rows))
        .right(csc("B", rows, 4, &[[0, 0], [1, 1], [2, 2], [3, 3]]))
        .arch(arch)
        .build()
        .unwrap()
}

#[test]
fn test_same_name_different_allocation_shares_routine() {
    let arch = Architecture::from_identifier("dskx").unwrap();
    let configuration = GemmConfiguration::new(vec![GemmTool::Generator(CodeGenerator::pspamm("true"))]);
    let mut session = Session::with_configuration(arch.clone(), configuration);
    let mut sink = CodeSink::new();

    session.generate_gemm(&mut sink, &diagonal_product(&arch, 6)).unwrap();
    session.generate_gemm(&mut sink, &diagonal_product(&arch, 8)).unwrap();

    assert_eq!(sink.len(), 2);
    assert_eq!(sink.lines()[0], sink.lines()[1]);
    assert!(sink.lines()[0].starts_with("pspammsparse_"));
    assert_eq!(session.cache().len(), 1);
}
