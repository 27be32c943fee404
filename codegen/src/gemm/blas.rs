//! Direct calls into a CBLAS-style library.

use crate::config::BlasLike;
use crate::error::*;
use crate::gemm::GemmDescription;
use crate::session::EmitContext;

/// Write one library call for `d`. Nothing is registered: the routine exists.
pub fn generate(blas: &BlasLike, d: &GemmDescription, ctx: &mut EmitContext<'_>) -> Result<u64> {
    d.check_windows()?;
    let (m, n, k) = d.mnk();
    let (lda, ldb, ldc) = d.leading_dimensions();
    let (a, b, c) = d.pointers()?;
    let dtype = ctx.arch().dtype();

    let call = blas.call(
        d.trans_a(),
        d.trans_b(),
        (m.size(), n.size(), k.size()),
        &d.alpha().render(dtype),
        (&a, lda),
        (&b, ldb),
        &d.beta().render(dtype),
        (&c, ldc),
    );
    ctx.sink.line(call);
    Ok(d.flops())
}
