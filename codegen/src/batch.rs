//! Accelerator batch buffer.
//!
//! On batched targets nothing is written to the host sink while a kernel is being
//! assembled. Loop structure, pointer re-bases, zero fills and the operations
//! themselves are recorded here in emission order and handed to the accelerator
//! service as a whole when the kernel's result is final.

use std::ops::{Deref, DerefMut};

use itertools::Itertools;
use logemm_ir::Range;

use crate::gemm::accelerator::BatchedGemm;
use crate::product::BatchedProduct;
use crate::session::Session;

/// Number of batch instances the launcher iterates over.
pub const NUM_ELEMENTS: &str = "NumElements";
/// Per-instance skip mask.
pub const FLAGS: &str = "Flags";
/// Execution stream handle.
pub const STREAM_PTR: &str = "StreamPtr";
/// Prefix of per-operand offset arguments of pointer-based operands.
pub const EXTRA_OFFSET: &str = "ExtraOffset";

/// `T* name = base + offset;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerRebase {
    pub name: String,
    pub base: String,
    /// C offset expression, empty when the pointer is not moved.
    pub offset: String,
    pub is_const: bool,
}

impl PointerRebase {
    pub fn render(&self, typename: &str) -> String {
        let qualifier = if self.is_const { "const " } else { "" };
        if self.offset.is_empty() {
            format!("{qualifier}{typename}* {} = {};", self.name, self.base)
        } else {
            format!("{qualifier}{typename}* {} = {} + {};", self.name, self.base, self.offset)
        }
    }
}

#[derive(Debug, Clone)]
pub enum BatchEntry {
    LoopBegin { index: char, range: Range },
    LoopEnd { index: char },
    Pointer(PointerRebase),
    ZeroInit { target: String, start: usize, count: usize },
    Gemm(Box<BatchedGemm>),
    Product(Box<BatchedProduct>),
}

impl BatchEntry {
    /// Runtime symbols the operation reads as scaling factors.
    fn symbols(&self) -> Vec<String> {
        let alpha = match self {
            Self::Gemm(gemm) => gemm.description.alpha(),
            Self::Product(product) => product.description.alpha(),
            _ => return Vec::new(),
        };
        if alpha.is_literal() { Vec::new() } else { vec![alpha.to_string()] }
    }

    /// Operand arguments of the launcher call.
    fn arguments(&self) -> &[String] {
        match self {
            Self::Gemm(gemm) => &gemm.arguments,
            Self::Product(product) => &product.arguments,
            _ => &[],
        }
    }
}

/// Pending entries of the kernel under construction.
#[derive(Debug, Default)]
pub struct Batch {
    entries: Vec<BatchEntry>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: BatchEntry) {
        tracing::trace!(batch.len = self.entries.len() + 1, "batch entry recorded");
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            tracing::debug!(batch.len = self.entries.len(), "batch cleared");
        }
        self.entries.clear();
    }

    /// Launcher arguments: symbolic scaling factors, then operand arguments, each
    /// deduplicated in first-use order, then the batch-wide metadata.
    pub fn call_arguments(&self) -> Vec<String> {
        let symbols = self.entries.iter().flat_map(BatchEntry::symbols).unique();
        let operands = self.entries.iter().flat_map(|e| e.arguments().iter().cloned()).unique();
        symbols
            .chain(operands)
            .chain([NUM_ELEMENTS, FLAGS, STREAM_PTR].map(str::to_string))
            .collect()
    }
}

/// Scoped access to a session that empties the batch unless committed.
///
/// Every public session operation runs behind a guard, so an error or a panic never
/// leaves descriptors behind for an unrelated kernel.
pub struct BatchGuard<'a> {
    session: &'a mut Session,
    committed: bool,
}

impl<'a> BatchGuard<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self { session, committed: false }
    }

    /// Keep the batch: the guarded operation finished.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Deref for BatchGuard<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        self.session
    }
}

impl DerefMut for BatchGuard<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        self.session
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.session.batch_mut().clear();
        }
    }
}
