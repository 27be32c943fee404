//! Compilation session.
//!
//! A session owns everything that outlives a single operation: the architecture,
//! its capability table, the routine cache and the accelerator batch. Operations are
//! emitted in the order the front end visits them.

use std::path::Path;

use logemm_ir::Range;
use snafu::ensure;

use crate::arch::Architecture;
use crate::batch::{Batch, BatchEntry, BatchGuard, PointerRebase};
use crate::cache::RoutineCache;
use crate::config::GemmConfiguration;
use crate::error::*;
use crate::flops::Flops;
use crate::gemm::{self, GemmDescription};
use crate::log::LogDescription;
use crate::product::ProductDescription;
use crate::sink::CodeSink;

#[derive(Debug)]
pub struct Session {
    arch: Architecture,
    configuration: GemmConfiguration,
    cache: RoutineCache,
    batch: Batch,
}

impl Session {
    /// Session with the architecture's default capability table.
    pub fn new(arch: Architecture) -> Self {
        let configuration = GemmConfiguration::default_for(&arch);
        Self::with_configuration(arch, configuration)
    }

    pub fn with_configuration(arch: Architecture, configuration: GemmConfiguration) -> Self {
        Self { arch, configuration, cache: RoutineCache::new(), batch: Batch::new() }
    }

    pub fn arch(&self) -> &Architecture {
        &self.arch
    }

    pub fn configuration(&self) -> &GemmConfiguration {
        &self.configuration
    }

    pub fn cache(&self) -> &RoutineCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut RoutineCache {
        &mut self.cache
    }

    pub fn batch(&self) -> &Batch {
        &self.batch
    }

    pub fn batch_mut(&mut self) -> &mut Batch {
        &mut self.batch
    }

    /// Emit one standalone GEMM.
    pub fn generate_gemm(&mut self, sink: &mut CodeSink, description: &GemmDescription) -> Result<Flops> {
        let mut guard = BatchGuard::new(self);
        let mut ctx = EmitContext::new(sink, &mut guard);
        let flops = gemm::generate(description, &mut ctx)?;
        ctx.finish_kernel(description.result().is_temporary)?;
        guard.commit();
        Ok(flops)
    }

    /// Emit a loop nest of GEMMs.
    pub fn generate_log(&mut self, sink: &mut CodeSink, description: &LogDescription) -> Result<Flops> {
        let mut guard = BatchGuard::new(self);
        let mut ctx = EmitContext::new(sink, &mut guard);
        let flops = crate::log::generate(description, &mut ctx)?;
        ctx.finish_kernel(description.result().is_temporary)?;
        guard.commit();
        Ok(flops)
    }

    /// Emit an element-wise product.
    pub fn generate_product(&mut self, sink: &mut CodeSink, description: &ProductDescription) -> Result<Flops> {
        let mut guard = BatchGuard::new(self);
        let mut ctx = EmitContext::new(sink, &mut guard);
        let flops = crate::product::generate(description, &mut ctx)?;
        ctx.finish_kernel(description.result().is_temporary)?;
        guard.commit();
        Ok(flops)
    }

    /// Write every cached routine to `path` and their declarations to `header`.
    ///
    /// Fails while accelerator entries are still pending: a temporary result was
    /// emitted without a final kernel consuming it.
    pub fn finish(&mut self, path: &Path, header: &mut CodeSink) -> Result<usize> {
        ensure!(self.batch.is_empty(), PendingBatchSnafu { entries: self.batch.len() });
        self.cache.flush_all(path, header)
    }
}

/// Destination of emitted code for one operation.
///
/// Host targets write into the sink; batched targets record into the session batch.
pub struct EmitContext<'a> {
    pub sink: &'a mut CodeSink,
    pub session: &'a mut Session,
}

impl<'a> EmitContext<'a> {
    pub fn new(sink: &'a mut CodeSink, session: &'a mut Session) -> Self {
        Self { sink, session }
    }

    pub fn arch(&self) -> &Architecture {
        &self.session.arch
    }

    pub fn is_batched(&self) -> bool {
        self.session.arch.is_batched()
    }

    pub fn open_loop(&mut self, index: char, range: Range) {
        if self.is_batched() {
            self.session.batch.push(BatchEntry::LoopBegin { index, range });
        } else {
            self.sink.open_for(index, range);
        }
    }

    pub fn close_loop(&mut self, index: char) {
        if self.is_batched() {
            self.session.batch.push(BatchEntry::LoopEnd { index });
        } else {
            self.sink.close_block();
        }
    }

    pub fn pointer(&mut self, rebase: PointerRebase) {
        if self.is_batched() {
            self.session.batch.push(BatchEntry::Pointer(rebase));
        } else {
            let line = rebase.render(self.session.arch.typename());
            self.sink.line(line);
        }
    }

    /// Zero `count` elements of `target` starting at element `start`.
    pub fn zero(&mut self, target: &str, start: usize, count: usize) {
        if self.is_batched() {
            self.session.batch.push(BatchEntry::ZeroInit { target: target.to_string(), start, count });
        } else {
            let base = if start == 0 { target.to_string() } else { format!("{target} + {start}") };
            self.sink.memset(&base, count, self.session.arch.typename());
        }
    }

    /// Hand a completed batch to the accelerator unless its result is an
    /// intermediate of a larger kernel.
    fn finish_kernel(&mut self, result_is_temporary: bool) -> Result<()> {
        if self.is_batched() && !result_is_temporary {
            gemm::accelerator::flush(self)?;
        }
        Ok(())
    }
}
