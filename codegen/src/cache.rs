//! Session-wide routine deduplication.
//!
//! Every generated kernel is registered under a name derived from everything that
//! influences its body. Registering the same name again is free as long as the
//! generator is equivalent; the body itself is produced once, at flush time, in
//! first-registration order.

use std::collections::HashMap;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use snafu::{ResultExt, ensure};

use crate::error::*;
use crate::sink::CodeSink;

/// Deferred producer of one kernel body.
pub trait RoutineGenerator: fmt::Debug {
    /// Equal identities produce equal routines.
    fn identity(&self) -> String;

    /// Header lines the declaration relies on.
    fn header(&self, _sink: &mut CodeSink) {}

    /// Append the body of `name` to `path` and return its declaration.
    fn generate(&self, name: &str, path: &Path) -> Result<String>;
}

#[derive(Debug, Default)]
pub struct RoutineCache {
    routines: Vec<(String, Box<dyn RoutineGenerator>)>,
    index: HashMap<String, usize>,
    flushed: bool,
}

impl RoutineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `generator` under `name` unless an equivalent one is already there.
    pub fn register(&mut self, name: impl Into<String>, generator: Box<dyn RoutineGenerator>) -> Result<()> {
        let name = name.into();
        ensure!(!self.flushed, AlreadyFlushedSnafu);

        if let Some(&position) = self.index.get(&name) {
            ensure!(self.routines[position].1.identity() == generator.identity(), RoutineConflictSnafu { name });
            tracing::trace!(routine.name = %name, "routine already cached");
            return Ok(());
        }

        tracing::debug!(routine.name = %name, routine.position = self.routines.len(), "routine registered");
        self.index.insert(name.clone(), self.routines.len());
        self.routines.push((name, generator));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered names in first-registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routines.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.routines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }

    pub fn is_flushed(&self) -> bool {
        self.flushed
    }

    /// Generate every routine into `path` and write header snippets and declarations
    /// into `header`.
    ///
    /// `path` is truncated first. Distinct header snippets are written once, before
    /// all declarations. Returns the number of generated routines.
    pub fn flush_all(&mut self, path: &Path, header: &mut CodeSink) -> Result<usize> {
        ensure!(!self.flushed, AlreadyFlushedSnafu);
        self.flushed = true;

        File::create(path).context(IoSnafu { path })?;

        let mut snippets: Vec<CodeSink> = Vec::new();
        let mut declarations = Vec::with_capacity(self.routines.len());
        for (name, generator) in &self.routines {
            let mut snippet = CodeSink::new();
            generator.header(&mut snippet);
            if !snippet.is_empty() && !snippets.iter().any(|s| s.lines() == snippet.lines()) {
                snippets.push(snippet);
            }
            declarations.push(generator.generate(name, path)?);
        }

        for line in snippets.iter().flat_map(|s| s.lines()) {
            header.directive(line);
        }
        for declaration in &declarations {
            header.line(declaration);
        }

        tracing::debug!(routines = self.routines.len(), path = %path.display(), "routine cache flushed");
        Ok(self.routines.len())
    }
}

/// Append `text` to the file at `path`, creating it if needed.
pub fn append_to_file(path: &Path, text: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path).context(IoSnafu { path })?;
    file.write_all(text.as_bytes()).context(IoSnafu { path })
}
