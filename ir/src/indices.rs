//! Named tensor indices.
//!
//! An index list pairs each single-character index name with its extent. Set-like
//! operations keep the order of the left operand, which is what memory-layout
//! fusion relies on: the position of an index in the list is the axis it addresses.

use std::fmt;
use std::ops::{BitAnd, Sub};

use smallvec::SmallVec;
use snafu::{OptionExt, ensure};

use crate::error::*;

/// C loop variable bound to index `name`.
pub fn loop_variable(name: char) -> String {
    format!("_{name}")
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Indices {
    entries: SmallVec<[(char, usize); 4]>,
}

impl Indices {
    /// Build from a name string such as `"ijk"` and matching extents.
    pub fn new(names: &str, sizes: &[usize]) -> Result<Self> {
        let names_len = names.chars().count();
        ensure!(names_len == sizes.len(), IndexAritySnafu { names, names_len, sizes_len: sizes.len() });

        let mut entries: SmallVec<[(char, usize); 4]> = SmallVec::with_capacity(names_len);
        for (name, &size) in names.chars().zip(sizes) {
            ensure!(!entries.iter().any(|(n, _)| *n == name), DuplicateIndexSnafu { index: name, names });
            entries.push((name, size));
        }
        Ok(Self { entries })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = char> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn shape(&self) -> SmallVec<[usize; 4]> {
        self.entries.iter().map(|(_, size)| *size).collect()
    }

    pub fn name_at(&self, position: usize) -> char {
        self.entries[position].0
    }

    pub fn contains(&self, name: char) -> bool {
        self.entries.iter().any(|(n, _)| *n == name)
    }

    pub fn position(&self, name: char) -> Option<usize> {
        self.entries.iter().position(|(n, _)| *n == name)
    }

    pub fn size_of(&self, name: char) -> Result<usize> {
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, size)| *size).context(UnknownIndexSnafu {
            index: name,
            names: self.to_string(),
        })
    }

    /// Sorted positions of the members of `subset` inside this list.
    ///
    /// Names of `subset` that are not part of this list are skipped.
    pub fn positions(&self, subset: &Indices) -> SmallVec<[usize; 4]> {
        self.entries.iter().enumerate().filter(|(_, (n, _))| subset.contains(*n)).map(|(p, _)| p).collect()
    }

    /// First index in list order.
    pub fn first(&self) -> Option<char> {
        self.entries.first().map(|(n, _)| *n)
    }
}

impl Sub for &Indices {
    type Output = Indices;

    fn sub(self, rhs: &Indices) -> Indices {
        Indices { entries: self.entries.iter().filter(|(n, _)| !rhs.contains(*n)).copied().collect() }
    }
}

impl BitAnd for &Indices {
    type Output = Indices;

    fn bitand(self, rhs: &Indices) -> Indices {
        Indices { entries: self.entries.iter().filter(|(n, _)| rhs.contains(*n)).copied().collect() }
    }
}

impl fmt::Display for Indices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, _) in &self.entries {
            write!(f, "{name}")?;
        }
        Ok(())
    }
}
