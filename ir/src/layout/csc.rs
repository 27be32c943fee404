//! Compressed sparse column layouts.

use smallvec::SmallVec;
use snafu::ensure;

use crate::error::*;
use crate::{BoundingBox, Range, SparsityPattern};

/// Nonzeros of a rank-2 pattern stored column by column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CscLayout {
    shape: SmallVec<[usize; 4]>,
    bbox: BoundingBox,
    col_ptr: Vec<usize>,
    row_index: Vec<usize>,
}

impl CscLayout {
    pub fn from_pattern(pattern: &SparsityPattern) -> Result<Self> {
        ensure!(pattern.rank() == 2, CscRankSnafu { rank: pattern.rank() });
        let (rows, cols) = (pattern.shape()[0], pattern.shape()[1]);

        let mut col_ptr = Vec::with_capacity(cols + 1);
        let mut row_index = Vec::with_capacity(pattern.nnz());
        col_ptr.push(0);
        for col in 0..cols {
            for row in 0..rows {
                if pattern.get(&[row, col])? {
                    row_index.push(row);
                }
            }
            col_ptr.push(row_index.len());
        }

        Ok(Self { shape: pattern.shape().into(), bbox: pattern.bounding_box(), col_ptr, row_index })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn nnz(&self) -> usize {
        self.row_index.len()
    }

    /// Nonzero coordinates inside the `rows` x `cols` window, columns outer.
    pub fn entries(&self, rows: Range, cols: Range) -> Vec<(usize, usize)> {
        let cols = cols & Range::new(0, self.shape[1]);
        cols.iter()
            .flat_map(|col| {
                self.row_index[self.col_ptr[col]..self.col_ptr[col + 1]]
                    .iter()
                    .filter(move |row| rows.contains_index(**row))
                    .map(move |&row| (row, col))
            })
            .collect()
    }

    /// Position of `(row, col)` in the value array, if it is a stored nonzero.
    pub fn address(&self, row: usize, col: usize) -> Option<usize> {
        if col >= self.shape[1] {
            return None;
        }
        let (lo, hi) = (self.col_ptr[col], self.col_ptr[col + 1]);
        self.row_index[lo..hi].iter().position(|&r| r == row).map(|offset| lo + offset)
    }
}
