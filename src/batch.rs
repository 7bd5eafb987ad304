//! Row-major feature batches.
//!
//! Every stage consumes and produces a `Batch`: a contiguous buffer with shape
//! `(rows, cols)`, where each row is one feature vector.

use crate::{Error, Result};

/// A batch of feature vectors stored row-major.
///
/// Invariant: `data.len() == rows * cols`.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    data: Vec<f32>,
    rows: usize,
    cols: usize,
}

impl Batch {
    /// Build a batch from a flat buffer with shape `(len / cols, cols)`.
    pub fn from_flat(data: Vec<f32>, cols: usize) -> Result<Self> {
        if cols == 0 {
            return Err(Error::InvalidShape("cols must be > 0".to_owned()));
        }
        if !data.len().is_multiple_of(cols) {
            return Err(Error::InvalidShape(format!(
                "buffer length {} is not divisible by cols {}",
                data.len(),
                cols
            )));
        }

        let rows = data.len() / cols;
        Ok(Self { data, rows, cols })
    }

    /// Build a batch from per-sample rows.
    ///
    /// This is a convenience constructor (it copies into contiguous storage).
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(Error::InvalidShape("rows must not be empty".to_owned()));
        };

        let cols = first.len();
        if cols == 0 {
            return Err(Error::InvalidShape("cols must be > 0".to_owned()));
        }

        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::InvalidShape(format!(
                    "row {i} has len {}, expected {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            data,
            rows: rows.len(),
            cols,
        })
    }

    /// A zero-filled batch of shape `(rows, cols)`.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    /// Returns `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    #[inline]
    /// Returns the `idx`-th row (shape: `(cols,)`).
    ///
    /// Panics if `idx >= rows`.
    pub fn row(&self, idx: usize) -> &[f32] {
        let start = idx * self.cols;
        &self.data[start..start + self.cols]
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}
