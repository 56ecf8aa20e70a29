//! Embedding job output types.
//!
//! An embedding job turns N input texts into a success flag per text plus a
//! dense matrix holding only the successful vectors, in input order.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Dense row-major matrix of embedding vectors.
///
/// The shape is always `rows x dim`; a single successful vector is still a
/// one-row matrix. An empty matrix has shape `0 x 0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingMatrix {
    rows: usize,
    dim: usize,
    data: Vec<f32>,
}

impl EmbeddingMatrix {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a matrix from contiguous row-major data.
    ///
    /// Returns `None` when `data.len()` is not `rows * dim`.
    pub fn from_row_major(rows: usize, dim: usize, data: Vec<f32>) -> Option<Self> {
        (rows.checked_mul(dim)? == data.len()).then_some(Self { rows, dim, data })
    }

    /// Append one vector as a new row.
    ///
    /// The first row fixes the matrix dimension; later rows must match it.
    pub fn push_row(&mut self, row: &[f32]) -> Result<(), RowDimensionMismatch> {
        if self.rows == 0 {
            self.dim = row.len();
        } else if row.len() != self.dim {
            return Err(RowDimensionMismatch {
                expected: self.dim,
                actual: row.len(),
            });
        }
        self.data.extend_from_slice(row);
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// The vector stored in row `i`, if it exists.
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        if i >= self.rows {
            return None;
        }
        let start = i * self.dim;
        Some(&self.data[start..start + self.dim])
    }

    pub fn iter_rows(&self) -> impl ExactSizeIterator<Item = &[f32]> + '_ {
        (0..self.rows).map(move |i| &self.data[i * self.dim..(i + 1) * self.dim])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_rows(self) -> Vec<Vec<f32>> {
        if self.dim == 0 {
            return Vec::new();
        }
        self.data.chunks(self.dim).map(<[f32]>::to_vec).collect()
    }
}

/// A row was pushed whose length differs from the matrix dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowDimensionMismatch {
    pub expected: usize,
    pub actual: usize,
}

/// Why an entire batch produced no embeddings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchFailure {
    /// The embedding backend rejected or failed the call.
    Remote { message: String },
    /// The call did not finish within the configured timeout.
    Timeout { after: Duration },
    /// The backend returned a different number of vectors than texts.
    LengthMismatch { expected: usize, actual: usize },
    /// The worker task did not complete normally.
    Panicked { message: String },
    /// The job was cancelled before this batch finished.
    Cancelled,
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchFailure::Remote { message } => write!(f, "remote call failed: {message}"),
            BatchFailure::Timeout { after } => write!(f, "timed out after {after:?}"),
            BatchFailure::LengthMismatch { expected, actual } => {
                write!(f, "expected {expected} vectors, got {actual}")
            }
            BatchFailure::Panicked { message } => write!(f, "worker panicked: {message}"),
            BatchFailure::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A failed batch and the input range it covered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailureReport {
    pub batch_index: usize,
    /// Position of the batch's first item in the original input.
    pub offset: usize,
    pub len: usize,
    pub reason: BatchFailure,
}

/// Result of one embedding job.
///
/// Invariants: `success_flags.len()` equals the input length, and
/// `vectors.rows()` equals the number of `true` flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingJobOutput {
    pub success_flags: Vec<bool>,
    pub vectors: EmbeddingMatrix,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<BatchFailureReport>,
    #[serde(default)]
    pub cancelled: bool,
}

impl EmbeddingJobOutput {
    pub fn len(&self) -> usize {
        self.success_flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.success_flags.is_empty()
    }

    /// Number of inputs that received an embedding.
    pub fn succeeded(&self) -> usize {
        self.vectors.rows()
    }

    /// Original positions of every input that did not receive an embedding.
    ///
    /// Resubmitting exactly these texts as a new job is the retry path.
    pub fn failed_indices(&self) -> Vec<usize> {
        self.success_flags
            .iter()
            .enumerate()
            .filter_map(|(i, ok)| (!ok).then_some(i))
            .collect()
    }

    /// The vector for the input at `position`, or `None` if it failed.
    pub fn vector_for(&self, position: usize) -> Option<&[f32]> {
        if !*self.success_flags.get(position)? {
            return None;
        }
        let row = self.success_flags[..position].iter().filter(|ok| **ok).count();
        self.vectors.row(row)
    }
}

/// Progress snapshot emitted each time a batch finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub failed: usize,
}
