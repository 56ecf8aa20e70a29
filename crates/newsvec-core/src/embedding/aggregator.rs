//! Reassembles per-batch outcomes into one job output.

use newsvec_types::embedding::{BatchFailureReport, EmbeddingJobOutput, EmbeddingMatrix};
use newsvec_types::error::PipelineError;

use super::dispatcher::{BatchOutcome, BatchResult};

/// Flatten `outcomes` into success flags and a successes-only matrix.
///
/// Outcomes are ordered by batch index first, so callers may pass them in
/// any order. `total` is the original input length; positions not covered
/// by any outcome are reported as failed.
///
/// # Errors
///
/// Returns [`PipelineError::DimensionMismatch`] if two successful vectors
/// differ in length.
pub fn aggregate(
    mut outcomes: Vec<BatchOutcome>,
    total: usize,
    cancelled: bool,
) -> Result<EmbeddingJobOutput, PipelineError> {
    outcomes.sort_by_key(|o| o.index);

    let mut success_flags = vec![false; total];
    let mut vectors = EmbeddingMatrix::empty();
    let mut failures = Vec::new();

    for outcome in outcomes {
        match outcome.result {
            BatchResult::Embedded(batch_vectors) => {
                for (i, vector) in batch_vectors.iter().enumerate() {
                    let position = outcome.offset + i;
                    if position >= total {
                        break;
                    }
                    vectors.push_row(vector).map_err(|mismatch| {
                        PipelineError::DimensionMismatch {
                            position,
                            expected: mismatch.expected,
                            actual: mismatch.actual,
                        }
                    })?;
                    success_flags[position] = true;
                }
            }
            BatchResult::Failed(reason) => failures.push(BatchFailureReport {
                batch_index: outcome.index,
                offset: outcome.offset,
                len: outcome.len,
                reason,
            }),
        }
    }

    Ok(EmbeddingJobOutput {
        success_flags,
        vectors,
        failures,
        cancelled,
    })
}
