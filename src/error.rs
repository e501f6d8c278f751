//! Engine error types.

use thiserror::Error;

use crate::timetable::ModelError;
use crate::validation::ValidationError;

/// Errors that abort a schedule-generation run.
///
/// Infeasibility is deliberately absent: an over-constrained term is an
/// expected outcome and is reported through
/// [`GenerateResult::Infeasible`](crate::engine::GenerateResult::Infeasible).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("data integrity violated: {}", summarize(.0))]
    DataIntegrity(Vec<ValidationError>),

    #[error("snapshot source failed: {0}")]
    Source(String),

    #[error("model construction failed: {0}")]
    Model(#[from] ModelError),

    #[error("solver backend failed: {0}")]
    Backend(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
