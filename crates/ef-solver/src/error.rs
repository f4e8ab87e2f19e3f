//! Error types for solver operations.

use thiserror::Error;

/// Errors that can occur while integrating an initial value problem.
///
/// None of these carry a partial solution: a failed integration yields no
/// trajectory at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Step size fell below the floating-point floor at t = {t}")]
    StepSizeTooSmall { t: f64 },

    #[error("Step budget of {max_steps} exceeded at t = {t}")]
    MaxStepsExceeded { max_steps: usize, t: f64 },

    #[error("Wall-clock budget of {limit_s} s exceeded at t = {t}")]
    WallTimeExceeded { limit_s: f64, t: f64 },

    #[error("Non-finite state at t = {t}")]
    NonFinite { t: f64 },

    #[error("Singular iteration matrix at t = {t}")]
    SingularMatrix { t: f64 },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<ef_core::CoreError> for SolverError {
    fn from(e: ef_core::CoreError) -> Self {
        SolverError::InvalidArg {
            what: e.to_string(),
        }
    }
}
