//! Error types for simulation runs.

use ef_model::ModelError;
use ef_solver::SolverError;
use thiserror::Error;

/// Errors encountered while setting up or running a simulation.
///
/// Configuration errors are raised before any solver work starts. A failed
/// integration never yields a partial trajectory.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid configuration: {what}")]
    InvalidConfiguration { what: String },

    #[error("Integration failed: {0}")]
    IntegrationFailure(#[from] SolverError),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub(crate) fn config(what: impl Into<String>) -> Self {
        SimError::InvalidConfiguration { what: what.into() }
    }
}

impl From<ModelError> for SimError {
    fn from(e: ModelError) -> Self {
        SimError::InvalidConfiguration {
            what: e.to_string(),
        }
    }
}

impl From<ef_core::CoreError> for SimError {
    fn from(e: ef_core::CoreError) -> Self {
        SimError::InvalidConfiguration {
            what: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_are_configuration_errors() {
        let err: SimError = ModelError::DimensionMismatch {
            what: "four vs seven".into(),
        }
        .into();
        assert!(matches!(err, SimError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("four vs seven"));
    }

    #[test]
    fn solver_errors_are_integration_failures() {
        let err: SimError = SolverError::SingularMatrix { t: 3.0 }.into();
        assert_eq!(
            err,
            SimError::IntegrationFailure(SolverError::SingularMatrix { t: 3.0 })
        );
    }
}
