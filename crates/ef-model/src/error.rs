//! Error types for model construction.

use ef_core::CoreError;
use thiserror::Error;

/// Errors raised while building a model, its parameters or its initial state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(#[from] CoreError),

    #[error("Invalid intervention control: {0}")]
    InvalidControl(CoreError),

    #[error("Invalid initial state: {what}")]
    InvalidInitialState { what: String },

    #[error("Dimension mismatch: {what}")]
    DimensionMismatch { what: String },

    #[error("Unknown {kind} '{name}'")]
    UnknownName { kind: &'static str, name: String },
}

pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_become_parameter_errors() {
        let err: ModelError = CoreError::Negative {
            what: "death_rate",
            value: -1.0,
        }
        .into();
        assert!(matches!(err, ModelError::InvalidParameter(_)));
        assert!(err.to_string().contains("death_rate"));
    }
}
