//! Error types for the greenwave library.

use thiserror::Error;

/// Result type alias for greenwave operations.
pub type Result<T> = std::result::Result<T, GreenwaveError>;

/// Errors that can occur while resampling, scoring or classifying an appliance.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GreenwaveError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Input values that cannot enter the pipeline (NaN, infinite).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Missing values detected when not allowed.
    #[error("missing values detected in data")]
    MissingValues,

    /// An estimator already bound to one appliance was fed another appliance's signal.
    #[error("estimator bound to '{bound}' cannot score '{attempted}'")]
    EstimatorReuse { bound: String, attempted: String },

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GreenwaveError {
    /// True when the failure only means the appliance has too little history.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. } | Self::EmptyData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = GreenwaveError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = GreenwaveError::InsufficientData { needed: 4, got: 3 };
        assert_eq!(err.to_string(), "insufficient data: need at least 4, got 3");

        let err = GreenwaveError::InvalidParameter("r must lie in (0, 1)".to_string());
        assert_eq!(err.to_string(), "invalid parameter: r must lie in (0, 1)");

        let err = GreenwaveError::DimensionMismatch {
            expected: 30,
            got: 29,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 30, got 29");

        let err = GreenwaveError::EstimatorReuse {
            bound: "Fridge".to_string(),
            attempted: "Microwave".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "estimator bound to 'Fridge' cannot score 'Microwave'"
        );
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = GreenwaveError::MissingValues;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }

    #[test]
    fn insufficient_data_is_recognised() {
        let short = GreenwaveError::InsufficientData { needed: 4, got: 1 };
        assert!(short.is_insufficient_data());
        assert!(GreenwaveError::EmptyData.is_insufficient_data());
        assert!(!GreenwaveError::MissingValues.is_insufficient_data());
    }
}
