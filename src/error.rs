// src/error.rs
use thiserror::Error;

/// Error types for the gbm-paths library
#[derive(Debug, Clone, Error)]
pub enum SimError {
    /// A simulation input violated its precondition. Caller error, not retried.
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameter {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// The draw source could not deliver the requested block of normals.
    #[error("Insufficient randomness: requested {requested} draws, got {available}: {reason}")]
    InsufficientRandomness {
        requested: usize,
        available: usize,
        reason: String,
    },

    /// Terminal statistics were requested over zero prices.
    #[error("Cannot summarize an empty ensemble")]
    EmptyEnsemble,

    /// Numerical overflow or underflow in a computed result
    #[error("Numerical instability in {method}: {reason}")]
    NumericalInstability { method: String, reason: String },

    /// Historical price provider failed or returned unusable data
    #[error("Historical data error for '{ticker}': {reason}")]
    HistoricalData { ticker: String, reason: String },

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

impl SimError {
    /// Whether the same call may succeed with a fresh draw source or a refetch.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SimError::InsufficientRandomness { .. } | SimError::HistoricalData { .. }
        )
    }
}

/// Result type alias for gbm-paths operations
pub type SimResult<T> = Result<T, SimError>;

/// Validation utilities
pub mod validation {
    use super::{SimError, SimResult};

    /// Validate that a parameter is finite and strictly positive
    pub fn validate_positive(name: &str, value: f64) -> SimResult<()> {
        validate_finite(name, value)?;
        if value <= 0.0 {
            Err(SimError::InvalidParameter {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> SimResult<()> {
        if !value.is_finite() {
            Err(SimError::InvalidParameter {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is within a closed range
    pub fn validate_range(name: &str, value: f64, min: f64, max: f64) -> SimResult<()> {
        validate_finite(name, value)?;
        if value < min || value > max {
            Err(SimError::InvalidParameter {
                parameter: name.to_string(),
                value,
                constraint: format!("must be in range [{}, {}]", min, max),
            })
        } else {
            Ok(())
        }
    }

    /// Validate a step or path count (>= 1)
    pub fn validate_count(name: &str, count: usize) -> SimResult<()> {
        if count == 0 {
            Err(SimError::InvalidParameter {
                parameter: name.to_string(),
                value: 0.0,
                constraint: "must be at least 1".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a count lies within `[min, max]`
    pub fn validate_count_range(name: &str, count: usize, min: usize, max: usize) -> SimResult<()> {
        if count < min || count > max {
            Err(SimError::InvalidParameter {
                parameter: name.to_string(),
                value: count as f64,
                constraint: format!("must be in range [{}, {}]", min, max),
            })
        } else {
            Ok(())
        }
    }
}
