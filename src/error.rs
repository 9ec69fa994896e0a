//! Error types for sweep configuration, ensembles and export.

use thiserror::Error;

/// Errors surfaced by the sweep entry points and the I/O helpers.
#[derive(Debug, Error)]
pub enum KuramotoError {
    /// Configuration rejected before any simulation work started.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration
        message: String,
    },

    /// Ensemble vectors disagree in length with each other or with N.
    #[error("Dimension mismatch: expected {expected}, actual {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length provided
        actual: usize,
    },

    /// Ensemble contains values the integrator cannot start from.
    #[error("Invalid ensemble: {message}")]
    InvalidEnsemble { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KuramotoError {
    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }
}

pub type KuramotoResult<T> = Result<T, KuramotoError>;

/// Return `InvalidConfig` unless the condition holds.
macro_rules! ensure_config {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::KuramotoError::invalid_config(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure_config;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_details() {
        let e = KuramotoError::invalid_config("dt must be > 0");
        assert_eq!(e.to_string(), "Invalid configuration: dt must be > 0");

        let e = KuramotoError::dimension_mismatch(3, 2);
        assert_eq!(e.to_string(), "Dimension mismatch: expected 3, actual 2");
    }
}
