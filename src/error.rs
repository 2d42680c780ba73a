//! Error types for Vecino operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for Vecino operations.
///
/// Covers model-consistency failures (items unknown to a fitted model),
/// malformed input (mismatched parallel arrays), invalid hyperparameters,
/// and model persistence failures.
///
/// Degenerate numeric conditions (zero-norm vectors, empty neighborhoods,
/// zero similarity-magnitude sums) are *not* errors; they resolve to
/// omission of the affected item from scoring results.
///
/// # Examples
///
/// ```
/// use vecino::error::VecinoError;
///
/// let err = VecinoError::UnknownItem { item: 42 };
/// assert!(err.to_string().contains("42"));
/// ```
#[derive(Debug)]
pub enum VecinoError {
    /// An item referenced at scoring time is absent from the model's mean
    /// table. Indicates a stale model or a request naming unknown items.
    UnknownItem {
        /// The offending item identifier
        item: u64,
    },

    /// Parallel input slices have different lengths.
    LengthMismatch {
        /// Expected length (taken from the first slice)
        expected: usize,
        /// Actual length found
        actual: usize,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Serialization/deserialization error.
    Serialization(String),

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for VecinoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VecinoError::UnknownItem { item } => {
                write!(f, "Item {item} is not present in the model's mean table")
            }
            VecinoError::LengthMismatch { expected, actual } => {
                write!(
                    f,
                    "Parallel input length mismatch: expected {expected}, got {actual}"
                )
            }
            VecinoError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            VecinoError::Io(e) => write!(f, "I/O error: {e}"),
            VecinoError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            VecinoError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for VecinoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VecinoError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for VecinoError {
    fn from(err: std::io::Error) -> Self {
        VecinoError::Io(err)
    }
}

impl From<&str> for VecinoError {
    fn from(msg: &str) -> Self {
        VecinoError::Other(msg.to_string())
    }
}

impl From<String> for VecinoError {
    fn from(msg: String) -> Self {
        VecinoError::Other(msg)
    }
}

impl VecinoError {
    /// Create an unknown-item error.
    #[must_use]
    pub fn unknown_item(item: u64) -> Self {
        Self::UnknownItem { item }
    }

    /// Create a length mismatch error for parallel-array inputs.
    #[must_use]
    pub fn length_mismatch(expected: usize, actual: usize) -> Self {
        Self::LengthMismatch { expected, actual }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, VecinoError>;
