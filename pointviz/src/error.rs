//! Error types for pointviz
//!
//! Every fallible operation in the crate returns [`PointvizResult`]. Errors are
//! raised synchronously at the call that caused them and are logged at
//! the point they are raised (see `engine_err!` / `engine_bail!`).

use std::fmt;

/// Result type for pointviz operations
pub type PointvizResult<T> = std::result::Result<T, PointvizError>;

/// pointviz errors
#[derive(Debug, Clone, PartialEq)]
pub enum PointvizError {
    /// Input is not a recognized sequence, array or tensor-like value
    /// (rank-0 data, ragged sequences, shape/element count disagreement)
    UnsupportedInputType(String),

    /// Source data cannot be represented in the canonical element type
    DTypeCoercionFailure(String),

    /// Field count of a payload differs from the one the buffer is locked to
    ShapeMismatch {
        /// Field count the buffer expects
        expected: usize,
        /// Field count found in the payload
        found: usize,
    },

    /// The graphics device refused a handle or storage allocation
    BackendAllocationFailure(String),

    /// Backend-specific error (bind, upload)
    BackendError(String),

    /// Invalid resource (unknown or duplicate buffer name)
    InvalidResource(String),
}

impl fmt::Display for PointvizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointvizError::UnsupportedInputType(msg) => write!(f, "Unsupported input type: {}", msg),
            PointvizError::DTypeCoercionFailure(msg) => write!(f, "Element type coercion failed: {}", msg),
            PointvizError::ShapeMismatch { expected, found } => write!(
                f,
                "Shape mismatch: expected {} field(s) per record, found {}",
                expected, found
            ),
            PointvizError::BackendAllocationFailure(msg) => write!(f, "Backend allocation failed: {}", msg),
            PointvizError::BackendError(msg) => write!(f, "Backend error: {}", msg),
            PointvizError::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
        }
    }
}

impl std::error::Error for PointvizError {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
