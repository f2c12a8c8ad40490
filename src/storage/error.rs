//! Storage error types
//!
//! Defines all errors that can occur in the storage core. Every failure is
//! returned to the caller and leaves the container in its prior state.

use crate::storage::types::TagId;
use thiserror::Error;

/// Errors that can occur in the storage core
#[derive(Error, Debug)]
pub enum StoreError {
    /// A calendar or clock field is outside its valid range
    #[error("Invalid calendar value: {field} = {value}")]
    InvalidCalendarValue { field: &'static str, value: i64 },

    /// Exact-key or tag lookup missed
    #[error("Not found: {0}")]
    NotFound(String),

    /// Vector length does not match the container dimension
    #[error("Dimension mismatch: expected {expected} components, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Rename target is already interned under a different id
    #[error("Conflict: tag {tag} is already interned as {existing}")]
    Conflict { tag: String, existing: TagId },

    /// A stored id no longer resolves in the lookup table
    #[error("Dangling reference: {0} is not present in the lookup table")]
    DanglingReference(TagId),

    /// The lookup table behind a tagged container has been dropped
    #[error("Lookup table has been released")]
    LookupTableReleased,

    /// A 32-bit id space has no ids left to hand out
    #[error("Capacity exhausted: no free {0} ids")]
    CapacityExhausted(&'static str),

    /// Timestamp text could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::DimensionMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: expected 3 components, got 2"
        );

        let err = StoreError::InvalidCalendarValue {
            field: "month",
            value: 13,
        };
        assert_eq!(err.to_string(), "Invalid calendar value: month = 13");

        let err = StoreError::DanglingReference(TagId(7));
        assert_eq!(
            err.to_string(),
            "Dangling reference: #7 is not present in the lookup table"
        );

        let err = StoreError::CapacityExhausted("tag");
        assert_eq!(err.to_string(), "Capacity exhausted: no free tag ids");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: StoreError = io_err.into();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
