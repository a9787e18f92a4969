//! Error types for docview

use thiserror::Error;

/// Result type alias for docview operations
pub type Result<T> = std::result::Result<T, DocViewError>;

/// Unified error type for all docview operations
///
/// `InvalidArgument` and `InvalidState` are caller errors and are always
/// returned before anything is submitted to the execution engine. `Engine`
/// wraps whatever the engine reported and is never inspected by the view.
#[derive(Error, Debug, Clone)]
pub enum DocViewError {
    /// Malformed builder input, e.g. a negative skip or limit
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Builder state that is valid piecewise but not for this terminal call
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Failure surfaced by the execution engine (network, server, cursor)
    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocViewError {
    /// Returns true if the error was raised by the view before dispatch
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            DocViewError::InvalidArgument(_) | DocViewError::InvalidState(_)
        )
    }

    /// Returns true if the error came back from the execution engine
    pub fn is_engine_failure(&self) -> bool {
        matches!(self, DocViewError::Engine(_))
    }
}

// MongoDB-specific error conversions (when mongodb-errors feature is enabled)
#[cfg(feature = "mongodb-errors")]
impl From<mongodb::error::Error> for DocViewError {
    fn from(err: mongodb::error::Error) -> Self {
        DocViewError::Engine(err.to_string())
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::ser::Error> for DocViewError {
    fn from(err: bson::ser::Error) -> Self {
        DocViewError::Serialization(format!("BSON serialization error: {}", err))
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::de::Error> for DocViewError {
    fn from(err: bson::de::Error) -> Self {
        DocViewError::Deserialization(format!("BSON deserialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_argument() {
        let err = DocViewError::InvalidArgument("limit must be >= 0, got -1".to_string());
        assert_eq!(err.to_string(), "Invalid argument: limit must be >= 0, got -1");
    }

    #[test]
    fn test_error_display_invalid_state() {
        let err = DocViewError::InvalidState("limit of 5".to_string());
        assert_eq!(err.to_string(), "Invalid state: limit of 5");
    }

    #[test]
    fn test_error_display_engine() {
        let err = DocViewError::Engine("connection refused".to_string());
        assert_eq!(err.to_string(), "Engine error: connection refused");
    }

    #[test]
    fn test_error_display_deserialization() {
        let err = DocViewError::Deserialization("missing field".to_string());
        assert_eq!(err.to_string(), "Deserialization error: missing field");
    }

    #[test]
    fn test_error_display_internal() {
        let err = DocViewError::Internal("unexpected reply".to_string());
        assert_eq!(err.to_string(), "Internal error: unexpected reply");
    }

    #[test]
    fn test_is_caller_error() {
        assert!(DocViewError::InvalidArgument("test".to_string()).is_caller_error());
        assert!(DocViewError::InvalidState("test".to_string()).is_caller_error());
        assert!(!DocViewError::Engine("test".to_string()).is_caller_error());
        assert!(!DocViewError::Deserialization("test".to_string()).is_caller_error());
    }

    #[test]
    fn test_is_engine_failure() {
        assert!(DocViewError::Engine("test".to_string()).is_engine_failure());
        assert!(!DocViewError::InvalidState("test".to_string()).is_engine_failure());
        assert!(!DocViewError::Connection("test".to_string()).is_engine_failure());
    }

    #[test]
    fn test_result_type_err() {
        let result: Result<i32> = Err(DocViewError::InvalidState("failed".to_string()));
        assert!(result.is_err());
    }
}
