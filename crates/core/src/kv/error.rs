use thiserror::Error;

/// Errors that can occur during key-value store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KvError {
    #[error("Key-value store I/O failed: {0}")]
    Io(String),
    #[error("Key-value store operation failed: {0}")]
    OperationFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for key-value store operations.
pub type Result<T> = std::result::Result<T, KvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_display() {
        let error = KvError::Io("permission denied".to_string());
        assert_eq!(
            error.to_string(),
            "Key-value store I/O failed: permission denied"
        );
    }

    #[test]
    fn test_operation_failed_display() {
        let error = KvError::OperationFailed("store closed".to_string());
        assert_eq!(
            error.to_string(),
            "Key-value store operation failed: store closed"
        );
    }

    #[test]
    fn test_serialization_display() {
        let error = KvError::Serialization("invalid JSON".to_string());
        assert_eq!(error.to_string(), "Serialization error: invalid JSON");
    }
}
