//! Strict error handling with CaptureError enum
//!
//! All fallible operations in the core return `CaptureResult`. Errors are
//! serializable so a host UI can receive them over an IPC boundary.

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by a clipboard source implementation
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum ClipboardError {
    /// Clipboard read/write refused by the platform
    ///
    /// Recoverable: monitor loops continue on the next tick and surface a
    /// persistent "permission needed" state instead of per-tick noise.
    #[error("Clipboard permission denied")]
    PermissionDenied,

    /// The requested content kind is not available on this platform/backend
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    /// Any other clipboard failure
    #[error("Clipboard error: {0}")]
    Other(String),
}

/// Capture pipeline and collection store errors
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum CaptureError {
    /// Clipboard source failure
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    /// Persistence backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Persistence backend is out of capacity
    ///
    /// Recovered by trimming the collection oldest-first and retrying once.
    #[error("Storage quota exceeded")]
    QuotaExceeded,

    /// Malformed clipboard payload
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid input or parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No item with the given id in the collection
    #[error("Item not found: {0}")]
    NotFound(String),
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CaptureError {
    fn from(err: serde_json::Error) -> Self {
        CaptureError::Storage(format!("JSON error: {}", err))
    }
}

/// Helper type alias for core results
pub type CaptureResult<T> = Result<T, CaptureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_serialize_with_type_tag() {
        let err = CaptureError::QuotaExceeded;
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"QuotaExceeded\""));

        let err = CaptureError::Clipboard(ClipboardError::PermissionDenied);
        assert_eq!(err.to_string(), "Clipboard permission denied");
    }
}
