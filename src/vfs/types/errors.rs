/*!
 * VFS Error Types
 * Structured error handling for mount routing and dispatch
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// VFS operation result
///
/// # Must Use
/// VFS operations can fail and must be handled; failures surface to the
/// user through dialogs, never as panics.
pub type VfsResult<T> = Result<T, VfsError>;

/// VFS errors
///
/// `Routing`, `Unavailable` and `ReadOnly` are produced by the dispatcher
/// itself; everything else originates inside a mount's transport. Nothing a
/// transport does may escape the dispatch boundary as a panic.
#[must_use = "VFS operations can fail and must be handled"]
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum VfsError {
    #[error("No mount claims path: {0}")]
    Routing(String),

    #[error("Mount unavailable: {0}")]
    Unavailable(String),

    #[error("Read-only mount")]
    ReadOnly,

    #[error("Backend failure: {0}")]
    Backend(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Is a directory: {0}")]
    IsADirectory(String),

    #[error("Out of space")]
    OutOfSpace,

    #[error("Not supported: {0}")]
    NotSupported(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization_round_trip() {
        let error = VfsError::Routing("ghost://file".to_string());
        let json = serde_json::to_string(&error).unwrap();
        let back: VfsError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, back);
    }
}
