/*!
 * Backend Handler Module
 * Pluggable adapter for authentication and settings persistence
 */

pub mod demo;

use crate::core::types::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-exports
pub use demo::DemoHandler;

/// Handler operation result
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Handler errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum HandlerError {
    #[error("Authentication failed for user: {0}")]
    AuthFailed(String),

    #[error("No active session")]
    NotLoggedIn,

    #[error("Storage failure: {0}")]
    Storage(String),
}

/// Authenticated user description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    pub name: String,
    pub groups: Vec<String>,
}

/// Backend adapter consumed by the settings manager and the session flow
///
/// Implementations translate these calls into whatever their storage and
/// authentication backend speaks. Failures are always returned, never
/// panicked, so callers can surface them through dialogs.
pub trait Handler: Send + Sync {
    /// One-time backend initialization
    fn init(&self) -> HandlerResult<()> {
        Ok(())
    }

    /// Authenticate and open a session
    fn login(&self, username: &str, password: &str) -> HandlerResult<UserInfo>;

    /// End the session, optionally persisting outstanding state first
    fn logout(&self, save: bool) -> HandlerResult<()>;

    /// Persist settings
    ///
    /// Receives the FULL storage tree even when only `pool` changed; the
    /// handler owns pool-scoped persistence.
    fn save_settings(&self, pool: &str, tree: &Json) -> HandlerResult<()>;

    /// Currently authenticated user, if any
    fn current_user(&self) -> Option<UserInfo>;
}
