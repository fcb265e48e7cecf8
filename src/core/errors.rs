/*!
 * Error Types
 * Centralized error aggregation for the desktop core
 */

use thiserror::Error;

pub use crate::api::ApiError;
pub use crate::events::EventError;
pub use crate::handler::HandlerError;
pub use crate::settings::SettingsError;
pub use crate::vfs::VfsError;
pub use crate::wm::WindowError;

/// Top-level error covering every subsystem
///
/// Subsystem APIs return their own error types; this aggregate exists for
/// callers that drive multiple subsystems in one flow (bootstrap, session
/// restore) and want a single `?`-able error.
#[derive(Error, Debug)]
pub enum DesktopError {
    #[error(transparent)]
    Vfs(#[from] VfsError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
