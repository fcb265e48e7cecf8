/*!
 * Window Types
 * Geometry, capabilities and lifecycle state for top-level surfaces
 */

use crate::core::types::Wid;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Window operation result
pub type WindowResult<T> = Result<T, WindowError>;

/// Window manager errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("Window {0} not found")]
    NotFound(Wid),

    #[error("Window name already in use: {0}")]
    DuplicateName(String),

    #[error("Invalid lifecycle transition: {from:?} -> {to:?}")]
    InvalidTransition { from: Phase, to: Phase },
}

/// Window position in desktop coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Window dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Default for Dimension {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// Capability booleans fixed at construction, immutable thereafter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub resize: bool,
    pub minimize: bool,
    pub maximize: bool,
    /// Shown in the window-list panel
    pub windowlist: bool,
    /// Captured by session serialization
    pub session: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            resize: true,
            minimize: true,
            maximize: true,
            windowlist: true,
            session: true,
        }
    }
}

impl Capabilities {
    /// The modality contract: dialogs are fixed-size, unlisted, unsaved
    pub fn dialog() -> Self {
        Self {
            resize: false,
            minimize: false,
            maximize: false,
            windowlist: false,
            session: false,
        }
    }
}

/// Window lifecycle phase
///
/// `Constructed -> Initialized -> [Focused <-> Blurred]* -> Closing -> Destroyed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Created, no surface attached yet
    Constructed,
    /// Surface attached, `create` announced to the manager
    Initialized,
    Focused,
    Blurred,
    /// Teardown in progress; further closes are no-ops
    Closing,
    /// Terminal; `close` announced exactly once
    Destroyed,
}

/// Restricted event surface a window broadcasts to its manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Create,
    Focus,
    Blur,
    Close,
}

impl WindowEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::Close => "close",
        }
    }
}
