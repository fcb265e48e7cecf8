/*!
 * Core Types
 * Common types shared across the desktop core
 */

use serde::{Deserialize, Serialize};

/// Window ID type
pub type Wid = u32;

/// Subscription handle returned by the event registry
pub type SubscriptionId = u64;

/// JSON tree used for settings pools, session snapshots and API payloads
pub type Json = serde_json::Value;

/// Common result type for desktop operations
pub type DesktopResult<T> = Result<T, super::errors::DesktopError>;

/// Viewport dimensions reported by the hosting surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Reserved desktop chrome (panels, margins) subtracted from the viewport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insets {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

/// Usable desktop rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}
