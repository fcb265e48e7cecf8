/*!
 * Core Module
 * Shared types, error aggregation and the desktop context
 */

pub mod context;
pub mod errors;
pub mod types;

// Re-exports
pub use context::{Desktop, DesktopBuilder};
pub use errors::DesktopError;
pub use types::{DesktopResult, Insets, Json, Rect, SubscriptionId, Viewport, Wid};
