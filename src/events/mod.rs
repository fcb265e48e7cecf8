/*!
 * Event System Module
 * Decouples stateful components through named events
 */

pub mod handler;

// Re-exports
pub use handler::{EventCallback, EventError, EventHandler, EventOutcome, EventResult};
