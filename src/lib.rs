/*!
 * WebDesk Core
 *
 * Server-side core of a browser-hosted desktop environment: window
 * lifecycle and focus discipline, modal dialogs, session capture, a
 * mount-routed virtual file system, named settings pools with backend
 * persistence, and an RPC method registry with privilege gating.
 *
 * Subsystems are wired together by [`core::Desktop`]; each is usable on
 * its own for testing or embedding.
 */

pub mod api;
pub mod config;
pub mod core;
pub mod events;
pub mod handler;
pub mod settings;
pub mod vfs;
pub mod wm;

// Crate-level re-exports for the common entry points
pub use crate::core::{Desktop, DesktopBuilder, DesktopError, DesktopResult};
pub use config::Config;
