/*!
 * Window Management Module
 * Window lifecycle, focus discipline, dialogs and session capture
 */

pub mod apps;
pub mod dialog;
pub mod manager;
pub mod session;
pub mod types;
pub mod window;

// Re-exports
pub use apps::{AppEntry, AppRegistry};
pub use dialog::{DialogAction, DialogResult, DialogWindow};
pub use manager::{WindowListEntry, WindowManager};
pub use session::{
    load_session, save_session, LaunchRequest, SessionEntry, WindowSnapshot, SESSION_POOL,
};
pub use types::{
    Capabilities, Dimension, Phase, Position, WindowError, WindowEvent, WindowResult,
};
pub use window::{LivenessGuard, StateFlags, Window, WindowAttrs};
