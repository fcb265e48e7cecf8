/*!
 * Dialog Window
 * Modal surface with a single-fire completion and guarded close
 */

use super::manager::WindowManager;
use super::types::{Capabilities, Dimension, Position, WindowResult};
use super::window::WindowAttrs;
use crate::core::types::{Json, SubscriptionId, Wid};
use crate::events::EventOutcome;
use log::{debug, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a dialog was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogAction {
    Ok,
    Cancel,
    Yes,
    No,
    /// The dialog was torn down without a button press
    Close,
}

/// Completion payload: the pressed action plus an optional value
/// (input text, selected file, chosen color)
#[derive(Debug, Clone, PartialEq)]
pub struct DialogResult {
    pub action: DialogAction,
    pub value: Option<Json>,
}

/// Invoked exactly once per dialog, however it ends
pub type Completion = Box<dyn FnOnce(DialogResult) + Send>;

/// Consulted before a non-forced close; `false` keeps the dialog open
pub type CloseGuardFn = Box<dyn Fn() -> bool + Send + Sync>;

/// A modal window over the manager
///
/// Dialogs carry [`Capabilities::dialog`]: fixed size, absent from the
/// window list and never captured into sessions. The completion fires
/// exactly once no matter which path ends the dialog, including a
/// direct teardown through the manager. The teardown watch is removed
/// once the completion has fired, and lives no longer than this handle.
pub struct DialogWindow {
    manager: Arc<WindowManager>,
    wid: Wid,
    completion: Arc<Mutex<Option<Completion>>>,
    close_guard: Mutex<Option<CloseGuardFn>>,
    // Subscription for the teardown safety net; taken on removal
    watch: Mutex<Option<SubscriptionId>>,
}

impl DialogWindow {
    /// Open a dialog centered in the usable desktop space
    pub fn open(
        manager: Arc<WindowManager>,
        name: impl Into<String>,
        title: impl Into<String>,
        dimension: Dimension,
        completion: Completion,
    ) -> WindowResult<Self> {
        let space = manager.window_space();
        let position = Position {
            x: space.x + (space.width.saturating_sub(dimension.width) / 2) as i32,
            y: space.y + (space.height.saturating_sub(dimension.height) / 2) as i32,
        };

        let attrs = WindowAttrs::new(name, title)
            .with_position(position)
            .with_dimension(dimension)
            .with_capabilities(Capabilities::dialog())
            .ontop();
        let wid = manager.create_window(attrs)?;

        let completion = Arc::new(Mutex::new(Some(completion)));

        // Safety net: a teardown that bypasses the dialog API still
        // resolves the completion as (Close, None).
        let pending = Arc::clone(&completion);
        let watch = match manager.events().on("window:destroy", move |args| {
            if args.first().and_then(Json::as_u64) == Some(u64::from(wid)) {
                if let Some(complete) = pending.lock().take() {
                    complete(DialogResult {
                        action: DialogAction::Close,
                        value: None,
                    });
                }
            }
            Ok(EventOutcome::Pass)
        }) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Dialog {} could not watch teardown: {}", wid, e);
                None
            }
        };

        Ok(Self {
            manager,
            wid,
            completion,
            close_guard: Mutex::new(None),
            watch: Mutex::new(watch),
        })
    }

    pub fn wid(&self) -> Wid {
        self.wid
    }

    pub fn is_open(&self) -> bool {
        self.manager.get(self.wid).is_some()
    }

    /// Install a guard consulted before non-forced closes
    pub fn set_close_guard(&self, guard: CloseGuardFn) {
        *self.close_guard.lock() = Some(guard);
    }

    /// Resolve the dialog with a button press
    ///
    /// Completes first, then tears the window down, so the completion
    /// observes the pressed action rather than the teardown.
    pub fn button(&self, action: DialogAction, value: Option<Json>) {
        self.complete(DialogResult { action, value });
        let _ = self.manager.close_window(self.wid, true);
    }

    /// Keyboard intake; Escape cancels with no value
    pub fn key(&self, key: &str) -> bool {
        if key == "Escape" {
            self.button(DialogAction::Cancel, None);
            true
        } else {
            false
        }
    }

    /// Close via the titlebar; the guard may veto
    pub fn close(&self) -> bool {
        if let Some(guard) = self.close_guard.lock().as_ref() {
            if !guard() {
                debug!("Dialog {} close vetoed by guard", self.wid);
                return false;
            }
        }
        self.teardown();
        true
    }

    /// Forced teardown (logout, parent gone); the guard is not consulted
    pub fn force_close(&self) {
        self.teardown();
    }

    fn teardown(&self) {
        self.complete(DialogResult {
            action: DialogAction::Close,
            value: None,
        });
        let _ = self.manager.close_window(self.wid, true);
    }

    fn complete(&self, result: DialogResult) {
        if let Some(complete) = self.completion.lock().take() {
            complete(result);
        }
        self.unwatch();
    }

    /// Drop the teardown subscription once it can no longer matter
    fn unwatch(&self) {
        if let Some(id) = self.watch.lock().take() {
            let _ = self.manager.events().off("window:destroy", Some(id));
        }
    }
}

impl Drop for DialogWindow {
    fn drop(&mut self) {
        self.unwatch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Viewport;
    use parking_lot::RwLock;
    use serde_json::json;

    fn manager() -> Arc<WindowManager> {
        Arc::new(WindowManager::new(Viewport {
            width: 1280,
            height: 720,
        }))
    }

    fn open(
        manager: &Arc<WindowManager>,
        results: &Arc<RwLock<Vec<DialogResult>>>,
    ) -> DialogWindow {
        let sink = Arc::clone(results);
        DialogWindow::open(
            Arc::clone(manager),
            "TestDialog",
            "Question",
            Dimension::default(),
            Box::new(move |result| sink.write().push(result)),
        )
        .unwrap()
    }

    #[test]
    fn test_button_completes_with_value() {
        let manager = manager();
        let results = Arc::new(RwLock::new(Vec::new()));
        let dialog = open(&manager, &results);

        dialog.button(DialogAction::Ok, Some(json!("hello")));

        assert_eq!(
            *results.read(),
            vec![DialogResult {
                action: DialogAction::Ok,
                value: Some(json!("hello")),
            }]
        );
        assert!(!dialog.is_open());
    }

    #[test]
    fn test_completion_fires_exactly_once() {
        let manager = manager();
        let results = Arc::new(RwLock::new(Vec::new()));
        let dialog = open(&manager, &results);

        dialog.button(DialogAction::Yes, None);
        dialog.button(DialogAction::No, None);
        dialog.force_close();

        assert_eq!(results.read().len(), 1);
        assert_eq!(results.read()[0].action, DialogAction::Yes);
    }

    #[test]
    fn test_escape_cancels_without_value() {
        let manager = manager();
        let results = Arc::new(RwLock::new(Vec::new()));
        let dialog = open(&manager, &results);

        assert!(dialog.key("Escape"));
        assert_eq!(
            *results.read(),
            vec![DialogResult {
                action: DialogAction::Cancel,
                value: None,
            }]
        );
    }

    #[test]
    fn test_other_keys_pass_through() {
        let manager = manager();
        let results = Arc::new(RwLock::new(Vec::new()));
        let dialog = open(&manager, &results);

        assert!(!dialog.key("Enter"));
        assert!(results.read().is_empty());
        assert!(dialog.is_open());
    }

    #[test]
    fn test_close_guard_vetoes_but_force_wins() {
        let manager = manager();
        let results = Arc::new(RwLock::new(Vec::new()));
        let dialog = open(&manager, &results);
        dialog.set_close_guard(Box::new(|| false));

        assert!(!dialog.close());
        assert!(dialog.is_open());
        assert!(results.read().is_empty());

        dialog.force_close();
        assert!(!dialog.is_open());
        assert_eq!(results.read()[0].action, DialogAction::Close);
        assert_eq!(results.read()[0].value, None);
    }

    #[test]
    fn test_manager_teardown_resolves_completion() {
        let manager = manager();
        let results = Arc::new(RwLock::new(Vec::new()));
        let dialog = open(&manager, &results);

        // Close behind the dialog's back
        manager.close_window(dialog.wid(), true).unwrap();

        assert_eq!(results.read().len(), 1);
        assert_eq!(results.read()[0].action, DialogAction::Close);
    }

    #[test]
    fn test_no_listeners_linger_after_resolution() {
        let manager = manager();
        let results = Arc::new(RwLock::new(Vec::new()));

        for _ in 0..50 {
            let dialog = open(&manager, &results);
            dialog.button(DialogAction::Ok, None);
        }

        assert_eq!(results.read().len(), 50);
        assert_eq!(manager.events().listener_count("window:destroy"), 0);
    }

    #[test]
    fn test_watch_goes_with_the_handle() {
        let manager = manager();
        let results = Arc::new(RwLock::new(Vec::new()));
        let dialog = open(&manager, &results);

        // Teardown behind the dialog's back, then release the handle
        manager.close_window(dialog.wid(), true).unwrap();
        drop(dialog);

        assert_eq!(results.read().len(), 1);
        assert_eq!(manager.events().listener_count("window:destroy"), 0);
    }

    #[test]
    fn test_dialog_is_centered_and_unlisted() {
        let manager = manager();
        let results = Arc::new(RwLock::new(Vec::new()));
        let dialog = open(&manager, &results);

        let window = manager.get(dialog.wid()).unwrap();
        let pos = window.read().position();
        assert_eq!(pos.x, (1280 - 640) / 2);
        assert_eq!(pos.y, (720 - 480) / 2);
        assert!(manager.window_list().is_empty());
    }
}
