/*!
 * Window Manager
 * Window registry, focus discipline, placement and desktop chrome state
 */

use super::types::*;
use super::window::{Window, WindowAttrs};
use crate::core::types::{Insets, Rect, Viewport, Wid};
use crate::events::EventHandler;
use ahash::RandomState;
use dashmap::DashMap;
use log::{debug, info};
use parking_lot::RwLock;
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Cascade step for default window placement
const CASCADE_STEP: i32 = 24;

/// Entry in the desktop window-list panel
///
/// Matched by the window's stable id, never by index - the list mutates
/// concurrently with lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowListEntry {
    pub wid: Wid,
    pub title: String,
    pub focused: bool,
}

/// Owns the window registry and mediates every lifecycle transition
///
/// Z-order baseline is insertion order; focusing raises a window to the
/// top. At most one window is focused at any time, and the previous
/// holder is blurred before the next receives focus.
pub struct WindowManager {
    windows: DashMap<Wid, Arc<RwLock<Window>>, RandomState>,
    z_order: RwLock<Vec<Wid>>,
    focused: RwLock<Option<Wid>>,
    // Focus falls back here when the focused window closes
    last_focused: RwLock<Option<Wid>>,
    window_list: RwLock<Vec<WindowListEntry>>,
    viewport: RwLock<Viewport>,
    insets: RwLock<Insets>,
    events: EventHandler,
    next_wid: AtomicU32,
    cascade: AtomicU32,
}

impl WindowManager {
    pub fn new(viewport: Viewport) -> Self {
        info!("Window manager initialized ({}x{})", viewport.width, viewport.height);
        Self {
            windows: DashMap::with_hasher(RandomState::new()),
            z_order: RwLock::new(Vec::new()),
            focused: RwLock::new(None),
            last_focused: RwLock::new(None),
            window_list: RwLock::new(Vec::new()),
            viewport: RwLock::new(viewport),
            insets: RwLock::new(Insets::default()),
            events: EventHandler::new("wm"),
            next_wid: AtomicU32::new(1),
            cascade: AtomicU32::new(0),
        }
    }

    /// Event surface: `window:create`, `window:focus`, `window:blur`,
    /// `window:destroy` notifications plus the vetoable `window:close`.
    pub fn events(&self) -> &EventHandler {
        &self.events
    }

    /// Reserve desktop chrome (panels, margins)
    ///
    /// Themed managers override placement by adjusting these insets; the
    /// geometry subtraction itself stays in [`WindowManager::window_space`].
    pub fn set_insets(&self, insets: Insets) {
        *self.insets.write() = insets;
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        *self.viewport.write() = viewport;
    }

    /// Usable desktop rectangle: viewport minus reserved chrome
    pub fn window_space(&self) -> Rect {
        let viewport = *self.viewport.read();
        let insets = *self.insets.read();
        Rect {
            x: insets.left as i32,
            y: insets.top as i32,
            width: viewport.width.saturating_sub(insets.left + insets.right),
            height: viewport.height.saturating_sub(insets.top + insets.bottom),
        }
    }

    /// Default placement for new windows, clamped below top chrome
    pub fn next_position(&self) -> Position {
        let space = self.window_space();
        let step = self.cascade.fetch_add(1, Ordering::Relaxed) as i32;
        let span = (space.height as i32 / 2).max(CASCADE_STEP);
        let offset = (step * CASCADE_STEP) % span;
        Position {
            x: space.x + offset,
            y: space.y + offset,
        }
    }

    /// Create, register and focus a new window
    pub fn create_window(&self, attrs: WindowAttrs) -> WindowResult<Wid> {
        for entry in self.windows.iter() {
            let w = entry.read();
            if w.name() == attrs.name && !w.is_closed() {
                return Err(WindowError::DuplicateName(attrs.name));
            }
        }

        let wid = self.next_wid.fetch_add(1, Ordering::Relaxed);
        let mut window = Window::new(wid, attrs, self.next_position());
        let event = window.init()?;

        debug!("Window {} '{}' created", wid, window.name());
        self.windows.insert(wid, Arc::new(RwLock::new(window)));
        self.z_order.write().push(wid);
        self.event_window(event, wid);

        self.focus(wid)?;
        Ok(wid)
    }

    /// Give a window focus, blurring the current holder first
    ///
    /// A no-op (returns `Ok(false)`) when the window already holds focus
    /// or is closing.
    pub fn focus(&self, wid: Wid) -> WindowResult<bool> {
        let target = self.get(wid).ok_or(WindowError::NotFound(wid))?;
        if target.read().is_closed() {
            return Ok(false);
        }

        // Transition state first, broadcast after the focus lock drops so
        // listeners may read the manager without deadlocking.
        let mut blurred: Option<Wid> = None;
        {
            let mut focused = self.focused.write();
            if *focused == Some(wid) {
                return Ok(false);
            }

            // Blur before focus, each transition exactly once
            if let Some(current) = focused.take() {
                if let Some(window) = self.get(current) {
                    if window.write().drop_focus().is_some() {
                        blurred = Some(current);
                    }
                }
                *self.last_focused.write() = Some(current);
            }

            if target.write().take_focus().is_none() {
                return Ok(false);
            }
            *focused = Some(wid);
        }

        self.raise(wid);
        if let Some(current) = blurred {
            self.event_window(WindowEvent::Blur, current);
        }
        self.event_window(WindowEvent::Focus, wid);
        Ok(true)
    }

    /// Close a window
    ///
    /// Idempotent: closing an already-closing window is a no-op. A
    /// listener on `window:close` may veto unless `force` is set (forced
    /// teardown, e.g. logout, must never deadlock).
    pub fn close_window(&self, wid: Wid, force: bool) -> WindowResult<bool> {
        let window = self.get(wid).ok_or(WindowError::NotFound(wid))?;

        if !force && !self.events.emit("window:close", &[json!(wid)]) {
            debug!("Window {} close vetoed", wid);
            return Ok(false);
        }

        let event = {
            let mut w = window.write();
            if !w.begin_close() {
                return Ok(false);
            }
            w.destroy()
        };

        if let Some(event) = event {
            self.event_window(event, wid);
        }

        self.windows.remove(&wid);
        self.z_order.write().retain(|&z| z != wid);

        // Hand focus back to the previous holder, else the top window
        let needs_refocus = {
            let mut focused = self.focused.write();
            if *focused == Some(wid) {
                *focused = None;
                true
            } else {
                false
            }
        };
        if needs_refocus {
            let fallback = {
                let last = self.last_focused.write().take();
                last.filter(|w| self.windows.contains_key(w))
                    .or_else(|| self.z_order.read().last().copied())
            };
            if let Some(next) = fallback {
                let _ = self.focus(next);
            }
        }

        debug!("Window {} closed", wid);
        Ok(true)
    }

    /// Single intake point for window lifecycle notifications
    ///
    /// Mirrors every event into the window-list representation, keyed by
    /// the stable wid, then broadcasts it.
    pub fn event_window(&self, event: WindowEvent, wid: Wid) {
        let mut list = self.window_list.write();
        match event {
            WindowEvent::Create => {
                let Some(window) = self.get(wid) else { return };
                let w = window.read();
                if w.capabilities().windowlist && !list.iter().any(|e| e.wid == wid) {
                    list.push(WindowListEntry {
                        wid,
                        title: w.title().to_string(),
                        focused: false,
                    });
                }
            }
            WindowEvent::Close => {
                list.retain(|e| e.wid != wid);
            }
            WindowEvent::Focus | WindowEvent::Blur => {
                if let Some(entry) = list.iter_mut().find(|e| e.wid == wid) {
                    entry.focused = event == WindowEvent::Focus;
                }
            }
        }
        drop(list);

        self.events.emit(
            &format!("window:{}", notification_name(event)),
            &[json!(wid)],
        );
    }

    /// Raise a window to the top of the z-order
    fn raise(&self, wid: Wid) {
        let mut z_order = self.z_order.write();
        z_order.retain(|&z| z != wid);
        z_order.push(wid);
    }

    pub fn get(&self, wid: Wid) -> Option<Arc<RwLock<Window>>> {
        self.windows.get(&wid).map(|w| Arc::clone(&w))
    }

    pub fn focused_wid(&self) -> Option<Wid> {
        *self.focused.read()
    }

    pub fn z_order(&self) -> Vec<Wid> {
        self.z_order.read().clone()
    }

    pub fn window_list(&self) -> Vec<WindowListEntry> {
        self.window_list.read().clone()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Snapshot every live window for iteration (session capture)
    pub fn live_windows(&self) -> Vec<Arc<RwLock<Window>>> {
        let z_order = self.z_order.read();
        z_order.iter().filter_map(|&wid| self.get(wid)).collect()
    }
}

/// Notification suffix for an event; `close` is reserved for the veto
fn notification_name(event: WindowEvent) -> &'static str {
    match event {
        WindowEvent::Create => "create",
        WindowEvent::Focus => "focus",
        WindowEvent::Blur => "blur",
        WindowEvent::Close => "destroy",
    }
}
