/*!
 * Window
 * A single top-level surface with lifecycle and geometry state
 */

use super::types::*;
use crate::core::types::Wid;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Construction attributes for a window
#[derive(Debug, Clone)]
pub struct WindowAttrs {
    pub name: String,
    pub title: String,
    pub icon: Option<String>,
    /// Explicit placement; the manager assigns a default when absent
    pub position: Option<Position>,
    pub dimension: Dimension,
    pub capabilities: Capabilities,
    pub ontop: bool,
}

impl WindowAttrs {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            icon: None,
            position: None,
            dimension: Dimension::default(),
            capabilities: Capabilities::default(),
            ontop: false,
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimension = dimension;
        self
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    #[must_use]
    pub fn ontop(mut self) -> Self {
        self.ontop = true;
        self
    }
}

/// Mutable state flags, serialized into session snapshots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFlags {
    pub minimized: bool,
    pub maximized: bool,
    pub ontop: bool,
}

/// Handle for checking whether a window still exists
///
/// A pending backend request has no abort primitive; completions arriving
/// after the window is destroyed consult this guard and drop the result
/// instead of mutating dead state.
#[derive(Debug, Clone)]
pub struct LivenessGuard(Arc<AtomicBool>);

impl LivenessGuard {
    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A single top-level window
///
/// Lifecycle transitions are driven by the owning [`super::WindowManager`];
/// the window itself only validates them and reports which manager event
/// each transition produces.
pub struct Window {
    wid: Wid,
    name: String,
    title: String,
    icon: Option<String>,
    position: Position,
    dimension: Dimension,
    state: StateFlags,
    capabilities: Capabilities,
    phase: Phase,
    // Guards the close event against double emission
    close_emitted: bool,
    alive: Arc<AtomicBool>,
}

impl Window {
    pub fn new(wid: Wid, attrs: WindowAttrs, position: Position) -> Self {
        Self {
            wid,
            name: attrs.name,
            title: attrs.title,
            icon: attrs.icon,
            position: attrs.position.unwrap_or(position),
            dimension: attrs.dimension,
            state: StateFlags {
                ontop: attrs.ontop,
                ..Default::default()
            },
            capabilities: attrs.capabilities,
            phase: Phase::Constructed,
            close_emitted: false,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn wid(&self) -> Wid {
        self.wid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn state(&self) -> StateFlags {
        self.state
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_focused(&self) -> bool {
        self.phase == Phase::Focused
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.phase, Phase::Closing | Phase::Destroyed)
    }

    pub fn guard(&self) -> LivenessGuard {
        LivenessGuard(Arc::clone(&self.alive))
    }

    /// Move the window (drag or programmatic)
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Resize the window; refused when the capability is absent
    pub fn set_dimension(&mut self, dimension: Dimension) -> bool {
        if !self.capabilities.resize {
            return false;
        }
        self.dimension = dimension;
        true
    }

    pub fn set_minimized(&mut self, minimized: bool) -> bool {
        if !self.capabilities.minimize {
            return false;
        }
        self.state.minimized = minimized;
        true
    }

    pub fn set_maximized(&mut self, maximized: bool) -> bool {
        if !self.capabilities.maximize {
            return false;
        }
        self.state.maximized = maximized;
        true
    }

    /// Attach the surface: `Constructed -> Initialized`, fires once
    pub fn init(&mut self) -> WindowResult<WindowEvent> {
        if self.phase != Phase::Constructed {
            return Err(WindowError::InvalidTransition {
                from: self.phase,
                to: Phase::Initialized,
            });
        }
        self.phase = Phase::Initialized;
        Ok(WindowEvent::Create)
    }

    /// Take focus; `None` when already focused or not focusable
    pub fn take_focus(&mut self) -> Option<WindowEvent> {
        match self.phase {
            Phase::Initialized | Phase::Blurred => {
                self.phase = Phase::Focused;
                Some(WindowEvent::Focus)
            }
            _ => None,
        }
    }

    /// Drop focus; `None` when the window was not focused
    pub fn drop_focus(&mut self) -> Option<WindowEvent> {
        if self.phase == Phase::Focused {
            self.phase = Phase::Blurred;
            Some(WindowEvent::Blur)
        } else {
            None
        }
    }

    /// Enter teardown; idempotent, `false` when already closing/destroyed
    pub fn begin_close(&mut self) -> bool {
        if self.is_closed() {
            return false;
        }
        self.phase = Phase::Closing;
        true
    }

    /// Finish teardown; returns the `close` event exactly once per window
    pub fn destroy(&mut self) -> Option<WindowEvent> {
        self.phase = Phase::Destroyed;
        self.alive.store(false, Ordering::SeqCst);
        if self.close_emitted {
            return None;
        }
        self.close_emitted = true;
        Some(WindowEvent::Close)
    }
}
