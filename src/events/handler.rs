/*!
 * Event Registry
 * Named-event subscription with veto semantics
 */

use crate::core::types::{Json, SubscriptionId};
use log::warn;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Event operation result
pub type EventResult<T> = Result<T, EventError>;

/// Event registry errors
///
/// These represent contract violations by the caller and are surfaced
/// synchronously, unlike listener failures which are logged and swallowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Invalid event name: {0:?}")]
    InvalidName(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),
}

/// Outcome of a single listener invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Continue the chain, emit result unaffected
    Pass,
    /// Continue the chain, but the overall emit result becomes `false`
    Veto,
}

/// Listener signature
///
/// A listener returning `Err` is logged and treated as [`EventOutcome::Pass`];
/// it never halts the chain or escapes `emit`.
pub type EventCallback = dyn Fn(&[Json]) -> Result<EventOutcome, String> + Send + Sync;

struct Subscription {
    id: SubscriptionId,
    callback: Arc<EventCallback>,
}

/// Named-event registry with ordered invocation and a veto protocol
///
/// Subscription specs may be a single name, a comma-separated list, or a
/// `*` pattern matched against the names registered at subscription time.
/// Pattern matches are not retroactive: names registered later do not
/// inherit earlier pattern subscriptions.
pub struct EventHandler {
    name: String,
    // BTreeMap keeps pattern expansion deterministic
    events: RwLock<BTreeMap<String, Vec<Subscription>>>,
    next_id: AtomicU64,
}

impl EventHandler {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Subscribe a listener to one or more events
    ///
    /// Returns a handle usable with [`EventHandler::off`]. All names produced
    /// by the spec (list entries, pattern matches) share the same handle.
    pub fn on<F>(&self, spec: &str, callback: F) -> EventResult<SubscriptionId>
    where
        F: Fn(&[Json]) -> Result<EventOutcome, String> + Send + Sync + 'static,
    {
        let names = self.expand_spec(spec)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let callback: Arc<EventCallback> = Arc::new(callback);

        let mut events = self.events.write();
        for name in names {
            events.entry(name).or_default().push(Subscription {
                id,
                callback: Arc::clone(&callback),
            });
        }
        Ok(id)
    }

    /// Remove a subscription, or every subscription for `name` when no
    /// handle is given. Unknown event names fail fast.
    pub fn off(&self, name: &str, id: Option<SubscriptionId>) -> EventResult<()> {
        let mut events = self.events.write();
        let subs = events
            .get_mut(name)
            .ok_or_else(|| EventError::UnknownEvent(name.to_string()))?;
        match id {
            Some(id) => subs.retain(|s| s.id != id),
            None => subs.clear(),
        }
        Ok(())
    }

    /// Invoke all listeners for `name` in registration order
    ///
    /// Returns `false` if any listener vetoed, `true` otherwise. Listener
    /// errors are logged against this registry's name and count as a pass.
    pub fn emit(&self, name: &str, args: &[Json]) -> bool {
        // Clone the callbacks out of the lock so listeners may re-enter
        // the registry (subscribe, emit) without deadlocking.
        let callbacks: Vec<Arc<EventCallback>> = {
            let events = self.events.read();
            match events.get(name) {
                Some(subs) => subs.iter().map(|s| Arc::clone(&s.callback)).collect(),
                None => return true,
            }
        };

        let mut result = true;
        for callback in callbacks {
            match callback(args) {
                Ok(EventOutcome::Pass) => {}
                Ok(EventOutcome::Veto) => result = false,
                Err(e) => {
                    warn!("[{}] listener for '{}' failed: {}", self.name, name, e);
                }
            }
        }
        result
    }

    /// Number of live subscriptions for an event name
    pub fn listener_count(&self, name: &str) -> usize {
        self.events.read().get(name).map_or(0, Vec::len)
    }

    /// Expand a subscription spec into concrete event names
    fn expand_spec(&self, spec: &str) -> EventResult<Vec<String>> {
        if spec.trim().is_empty() {
            return Err(EventError::InvalidName(spec.to_string()));
        }

        let mut names = Vec::new();
        for token in spec.split(',') {
            let token = token.trim();
            if token.is_empty() {
                return Err(EventError::InvalidName(spec.to_string()));
            }
            if token.contains('*') {
                // Patterns bind to the names registered right now
                let events = self.events.read();
                names.extend(events.keys().filter(|k| glob_match(token, k)).cloned());
            } else {
                names.push(token.to_string());
            }
        }
        Ok(names)
    }
}

/// Match `name` against a pattern where `*` spans any substring
fn glob_match(pattern: &str, name: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == name;
    }

    // First fragment anchors at the start, last at the end
    let first = parts[0];
    if !name.starts_with(first) {
        return false;
    }
    let mut pos = first.len();

    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        match name[pos..].find(part) {
            Some(idx) => pos += idx + part.len(),
            None => return false,
        }
    }

    let last = parts[parts.len() - 1];
    if last.is_empty() {
        return true;
    }
    name.len() >= pos + last.len() && name.ends_with(last)
}
