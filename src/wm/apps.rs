/*!
 * Application Registry
 * Running-application bookkeeping for launch, focus and session capture
 */

use crate::core::types::{Json, Wid};
use ahash::RandomState;
use dashmap::DashMap;
use log::debug;

/// One running application and the windows it owns
#[derive(Debug, Clone)]
pub struct AppEntry {
    pub name: String,
    /// Launch arguments, replayed verbatim on session resume
    pub args: Json,
    pub windows: Vec<Wid>,
}

/// Tracks running applications by name
///
/// Names are unique among running instances; singleton enforcement at
/// launch time reduces to a `contains` check here.
pub struct AppRegistry {
    apps: DashMap<String, AppEntry, RandomState>,
}

impl AppRegistry {
    pub fn new() -> Self {
        Self {
            apps: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Record a launched application; re-registering replaces the entry
    pub fn register(&self, name: impl Into<String>, args: Json) {
        let name = name.into();
        debug!("App '{}' registered", name);
        self.apps.insert(
            name.clone(),
            AppEntry {
                name,
                args,
                windows: Vec::new(),
            },
        );
    }

    pub fn remove(&self, name: &str) -> Option<AppEntry> {
        debug!("App '{}' removed", name);
        self.apps.remove(name).map(|(_, entry)| entry)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.apps.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<AppEntry> {
        self.apps.get(name).map(|e| e.clone())
    }

    /// Attach a window to its owning application
    pub fn attach_window(&self, name: &str, wid: Wid) -> bool {
        match self.apps.get_mut(name) {
            Some(mut entry) => {
                if !entry.windows.contains(&wid) {
                    entry.windows.push(wid);
                }
                true
            }
            None => false,
        }
    }

    pub fn detach_window(&self, name: &str, wid: Wid) -> bool {
        match self.apps.get_mut(name) {
            Some(mut entry) => {
                entry.windows.retain(|&w| w != wid);
                true
            }
            None => false,
        }
    }

    /// Snapshot of every running application, ordered by name
    pub fn all(&self) -> Vec<AppEntry> {
        let mut apps: Vec<AppEntry> = self.apps.iter().map(|e| e.clone()).collect();
        apps.sort_by(|a, b| a.name.cmp(&b.name));
        apps
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

impl Default for AppRegistry {
    fn default() -> Self {
        Self::new()
    }
}
