/*!
 * Settings Manager
 * Named pools with separate defaults and a backend save hook
 */

use crate::core::types::Json;
use crate::handler::Handler;
use log::{debug, warn};
use parking_lot::RwLock;
use serde_json::Map;
use std::sync::Arc;
use thiserror::Error;

/// Settings operation result
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Settings errors
///
/// Only `save` crosses the process boundary; everything else is in-memory
/// and deliberately non-failing (see the pool fallback rules below).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Settings save failed for pool '{pool}': {reason}")]
    Save { pool: String, reason: String },
}

/// Process-wide settings store
///
/// Pools are named JSON trees. Defaults are registered separately from live
/// storage, and reads fall back to defaults per pool, all-or-nothing: a live
/// pool with any key set suppresses defaults for EVERY key of that pool.
/// Multiple call sites depend on this whole-pool replacement semantics; do
/// not change it to a per-key merge.
pub struct SettingsManager {
    storage: RwLock<Map<String, Json>>,
    defaults: RwLock<Map<String, Json>>,
    handler: RwLock<Option<Arc<dyn Handler>>>,
}

impl SettingsManager {
    pub fn new() -> Self {
        Self {
            storage: RwLock::new(Map::new()),
            defaults: RwLock::new(Map::new()),
            handler: RwLock::new(None),
        }
    }

    /// Replace the whole live storage tree (session bootstrap)
    pub fn init(&self, tree: Json) {
        match tree {
            Json::Object(map) => *self.storage.write() = map,
            other => warn!("settings init ignored non-object tree: {}", other),
        }
    }

    /// Attach the backend handler used by [`SettingsManager::save`]
    pub fn set_handler(&self, handler: Arc<dyn Handler>) {
        *self.handler.write() = Some(handler);
    }

    /// Register the defaults tree for a pool
    pub fn defaults(&self, pool: &str, tree: Json) {
        self.defaults.write().insert(pool.to_string(), tree);
    }

    /// Whole-pool read: the live tree when non-empty, else the defaults
    /// tree (which may itself be absent).
    pub fn get(&self, pool: &str) -> Option<Json> {
        if let Some(live) = self.storage.read().get(pool) {
            if !is_empty_tree(live) {
                return Some(live.clone());
            }
        }
        self.defaults.read().get(pool).cloned()
    }

    /// Single-key read with the all-or-nothing pool fallback
    ///
    /// A non-empty live pool answers for every key, including the ones it
    /// does not contain (those read as `None`, not as their default).
    pub fn get_key(&self, pool: &str, key: &str) -> Option<Json> {
        {
            let storage = self.storage.read();
            if let Some(live) = storage.get(pool) {
                if !is_empty_tree(live) {
                    return live.get(key).cloned();
                }
            }
        }
        self.defaults.read().get(pool).and_then(|d| d.get(key).cloned())
    }

    /// Replace an entire pool tree
    ///
    /// Always reports `true`; internal faults are logged, never surfaced.
    /// Compatibility quirk carried from the original semantics - callers
    /// that need to observe persistence failures must use `save`.
    pub fn set(&self, pool: &str, value: Json) -> bool {
        self.storage.write().insert(pool.to_string(), value);
        true
    }

    /// Set a single key, lazily creating the pool tree
    pub fn set_key(&self, pool: &str, key: &str, value: Json) -> bool {
        let mut storage = self.storage.write();
        let entry = storage
            .entry(pool.to_string())
            .or_insert_with(|| Json::Object(Map::new()));
        match entry.as_object_mut() {
            Some(map) => {
                map.insert(key.to_string(), value);
            }
            None => {
                // Pool held a non-object tree; replace it rather than fail
                warn!("pool '{}' held a non-object tree, replacing", pool);
                let mut map = Map::new();
                map.insert(key.to_string(), value);
                *entry = Json::Object(map);
            }
        }
        true
    }

    /// Persist through the active handler
    ///
    /// The FULL storage tree is sent even when only `pool` changed; the
    /// handler owns pool-scoped persistence.
    pub fn save(&self, pool: &str) -> SettingsResult<()> {
        let handler = self.handler.read().clone();
        let Some(handler) = handler else {
            debug!("no handler attached, save('{}') is a no-op", pool);
            return Ok(());
        };
        let tree = Json::Object(self.storage.read().clone());
        handler
            .save_settings(pool, &tree)
            .map_err(|e| SettingsError::Save {
                pool: pool.to_string(),
                reason: e.to_string(),
            })
    }

    /// Bound accessor for one pool, registering its defaults up front
    pub fn instance(self: &Arc<Self>, pool: &str, defaults: Option<Json>) -> PoolAccessor {
        if let Some(tree) = defaults {
            self.defaults(pool, tree);
        }
        PoolAccessor {
            manager: Arc::clone(self),
            pool: pool.to_string(),
        }
    }
}

impl Default for SettingsManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Accessor bound to a single pool
#[derive(Clone)]
pub struct PoolAccessor {
    manager: Arc<SettingsManager>,
    pool: String,
}

impl PoolAccessor {
    pub fn pool(&self) -> &str {
        &self.pool
    }

    pub fn get(&self) -> Option<Json> {
        self.manager.get(&self.pool)
    }

    pub fn get_key(&self, key: &str) -> Option<Json> {
        self.manager.get_key(&self.pool, key)
    }

    pub fn set_key(&self, key: &str, value: Json) -> bool {
        self.manager.set_key(&self.pool, key, value)
    }

    pub fn save(&self) -> SettingsResult<()> {
        self.manager.save(&self.pool)
    }
}

/// A pool tree counts as empty when absent semantics should apply
fn is_empty_tree(value: &Json) -> bool {
    match value {
        Json::Null => true,
        Json::Object(map) => map.is_empty(),
        Json::Array(arr) => arr.is_empty(),
        _ => false,
    }
}
