/*!
 * Session Capture
 * Serializes running applications and window geometry into settings
 */

use super::apps::AppRegistry;
use super::manager::WindowManager;
use super::types::{Dimension, Position};
use super::window::StateFlags;
use crate::core::types::Json;
use crate::settings::{SettingsManager, SettingsResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Settings pool the session snapshot lives in
pub const SESSION_POOL: &str = "UserSession";

/// Geometry and state of one window at capture time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub name: String,
    pub position: Position,
    pub dimension: Dimension,
    pub state: StateFlags,
}

/// One application in the session snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub name: String,
    pub args: Json,
    pub windows: Vec<WindowSnapshot>,
}

/// A launch to replay on resume
///
/// `args` carries the original launch arguments plus `__resume__` and,
/// when geometry was captured, `__windows__` for the application to
/// restore its surfaces from.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRequest {
    pub name: String,
    pub args: Json,
}

/// Capture the running session into the settings store and persist it
///
/// Only windows carrying the session capability are captured; dialogs
/// and other transient surfaces are skipped.
pub fn save_session(
    apps: &AppRegistry,
    wm: &WindowManager,
    settings: &SettingsManager,
) -> SettingsResult<()> {
    let mut entries = Vec::new();
    for app in apps.all() {
        let windows: Vec<WindowSnapshot> = app
            .windows
            .iter()
            .filter_map(|&wid| wm.get(wid))
            .filter_map(|window| {
                let w = window.read();
                if !w.capabilities().session || w.is_closed() {
                    return None;
                }
                Some(WindowSnapshot {
                    name: w.name().to_string(),
                    position: w.position(),
                    dimension: w.dimension(),
                    state: w.state(),
                })
            })
            .collect();

        entries.push(SessionEntry {
            name: app.name,
            args: app.args,
            windows,
        });
    }

    debug!("Session captured: {} application(s)", entries.len());
    settings.set(SESSION_POOL, json!(entries));
    settings.save(SESSION_POOL)
}

/// Read the stored session back as launch requests
pub fn load_session(settings: &SettingsManager) -> Vec<LaunchRequest> {
    let Some(tree) = settings.get(SESSION_POOL) else {
        return Vec::new();
    };

    let entries: Vec<SessionEntry> = match serde_json::from_value(tree) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Stored session is malformed, ignoring: {}", e);
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .map(|entry| {
            let mut args = match entry.args {
                Json::Object(map) => map,
                other => {
                    // Non-object launch args survive under their own key
                    let mut map = serde_json::Map::new();
                    if !other.is_null() {
                        map.insert("args".to_string(), other);
                    }
                    map
                }
            };
            args.insert("__resume__".to_string(), json!(true));
            if !entry.windows.is_empty() {
                args.insert("__windows__".to_string(), json!(entry.windows));
            }
            LaunchRequest {
                name: entry.name,
                args: Json::Object(args),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Viewport;
    use crate::wm::types::Capabilities;
    use crate::wm::window::WindowAttrs;

    fn fixture() -> (AppRegistry, WindowManager, SettingsManager) {
        (
            AppRegistry::new(),
            WindowManager::new(Viewport {
                width: 1280,
                height: 720,
            }),
            SettingsManager::new(),
        )
    }

    #[test]
    fn test_round_trip_session() {
        let (apps, wm, settings) = fixture();
        apps.register("Editor", json!({"file": "home://notes.txt"}));
        let wid = wm
            .create_window(WindowAttrs::new("EditorWindow", "Editor").with_position(Position {
                x: 40,
                y: 60,
            }))
            .unwrap();
        apps.attach_window("Editor", wid);

        save_session(&apps, &wm, &settings).unwrap();
        let launches = load_session(&settings);

        assert_eq!(launches.len(), 1);
        let launch = &launches[0];
        assert_eq!(launch.name, "Editor");
        assert_eq!(launch.args["file"], json!("home://notes.txt"));
        assert_eq!(launch.args["__resume__"], json!(true));

        let windows: Vec<WindowSnapshot> =
            serde_json::from_value(launch.args["__windows__"].clone()).unwrap();
        assert_eq!(windows[0].name, "EditorWindow");
        assert_eq!(windows[0].position, Position { x: 40, y: 60 });
    }

    #[test]
    fn test_dialogs_excluded_from_capture() {
        let (apps, wm, settings) = fixture();
        apps.register("App", json!({}));
        let wid = wm
            .create_window(
                WindowAttrs::new("AppDialog", "Question")
                    .with_capabilities(Capabilities::dialog()),
            )
            .unwrap();
        apps.attach_window("App", wid);

        save_session(&apps, &wm, &settings).unwrap();
        let launches = load_session(&settings);

        assert_eq!(launches.len(), 1);
        assert!(launches[0].args.get("__windows__").is_none());
    }

    #[test]
    fn test_empty_session_loads_empty() {
        let (_, _, settings) = fixture();
        assert!(load_session(&settings).is_empty());
    }

    #[test]
    fn test_malformed_session_ignored() {
        let (_, _, settings) = fixture();
        settings.set(SESSION_POOL, json!({"not": "a session"}));
        assert!(load_session(&settings).is_empty());
    }
}
