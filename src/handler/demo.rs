/*!
 * Demo Handler
 * In-memory credential table with JSON-file settings persistence
 */

use super::{Handler, HandlerError, HandlerResult, UserInfo};
use crate::core::types::Json;
use log::{debug, info};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Reference handler backed by a static user table
///
/// Settings are kept pool-scoped in memory and, when a settings file is
/// configured, mirrored to disk as one JSON document per save.
pub struct DemoHandler {
    users: HashMap<String, String>,
    session: RwLock<Option<UserInfo>>,
    settings_file: Option<PathBuf>,
    saved: RwLock<serde_json::Map<String, Json>>,
}

impl DemoHandler {
    pub fn new() -> Self {
        let mut users = HashMap::new();
        users.insert("demo".to_string(), "demo".to_string());
        Self {
            users,
            session: RwLock::new(None),
            settings_file: None,
            saved: RwLock::new(serde_json::Map::new()),
        }
    }

    /// Add a credential pair
    #[must_use]
    pub fn with_user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.users.insert(username.into(), password.into());
        self
    }

    /// Mirror saved settings to a JSON file
    #[must_use]
    pub fn with_settings_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_file = Some(path.into());
        self
    }

    /// Pool tree captured by the last save, if any
    pub fn saved_pool(&self, pool: &str) -> Option<Json> {
        self.saved.read().get(pool).cloned()
    }

    fn flush(&self) -> HandlerResult<()> {
        if let Some(ref path) = self.settings_file {
            let saved = self.saved.read();
            let data = serde_json::to_vec_pretty(&Json::Object(saved.clone()))
                .map_err(|e| HandlerError::Storage(e.to_string()))?;
            fs::write(path, data).map_err(|e| HandlerError::Storage(e.to_string()))?;
            debug!("Settings flushed to {}", path.display());
        }
        Ok(())
    }
}

impl Default for DemoHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for DemoHandler {
    fn login(&self, username: &str, password: &str) -> HandlerResult<UserInfo> {
        match self.users.get(username) {
            Some(expected) if expected == password => {
                let user = UserInfo {
                    username: username.to_string(),
                    name: username.to_string(),
                    groups: vec!["user".to_string()],
                };
                *self.session.write() = Some(user.clone());
                info!("User '{}' logged in", username);
                Ok(user)
            }
            _ => Err(HandlerError::AuthFailed(username.to_string())),
        }
    }

    fn logout(&self, save: bool) -> HandlerResult<()> {
        let user = self.session.write().take().ok_or(HandlerError::NotLoggedIn)?;
        if save {
            self.flush()?;
        }
        info!("User '{}' logged out", user.username);
        Ok(())
    }

    fn save_settings(&self, pool: &str, tree: &Json) -> HandlerResult<()> {
        // The full storage tree arrives; persist only the named pool
        let value = tree.get(pool).cloned().unwrap_or(Json::Null);
        self.saved.write().insert(pool.to_string(), value);
        self.flush()
    }

    fn current_user(&self) -> Option<UserInfo> {
        self.session.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_logout() {
        let handler = DemoHandler::new();
        assert!(handler.current_user().is_none());

        let user = handler.login("demo", "demo").unwrap();
        assert_eq!(user.username, "demo");
        assert!(handler.current_user().is_some());

        handler.logout(false).unwrap();
        assert!(handler.current_user().is_none());
    }

    #[test]
    fn test_login_bad_credentials() {
        let handler = DemoHandler::new();
        assert_eq!(
            handler.login("demo", "wrong"),
            Err(HandlerError::AuthFailed("demo".to_string()))
        );
    }

    #[test]
    fn test_logout_without_session() {
        let handler = DemoHandler::new();
        assert_eq!(handler.logout(false), Err(HandlerError::NotLoggedIn));
    }

    #[test]
    fn test_save_settings_scopes_pool() {
        let handler = DemoHandler::new();
        let tree = serde_json::json!({
            "CoreWM": {"theme": "dark"},
            "UserSession": []
        });

        handler.save_settings("CoreWM", &tree).unwrap();
        assert_eq!(
            handler.saved_pool("CoreWM"),
            Some(serde_json::json!({"theme": "dark"}))
        );
        // Other pools from the full tree are not captured
        assert!(handler.saved_pool("UserSession").is_none());
    }

    #[test]
    fn test_settings_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let handler = DemoHandler::new().with_settings_file(&path);

        let tree = serde_json::json!({"CoreWM": {"theme": "dark"}});
        handler.save_settings("CoreWM", &tree).unwrap();

        let written: Json = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written["CoreWM"]["theme"], "dark");
    }
}
