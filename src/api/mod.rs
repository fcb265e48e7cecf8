/*!
 * Backend API Module
 * Named RPC method registry with per-call privilege gating
 */

use crate::config::Config;
use crate::core::types::Json;
use crate::handler::Handler;
use crate::settings::SettingsManager;
use crate::vfs::{Dispatcher, Operation, PackageRegistry, Request, RequestOptions, VfsError};
use ahash::RandomState;
use dashmap::DashMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// API operation result
pub type ApiResult<T> = Result<T, ApiError>;

/// API errors, serializable for the transport boundary
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum ApiError {
    #[error("Unknown API method: {0}")]
    UnknownMethod(String),

    #[error("Permission denied for method: {0}")]
    PermissionDenied(String),

    #[error("Bad arguments: {0}")]
    BadArguments(String),

    #[error("Backend failure: {0}")]
    Backend(String),
}

/// Caller identity, derived from the active handler session
#[derive(Debug, Clone, Default)]
pub struct ApiContext {
    pub authenticated: bool,
    pub username: Option<String>,
}

impl ApiContext {
    /// Snapshot the current session into a call context
    pub fn from_handler(handler: &Arc<dyn Handler>) -> Self {
        match handler.current_user() {
            Some(user) => Self {
                authenticated: true,
                username: Some(user.username),
            },
            None => Self::default(),
        }
    }
}

/// Method signature: JSON in, JSON out
pub type ApiFn = Box<dyn Fn(&Json, &ApiContext) -> ApiResult<Json> + Send + Sync>;

struct ApiMethod {
    privileged: bool,
    func: ApiFn,
}

/// Named method table
///
/// Privilege is checked before the method body runs; an unauthenticated
/// caller never reaches a privileged function.
pub struct ApiRegistry {
    methods: DashMap<String, ApiMethod, RandomState>,
}

impl ApiRegistry {
    pub fn new() -> Self {
        Self {
            methods: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Register a method; re-registration replaces the previous function
    pub fn register<F>(&self, name: impl Into<String>, privileged: bool, func: F)
    where
        F: Fn(&Json, &ApiContext) -> ApiResult<Json> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!("API method '{}' registered (privileged: {})", name, privileged);
        self.methods.insert(
            name,
            ApiMethod {
                privileged,
                func: Box::new(func),
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Invoke a method on behalf of `ctx`
    pub fn call(&self, name: &str, args: &Json, ctx: &ApiContext) -> ApiResult<Json> {
        let method = self
            .methods
            .get(name)
            .ok_or_else(|| ApiError::UnknownMethod(name.to_string()))?;

        if method.privileged && !ctx.authenticated {
            warn!("Unauthenticated call to privileged method '{}'", name);
            return Err(ApiError::PermissionDenied(name.to_string()));
        }
        (method.func)(args, ctx)
    }
}

impl Default for ApiRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared state the core methods close over
#[derive(Clone)]
pub struct CoreServices {
    pub handler: Arc<dyn Handler>,
    pub settings: Arc<SettingsManager>,
    pub dispatcher: Arc<Dispatcher>,
    pub packages: Arc<PackageRegistry>,
}

/// Attach the built-in method set
///
/// `login` is the only unprivileged method; everything else requires an
/// authenticated session.
pub fn register_core(config: &Config, registry: &ApiRegistry, services: CoreServices) {
    let handler = Arc::clone(&services.handler);
    registry.register("login", false, move |args, _ctx| {
        let username = required_str(args, "username")?;
        let password = required_str(args, "password")?;
        let user = handler
            .login(username, password)
            .map_err(|e| ApiError::Backend(e.to_string()))?;
        info!("User '{}' logged in", user.username);
        serde_json::to_value(user).map_err(|e| ApiError::Backend(e.to_string()))
    });

    let handler = Arc::clone(&services.handler);
    registry.register("logout", true, move |args, ctx| {
        let save = args.get("save").and_then(Json::as_bool).unwrap_or(true);
        handler
            .logout(save)
            .map_err(|e| ApiError::Backend(e.to_string()))?;
        info!("User {:?} logged out", ctx.username);
        Ok(json!(true))
    });

    let settings = Arc::clone(&services.settings);
    registry.register("settings", true, move |args, _ctx| {
        let pool = required_str(args, "pool")?;
        match args.get("tree") {
            // Write: replace the pool and persist
            Some(tree) => {
                settings.set(pool, tree.clone());
                settings
                    .save(pool)
                    .map_err(|e| ApiError::Backend(e.to_string()))?;
                Ok(json!(true))
            }
            // Read: the pool tree, with the default fallback applied
            None => Ok(settings.get(pool).unwrap_or(Json::Null)),
        }
    });

    let packages = Arc::clone(&services.packages);
    registry.register("application", true, move |args, _ctx| {
        match args.get("name").and_then(Json::as_str) {
            Some(name) => {
                let manifest = packages.get(name).ok_or_else(|| {
                    ApiError::BadArguments(format!("unknown application: {name}"))
                })?;
                serde_json::to_value(manifest).map_err(|e| ApiError::Backend(e.to_string()))
            }
            None => serde_json::to_value(packages.all())
                .map_err(|e| ApiError::Backend(e.to_string())),
        }
    });

    let dispatcher = Arc::clone(&services.dispatcher);
    registry.register("fs", true, move |args, _ctx| {
        let (op, req) = parse_fs_call(args)?;
        let response = dispatcher
            .dispatch(op, &req)
            .map_err(|e| ApiError::Backend(e.to_string()))?;
        serde_json::to_value(response).map_err(|e| ApiError::Backend(e.to_string()))
    });

    let curl_timeout = Duration::from_secs(config.curl_timeout_secs);
    registry.register("curl", true, move |args, _ctx| curl(args, curl_timeout));

    info!("Core API registered ({} methods)", registry.len());
}

/// Decode an `fs` call: method name plus request fields
fn parse_fs_call(args: &Json) -> ApiResult<(Operation, Request)> {
    let method = required_str(args, "method")?;
    let op: Operation = method
        .parse()
        .map_err(|e: VfsError| ApiError::BadArguments(e.to_string()))?;

    let path = required_str(args, "path")?
        .parse()
        .map_err(|e: VfsError| ApiError::BadArguments(e.to_string()))?;
    let mut req = Request::new(path);

    if let Some(dest) = args.get("dest").and_then(Json::as_str) {
        let dest = dest
            .parse()
            .map_err(|e: VfsError| ApiError::BadArguments(e.to_string()))?;
        req = req.with_dest(dest);
    }
    if let Some(data) = args.get("data").and_then(Json::as_str) {
        req = req.with_data(data.as_bytes().to_vec());
    }

    let mut options = RequestOptions::default();
    if let Some(overwrite) = args.get("overwrite").and_then(Json::as_bool) {
        options.overwrite = overwrite;
    }
    if let Some(secs) = args.get("timeout").and_then(Json::as_u64) {
        options.timeout = Some(Duration::from_secs(secs));
    }
    Ok((op, req.with_options(options)))
}

/// Proxy an outbound HTTP request
///
/// The timeout is handed to the client so a stalled remote surfaces as
/// `Err` within bounded time instead of hanging the caller.
fn curl(args: &Json, default_timeout: Duration) -> ApiResult<Json> {
    let url = required_str(args, "url")?;
    let method = args.get("method").and_then(Json::as_str).unwrap_or("GET");
    let timeout = args
        .get("timeout")
        .and_then(Json::as_u64)
        .map_or(default_timeout, Duration::from_secs);
    let binary = args.get("binary").and_then(Json::as_bool).unwrap_or(false);

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ApiError::Backend(e.to_string()))?;

    let mut request = match method.to_ascii_uppercase().as_str() {
        "GET" => client.get(url),
        "POST" => client.post(url),
        "PUT" => client.put(url),
        "DELETE" => client.delete(url),
        "HEAD" => client.head(url),
        other => return Err(ApiError::BadArguments(format!("unsupported method: {other}"))),
    };
    if let Some(body) = args.get("body") {
        request = match body {
            Json::String(s) => request.body(s.clone()),
            other => request.json(other),
        };
    }

    let response = request
        .send()
        .map_err(|e| ApiError::Backend(e.to_string()))?;
    let status = response.status().as_u16();
    let body = if binary {
        let bytes = response
            .bytes()
            .map_err(|e| ApiError::Backend(e.to_string()))?;
        json!(bytes.to_vec())
    } else {
        json!(response
            .text()
            .map_err(|e| ApiError::Backend(e.to_string()))?)
    };

    Ok(json!({ "httpCode": status, "body": body }))
}

fn required_str<'a>(args: &'a Json, key: &str) -> ApiResult<&'a str> {
    args.get(key)
        .and_then(Json::as_str)
        .ok_or_else(|| ApiError::BadArguments(format!("missing field: {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::DemoHandler;
    use crate::vfs::{MemStore, Mount, MountFlags, MountRegistry};

    fn services() -> CoreServices {
        let handler: Arc<dyn Handler> = Arc::new(DemoHandler::new());
        let mounts = Arc::new(MountRegistry::new());
        mounts
            .register(Mount::new(
                "Home",
                "home",
                MountFlags::default(),
                Arc::new(MemStore::new("home")),
            ))
            .unwrap();
        CoreServices {
            handler,
            settings: Arc::new(SettingsManager::new()),
            dispatcher: Arc::new(Dispatcher::new(mounts)),
            packages: Arc::new(PackageRegistry::new()),
        }
    }

    fn registry() -> (ApiRegistry, CoreServices) {
        let registry = ApiRegistry::new();
        let services = services();
        register_core(&Config::default(), &registry, services.clone());
        (registry, services)
    }

    fn authed() -> ApiContext {
        ApiContext {
            authenticated: true,
            username: Some("demo".to_string()),
        }
    }

    #[test]
    fn test_unknown_method() {
        let (registry, _) = registry();
        assert_eq!(
            registry.call("nope", &json!({}), &authed()),
            Err(ApiError::UnknownMethod("nope".to_string()))
        );
    }

    #[test]
    fn test_privilege_checked_before_dispatch() {
        let (registry, _) = registry();
        let anon = ApiContext::default();
        assert_eq!(
            registry.call("fs", &json!({}), &anon),
            Err(ApiError::PermissionDenied("fs".to_string()))
        );
    }

    #[test]
    fn test_login_is_unprivileged() {
        let (registry, services) = registry();
        let anon = ApiContext::default();

        let user = registry
            .call(
                "login",
                &json!({"username": "demo", "password": "demo"}),
                &anon,
            )
            .unwrap();
        assert_eq!(user["username"], json!("demo"));
        assert!(ApiContext::from_handler(&services.handler).authenticated);
    }

    #[test]
    fn test_login_failure_surfaces() {
        let (registry, _) = registry();
        let result = registry.call(
            "login",
            &json!({"username": "demo", "password": "wrong"}),
            &ApiContext::default(),
        );
        assert!(matches!(result, Err(ApiError::Backend(_))));
    }

    #[test]
    fn test_fs_write_then_read() {
        let (registry, _) = registry();
        let ctx = authed();

        registry
            .call(
                "fs",
                &json!({"method": "write", "path": "home://a.txt", "data": "hello"}),
                &ctx,
            )
            .unwrap();

        let response = registry
            .call("fs", &json!({"method": "read", "path": "home://a.txt"}), &ctx)
            .unwrap();
        assert_eq!(response["kind"], json!("data"));
        assert_eq!(response["value"], json!(b"hello".to_vec()));
    }

    #[test]
    fn test_fs_bad_method() {
        let (registry, _) = registry();
        let result = registry.call(
            "fs",
            &json!({"method": "explode", "path": "home://a"}),
            &authed(),
        );
        assert!(matches!(result, Err(ApiError::BadArguments(_))));
    }

    #[test]
    fn test_settings_write_and_read_back() {
        let (registry, _) = registry();
        let ctx = authed();

        registry
            .call(
                "settings",
                &json!({"pool": "CoreWM", "tree": {"theme": "dark"}}),
                &ctx,
            )
            .unwrap();
        let tree = registry
            .call("settings", &json!({"pool": "CoreWM"}), &ctx)
            .unwrap();
        assert_eq!(tree, json!({"theme": "dark"}));
    }

    #[test]
    fn test_application_lookup() {
        let (registry, services) = registry();
        services.packages.register(crate::vfs::PackageManifest {
            name: "FileManager".to_string(),
            title: "File Manager".to_string(),
            icon: None,
            singleton: true,
        });

        let manifest = registry
            .call("application", &json!({"name": "FileManager"}), &authed())
            .unwrap();
        assert_eq!(manifest["singleton"], json!(true));

        let result = registry.call("application", &json!({"name": "Ghost"}), &authed());
        assert!(matches!(result, Err(ApiError::BadArguments(_))));
    }

    #[test]
    fn test_curl_requires_url() {
        let (registry, _) = registry();
        let result = registry.call("curl", &json!({}), &authed());
        assert_eq!(
            result,
            Err(ApiError::BadArguments("missing field: url".to_string()))
        );
    }
}
