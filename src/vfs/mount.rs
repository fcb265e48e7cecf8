/*!
 * Mount Registry
 * Named mount records and scheme-prefix routing
 */

use super::types::*;
use ahash::RandomState;
use dashmap::DashMap;
use log::info;
use parking_lot::RwLock;
use std::sync::Arc;

/// Backend transport implemented by every mount
///
/// `request` owns translating the operation into its backend's native call:
/// an HTTP round trip, a local synthetic listing, or delegation to a shared
/// internal transport. Implementations return errors; they never panic
/// across this boundary.
pub trait Transport: Send + Sync {
    fn request(&self, op: Operation, req: &Request) -> VfsResult<Response>;

    /// Transport name for logs
    fn name(&self) -> &str;
}

/// Capability flags carried by a mount record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MountFlags {
    /// Mutating operations are refused before the transport is invoked
    pub read_only: bool,
    /// Backed by the generic internal transport rather than its own protocol
    pub internal: bool,
    /// Synthetic contents (not real storage)
    pub special: bool,
    /// Participates in desktop-wide search
    pub searchable: bool,
    /// Shown in file manager side bars
    pub visible: bool,
}

/// First-class match pattern claiming a URI scheme prefix
///
/// Kept as a value on the mount record so new mounts register without
/// touching the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPattern {
    prefix: String,
}

impl MountPattern {
    /// Pattern claiming `scheme://`
    pub fn scheme(scheme: &str) -> Self {
        Self {
            prefix: format!("{scheme}://"),
        }
    }

    /// Test a raw path string against this pattern
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// Two patterns conflict when one would claim the other's paths
    pub fn overlaps(&self, other: &MountPattern) -> bool {
        self.prefix.starts_with(&other.prefix) || other.prefix.starts_with(&self.prefix)
    }
}

/// Per-call enablement predicate
pub type EnabledFn = Box<dyn Fn() -> bool + Send + Sync>;

/// A named VFS backend registration covering one URI scheme prefix
pub struct Mount {
    name: String,
    root: String,
    pattern: MountPattern,
    flags: MountFlags,
    enabled: EnabledFn,
    transport: Arc<dyn Transport>,
}

impl Mount {
    pub fn new(
        name: impl Into<String>,
        scheme: &str,
        flags: MountFlags,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            name: name.into(),
            root: format!("{scheme}://"),
            pattern: MountPattern::scheme(scheme),
            flags,
            enabled: Box::new(|| true),
            transport,
        }
    }

    /// Replace the enablement predicate, evaluated on every dispatch
    #[must_use]
    pub fn with_enabled<F>(mut self, enabled: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.enabled = Box::new(enabled);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn flags(&self) -> MountFlags {
        self.flags
    }

    pub fn pattern(&self) -> &MountPattern {
        &self.pattern
    }

    pub fn is_enabled(&self) -> bool {
        (self.enabled)()
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

/// Static mapping from symbolic name to mount record
///
/// Populated at startup; no dynamic unmount in this core. Exactly one
/// mount may claim a given scheme prefix - conflicting registrations are
/// rejected, keeping resolution unambiguous.
pub struct MountRegistry {
    mounts: DashMap<String, Arc<Mount>, RandomState>,
    // Registration order; resolution walks this for deterministic matching
    order: RwLock<Vec<String>>,
}

impl MountRegistry {
    pub fn new() -> Self {
        Self {
            mounts: DashMap::with_hasher(RandomState::new()),
            order: RwLock::new(Vec::new()),
        }
    }

    /// Register a mount under its symbolic name
    pub fn register(&self, mount: Mount) -> VfsResult<()> {
        if self.mounts.contains_key(mount.name()) {
            return Err(VfsError::AlreadyExists(format!(
                "mount name already registered: {}",
                mount.name()
            )));
        }
        for existing in self.mounts.iter() {
            if existing.pattern().overlaps(mount.pattern()) {
                return Err(VfsError::AlreadyExists(format!(
                    "scheme prefix {} already claimed by mount '{}'",
                    mount.root(),
                    existing.name()
                )));
            }
        }

        info!("Registered mount '{}' at {}", mount.name(), mount.root());
        let name = mount.name().to_string();
        self.mounts.insert(name.clone(), Arc::new(mount));
        self.order.write().push(name);
        Ok(())
    }

    /// Resolve a path string to its owning mount
    ///
    /// Zero matches is a hard routing error, never a silent no-op.
    pub fn resolve(&self, path: &str) -> VfsResult<Arc<Mount>> {
        let order = self.order.read();
        for name in order.iter() {
            if let Some(mount) = self.mounts.get(name) {
                if mount.pattern().matches(path) {
                    return Ok(Arc::clone(&mount));
                }
            }
        }
        Err(VfsError::Routing(path.to_string()))
    }

    /// Look up a mount by symbolic name
    pub fn get(&self, name: &str) -> Option<Arc<Mount>> {
        self.mounts.get(name).map(|m| Arc::clone(&m))
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    /// Visible mounts for file manager side bars
    pub fn list(&self) -> Vec<(String, String, MountFlags)> {
        let order = self.order.read();
        order
            .iter()
            .filter_map(|name| self.mounts.get(name))
            .map(|m| (m.name().to_string(), m.root().to_string(), m.flags()))
            .collect()
    }
}

impl Default for MountRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullTransport;

    impl Transport for NullTransport {
        fn request(&self, _op: Operation, _req: &Request) -> VfsResult<Response> {
            Ok(Response::Done)
        }

        fn name(&self) -> &str {
            "null"
        }
    }

    fn mount(name: &str, scheme: &str) -> Mount {
        Mount::new(name, scheme, MountFlags::default(), Arc::new(NullTransport))
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = MountRegistry::new();
        registry.register(mount("Home", "home")).unwrap();
        registry.register(mount("Shared", "shared")).unwrap();

        assert_eq!(registry.resolve("home://file.txt").unwrap().name(), "Home");
        assert_eq!(registry.resolve("shared://x").unwrap().name(), "Shared");
    }

    #[test]
    fn test_unmatched_path_is_routing_error() {
        let registry = MountRegistry::new();
        registry.register(mount("Home", "home")).unwrap();

        assert!(matches!(
            registry.resolve("ghost://file.txt"),
            Err(VfsError::Routing(path)) if path == "ghost://file.txt"
        ));
    }

    #[test]
    fn test_conflicting_scheme_rejected() {
        let registry = MountRegistry::new();
        registry.register(mount("Home", "home")).unwrap();

        let result = registry.register(mount("HomeTwo", "home"));
        assert!(matches!(result, Err(VfsError::AlreadyExists(_))));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = MountRegistry::new();
        registry.register(mount("Home", "home")).unwrap();

        let result = registry.register(mount("Home", "other"));
        assert!(matches!(result, Err(VfsError::AlreadyExists(_))));
    }

    #[test]
    fn test_pattern_matching() {
        let p = MountPattern::scheme("home");
        assert!(p.matches("home://a/b"));
        assert!(!p.matches("homely://a"));
        assert!(!p.matches("shared://home"));
    }
}
