/*!
 * Applications Mount
 * Synthetic read-only listing of installed packages
 */

use super::mount::Transport;
use super::types::*;
use ahash::RandomState;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Installed package description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub singleton: bool,
}

/// Registry of loaded package metadata
///
/// Populated from package manifests at startup; the applications mount
/// materializes its listings from here without any backend round trip.
pub struct PackageRegistry {
    packages: DashMap<String, PackageManifest, RandomState>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self {
            packages: DashMap::with_hasher(RandomState::new()),
        }
    }

    pub fn register(&self, manifest: PackageManifest) {
        self.packages.insert(manifest.name.clone(), manifest);
    }

    pub fn get(&self, name: &str) -> Option<PackageManifest> {
        self.packages.get(name).map(|p| p.clone())
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn all(&self) -> Vec<PackageManifest> {
        let mut list: Vec<PackageManifest> =
            self.packages.iter().map(|p| p.clone()).collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }
}

impl Default for PackageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Synthetic transport for `applications://`
///
/// Listings are computed in memory and returned within the same turn.
/// The mount is registered read-only; mutating operations are refused by
/// the dispatcher before ever reaching this transport, and refused here
/// again for defense when the transport is driven directly.
pub struct ApplicationsFs {
    scheme: String,
    registry: Arc<PackageRegistry>,
}

impl ApplicationsFs {
    pub fn new(scheme: impl Into<String>, registry: Arc<PackageRegistry>) -> Self {
        Self {
            scheme: scheme.into(),
            registry,
        }
    }

    fn entry(&self, manifest: &PackageManifest) -> VfsResult<FileEntry> {
        FileEntry::new(
            format!("{}://{}", self.scheme, manifest.name),
            manifest.name.clone(),
            FileKind::Application,
        )
        .map(|e| e.with_mime("application/x-package"))
    }

    fn scandir(&self) -> VfsResult<Response> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for manifest in self.registry.all() {
            let entry = self.entry(&manifest)?;
            // No two listing entries may share a path
            if seen.insert(entry.path.clone()) {
                entries.push(entry);
            }
        }
        Ok(Response::Entries(entries))
    }

    fn lookup(&self, rel: &str) -> VfsResult<PackageManifest> {
        let name = rel.trim_start_matches('/');
        self.registry
            .get(name)
            .ok_or_else(|| VfsError::NotFound(format!("{}://{}", self.scheme, name)))
    }
}

impl Transport for ApplicationsFs {
    fn request(&self, op: Operation, req: &Request) -> VfsResult<Response> {
        match op {
            Operation::Scandir => self.scandir(),
            Operation::Exists => Ok(Response::Flag(self.lookup(req.path.relative()).is_ok())),
            Operation::FileInfo => {
                let manifest = self.lookup(req.path.relative())?;
                Ok(Response::Info(self.entry(&manifest)?))
            }
            Operation::Read => {
                let manifest = self.lookup(req.path.relative())?;
                let data = serde_json::to_vec(&manifest)
                    .map_err(|e| VfsError::Backend(e.to_string()))?;
                Ok(Response::Data(data))
            }
            Operation::Url => Ok(Response::Url(req.path.to_string())),
            Operation::FreeSpace => Ok(Response::FreeSpace(0)),
            other => Err(VfsError::NotSupported(format!(
                "{} on synthetic applications mount",
                other.name()
            ))),
        }
    }

    fn name(&self) -> &str {
        "applications"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Arc<PackageRegistry> {
        let registry = PackageRegistry::new();
        registry.register(PackageManifest {
            name: "FileManager".to_string(),
            title: "File Manager".to_string(),
            icon: None,
            singleton: false,
        });
        registry.register(PackageManifest {
            name: "TextEditor".to_string(),
            title: "Text Editor".to_string(),
            icon: Some("editor.png".to_string()),
            singleton: false,
        });
        Arc::new(registry)
    }

    #[test]
    fn test_scandir_is_synchronous_and_unique() {
        let fs = ApplicationsFs::new("applications", registry());
        let req = Request::new("applications://".parse().unwrap());

        let Response::Entries(entries) = fs.request(Operation::Scandir, &req).unwrap() else {
            panic!("scandir must return entries");
        };
        assert_eq!(entries.len(), 2);

        let mut paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        paths.dedup();
        assert_eq!(paths.len(), 2, "no two entries may share a path");
        assert!(entries.iter().all(|e| e.kind == FileKind::Application));
    }

    #[test]
    fn test_read_returns_manifest() {
        let fs = ApplicationsFs::new("applications", registry());
        let req = Request::new("applications://TextEditor".parse().unwrap());

        let Response::Data(data) = fs.request(Operation::Read, &req).unwrap() else {
            panic!("read must return data");
        };
        let manifest: PackageManifest = serde_json::from_slice(&data).unwrap();
        assert_eq!(manifest.title, "Text Editor");
    }

    #[test]
    fn test_unknown_package() {
        let fs = ApplicationsFs::new("applications", registry());
        let req = Request::new("applications://Ghost".parse().unwrap());
        assert!(matches!(
            fs.request(Operation::FileInfo, &req),
            Err(VfsError::NotFound(_))
        ));
    }

    #[test]
    fn test_mutation_refused_by_transport() {
        let fs = ApplicationsFs::new("applications", registry());
        let req = Request::new("applications://New".parse().unwrap());
        assert!(matches!(
            fs.request(Operation::Write, &req),
            Err(VfsError::NotSupported(_))
        ));
    }
}
