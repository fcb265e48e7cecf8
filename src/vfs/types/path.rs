/*!
 * Virtual Paths
 * Scheme-prefixed path strings routed by the mount registry
 */

use super::errors::VfsError;
use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A virtual path: `scheme://relative/path`
///
/// The scheme selects the owning mount; the relative part is normalized
/// (no `..` escapes, single separators) before a transport ever sees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VPath {
    scheme: String,
    path: String,
}

impl VPath {
    pub fn new(scheme: &str, path: &str) -> Result<Self, VfsError> {
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(VfsError::InvalidPath(format!("bad scheme: {scheme:?}")));
        }
        Ok(Self {
            scheme: scheme.to_string(),
            path: normalize(path),
        })
    }

    /// The URI scheme, e.g. `home` for `home://docs/a.txt`
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Normalized relative part, always starting with `/`
    pub fn relative(&self) -> &str {
        &self.path
    }

    /// Last path component, empty for the root
    pub fn filename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("")
    }

    /// Parent path within the same mount, if any
    pub fn parent(&self) -> Option<VPath> {
        if self.path == "/" {
            return None;
        }
        let parent = match self.path.rfind('/') {
            Some(0) => "/".to_string(),
            Some(idx) => self.path[..idx].to_string(),
            None => return None,
        };
        Some(Self {
            scheme: self.scheme.clone(),
            path: parent,
        })
    }

    /// Child path within the same mount
    pub fn join(&self, name: &str) -> VPath {
        let joined = if self.path.ends_with('/') {
            format!("{}{}", self.path, name)
        } else {
            format!("{}/{}", self.path, name)
        };
        Self {
            scheme: self.scheme.clone(),
            path: normalize(&joined),
        }
    }
}

impl fmt::Display for VPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.path.trim_start_matches('/'))
    }
}

impl FromStr for VPath {
    type Err = VfsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scheme, rest) = s
            .split_once("://")
            .ok_or_else(|| VfsError::InvalidPath(s.to_string()))?;
        Self::new(scheme, rest)
    }
}

impl TryFrom<String> for VPath {
    type Error = VfsError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<VPath> for String {
    fn from(p: VPath) -> Self {
        p.to_string()
    }
}

/// Normalize a relative path: rooted, cleaned, forward slashes only
fn normalize(path: &str) -> String {
    let rooted = format!("/{}", path.trim_start_matches('/'));
    let cleaned: PathBuf = PathBuf::from(rooted).clean();
    let s = cleaned.to_string_lossy().replace('\\', "/");
    if s.is_empty() {
        "/".to_string()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let p: VPath = "home://docs/report.txt".parse().unwrap();
        assert_eq!(p.scheme(), "home");
        assert_eq!(p.relative(), "/docs/report.txt");
        assert_eq!(p.filename(), "report.txt");
        assert_eq!(p.to_string(), "home://docs/report.txt");
    }

    #[test]
    fn test_parse_rejects_missing_scheme() {
        assert!("no-scheme-here".parse::<VPath>().is_err());
    }

    #[test]
    fn test_normalization_blocks_escapes() {
        let p: VPath = "home://docs/../../etc/passwd".parse().unwrap();
        assert_eq!(p.relative(), "/etc/passwd");
    }

    #[test]
    fn test_parent_and_join() {
        let p: VPath = "home://docs/report.txt".parse().unwrap();
        let parent = p.parent().unwrap();
        assert_eq!(parent.relative(), "/docs");
        assert_eq!(parent.join("other.txt").relative(), "/docs/other.txt");

        let root: VPath = "home://".parse().unwrap();
        assert_eq!(root.relative(), "/");
        assert!(root.parent().is_none());
    }
}
