/*!
 * VFS File Entries
 * Listing and metadata records returned by mounts
 */

use super::errors::VfsError;
use serde::{Deserialize, Serialize};

/// Entry kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    #[default]
    File,
    Directory,
    Application,
}

/// Directory listing / file info record
///
/// `path` is the full virtual path (`scheme://...`); `filename` is the last
/// component shown in icon views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub filename: String,
    pub kind: FileKind,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
}

impl FileEntry {
    /// Create a validated entry
    pub fn new(
        path: impl Into<String>,
        filename: impl Into<String>,
        kind: FileKind,
    ) -> Result<Self, VfsError> {
        let filename = filename.into();
        if filename.is_empty() {
            return Err(VfsError::InvalidPath("entry filename cannot be empty".into()));
        }
        if filename.contains('/') || filename.contains('\0') {
            return Err(VfsError::InvalidPath(format!(
                "entry filename contains illegal characters: {filename:?}"
            )));
        }
        Ok(Self {
            path: path.into(),
            filename,
            kind,
            size: 0,
            mime: None,
        })
    }

    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_validation() {
        assert!(FileEntry::new("home://a.txt", "a.txt", FileKind::File).is_ok());
        assert!(FileEntry::new("home://", "", FileKind::File).is_err());
        assert!(FileEntry::new("home://a/b", "a/b", FileKind::File).is_err());
    }

    #[test]
    fn test_entry_builders() {
        let entry = FileEntry::new("home://a.txt", "a.txt", FileKind::File)
            .unwrap()
            .with_size(12)
            .with_mime("text/plain");
        assert_eq!(entry.size, 12);
        assert_eq!(entry.mime.as_deref(), Some("text/plain"));
    }
}
