/*!
 * VFS Request Vocabulary
 * Operations, request arguments and transport responses
 */

use super::entry::FileEntry;
use super::errors::VfsError;
use super::path::VPath;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// The fixed operation vocabulary every mount understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Scandir,
    Read,
    Write,
    Copy,
    Move,
    Unlink,
    Mkdir,
    Exists,
    FileInfo,
    Trash,
    Untrash,
    EmptyTrash,
    FreeSpace,
    Url,
}

impl Operation {
    /// Operations refused on read-only mounts
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            Self::Write
                | Self::Copy
                | Self::Move
                | Self::Unlink
                | Self::Mkdir
                | Self::Trash
                | Self::Untrash
                | Self::EmptyTrash
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Scandir => "scandir",
            Self::Read => "read",
            Self::Write => "write",
            Self::Copy => "copy",
            Self::Move => "move",
            Self::Unlink => "unlink",
            Self::Mkdir => "mkdir",
            Self::Exists => "exists",
            Self::FileInfo => "fileinfo",
            Self::Trash => "trash",
            Self::Untrash => "untrash",
            Self::EmptyTrash => "emptyTrash",
            Self::FreeSpace => "freeSpace",
            Self::Url => "url",
        }
    }
}

impl FromStr for Operation {
    type Err = VfsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scandir" => Ok(Self::Scandir),
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "copy" => Ok(Self::Copy),
            "move" | "rename" => Ok(Self::Move),
            "unlink" | "delete" => Ok(Self::Unlink),
            "mkdir" => Ok(Self::Mkdir),
            "exists" => Ok(Self::Exists),
            "fileinfo" => Ok(Self::FileInfo),
            "trash" => Ok(Self::Trash),
            "untrash" => Ok(Self::Untrash),
            "emptyTrash" => Ok(Self::EmptyTrash),
            "freeSpace" => Ok(Self::FreeSpace),
            "url" => Ok(Self::Url),
            other => Err(VfsError::NotSupported(other.to_string())),
        }
    }
}

/// Arguments carried by one dispatch
#[derive(Debug, Clone)]
pub struct Request {
    pub path: VPath,
    /// Destination for copy/move; may live on a different mount
    pub dest: Option<VPath>,
    /// Payload for write
    pub data: Option<Vec<u8>>,
    pub options: RequestOptions,
}

impl Request {
    pub fn new(path: VPath) -> Self {
        Self {
            path,
            dest: None,
            data: None,
            options: RequestOptions::default(),
        }
    }

    #[must_use]
    pub fn with_dest(mut self, dest: VPath) -> Self {
        self.dest = Some(dest);
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// Per-request options passed through to the transport
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Transport timeout; `None` means the transport's own default
    pub timeout: Option<Duration>,
    /// Allow write/copy/move over an existing target
    pub overwrite: bool,
}

/// Transport responses, one variant per result shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Response {
    Entries(Vec<FileEntry>),
    Data(Vec<u8>),
    Info(FileEntry),
    Flag(bool),
    FreeSpace(u64),
    Url(String),
    Done,
}
