/*!
 * Virtual File System Module
 * Mount routing and request dispatch over pluggable storage backends
 */

pub mod apps;
pub mod dispatch;
pub mod mount;
pub mod store;
pub mod types;

// Re-exports
pub use apps::{ApplicationsFs, PackageManifest, PackageRegistry};
pub use dispatch::Dispatcher;
pub use mount::{Mount, MountFlags, MountPattern, MountRegistry, Transport};
pub use store::MemStore;
pub use types::{
    FileEntry, FileKind, Operation, Request, RequestOptions, Response, VPath, VfsError, VfsResult,
};
