/*!
 * VFS Types
 * Shared types for mounts, dispatch and transports
 */

pub mod entry;
pub mod errors;
pub mod path;
pub mod request;

// Re-exports
pub use entry::{FileEntry, FileKind};
pub use errors::{VfsError, VfsResult};
pub use path::VPath;
pub use request::{Operation, Request, RequestOptions, Response};
