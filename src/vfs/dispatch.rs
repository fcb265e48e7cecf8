/*!
 * VFS Dispatcher
 * Mount resolution, capability gating and transport forwarding
 */

use super::mount::{Mount, MountRegistry};
use super::types::*;
use log::{debug, warn};
use std::sync::Arc;

/// Resolves paths to mounts and forwards operations
///
/// All failures come back as `Err`; nothing crosses this boundary as a
/// panic, so callers can uniformly branch on the result and surface
/// errors through dialogs.
pub struct Dispatcher {
    registry: Arc<MountRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<MountRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<MountRegistry> {
        &self.registry
    }

    /// Dispatch one operation
    ///
    /// Resolution order: claim check (routing), enablement, capability
    /// gating, then the transport. Copy/move whose destination lives on a
    /// different mount is bridged here with a read on the source and a
    /// write on the destination.
    pub fn dispatch(&self, op: Operation, req: &Request) -> VfsResult<Response> {
        let mount = self.resolve_checked(op, &req.path)?;

        if let Some(ref dest) = req.dest {
            if (op == Operation::Copy || op == Operation::Move)
                && dest.scheme() != req.path.scheme()
            {
                return self.cross_mount_transfer(op, req, dest, &mount);
            }
        }

        debug!(
            "vfs {} {} via mount '{}'",
            op.name(),
            req.path,
            mount.name()
        );
        mount.transport().request(op, req).map_err(|e| {
            warn!("mount '{}' failed {}: {}", mount.name(), op.name(), e);
            e
        })
    }

    /// Resolve and gate a mount for `op` without invoking its transport
    fn resolve_checked(&self, op: Operation, path: &VPath) -> VfsResult<Arc<Mount>> {
        let mount = self.registry.resolve(&path.to_string())?;

        if !mount.is_enabled() {
            return Err(VfsError::Unavailable(format!(
                "mount '{}' is disabled",
                mount.name()
            )));
        }
        if op.is_mutating() && mount.flags().read_only {
            return Err(VfsError::ReadOnly);
        }
        Ok(mount)
    }

    /// Bridge copy/move across mounts: read source, write destination
    fn cross_mount_transfer(
        &self,
        op: Operation,
        req: &Request,
        dest: &VPath,
        src_mount: &Arc<Mount>,
    ) -> VfsResult<Response> {
        let dest_mount = self.resolve_checked(Operation::Write, dest)?;

        let data = match src_mount.transport().request(Operation::Read, req)? {
            Response::Data(data) => data,
            other => {
                return Err(VfsError::Backend(format!(
                    "source mount returned {other:?} for read"
                )))
            }
        };

        let write_req = Request::new(dest.clone())
            .with_data(data)
            .with_options(req.options.clone());
        dest_mount.transport().request(Operation::Write, &write_req)?;

        if op == Operation::Move {
            src_mount.transport().request(Operation::Unlink, req)?;
        }
        Ok(Response::Done)
    }
}
