/*!
 * In-Memory Store
 * Path-keyed tree store with trash semantics, backing the home mount
 */

use super::mount::Transport;
use super::types::*;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Node {
    File { data: Vec<u8> },
    Dir,
}

impl Node {
    fn size(&self) -> usize {
        match self {
            Node::File { data } => data.len(),
            Node::Dir => 0,
        }
    }
}

struct Inner {
    nodes: HashMap<String, Node>,
    // Trashed nodes keyed by their original path
    trash: HashMap<String, Node>,
    used: usize,
}

/// In-memory storage mount
///
/// Keys are normalized relative paths; the root directory is implicit.
/// Capacity accounting covers live file bytes, not trashed ones.
pub struct MemStore {
    scheme: String,
    capacity: Option<usize>,
    inner: RwLock<Inner>,
}

impl MemStore {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            capacity: None,
            inner: RwLock::new(Inner {
                nodes: HashMap::new(),
                trash: HashMap::new(),
                used: 0,
            }),
        }
    }

    /// Cap total live file bytes
    #[must_use]
    pub fn with_capacity(mut self, bytes: usize) -> Self {
        self.capacity = Some(bytes);
        self
    }

    fn full_path(&self, rel: &str) -> String {
        format!("{}://{}", self.scheme, rel.trim_start_matches('/'))
    }

    fn entry_for(&self, rel: &str, node: &Node) -> FileEntry {
        let filename = rel.rsplit('/').next().unwrap_or("").to_string();
        let kind = match node {
            Node::File { .. } => FileKind::File,
            Node::Dir => FileKind::Directory,
        };
        FileEntry {
            path: self.full_path(rel),
            filename,
            kind,
            size: node.size() as u64,
            mime: match node {
                Node::File { .. } => guess_mime(rel),
                Node::Dir => None,
            },
        }
    }

    fn check_capacity(&self, used: usize, grow: usize, shrink: usize) -> VfsResult<()> {
        if let Some(cap) = self.capacity {
            if used + grow > cap + shrink {
                return Err(VfsError::OutOfSpace);
            }
        }
        Ok(())
    }

    /// Insert missing parent directories for `rel`
    fn ensure_parents(nodes: &mut HashMap<String, Node>, rel: &str) {
        let mut idx = 0;
        while let Some(next) = rel[idx + 1..].find('/') {
            idx += 1 + next;
            let dir = &rel[..idx];
            nodes.entry(dir.to_string()).or_insert(Node::Dir);
        }
    }

    fn scandir(&self, rel: &str) -> VfsResult<Response> {
        let inner = self.inner.read();
        if rel != "/" {
            match inner.nodes.get(rel) {
                Some(Node::Dir) => {}
                Some(Node::File { .. }) => {
                    return Err(VfsError::NotADirectory(self.full_path(rel)))
                }
                None => return Err(VfsError::NotFound(self.full_path(rel))),
            }
        }

        let mut entries: Vec<FileEntry> = inner
            .nodes
            .iter()
            .filter(|(path, _)| parent_of(path) == rel)
            .map(|(path, node)| self.entry_for(path, node))
            .collect();
        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(Response::Entries(entries))
    }

    fn read(&self, rel: &str) -> VfsResult<Response> {
        let inner = self.inner.read();
        match inner.nodes.get(rel) {
            Some(Node::File { data }) => Ok(Response::Data(data.clone())),
            Some(Node::Dir) => Err(VfsError::IsADirectory(self.full_path(rel))),
            None => Err(VfsError::NotFound(self.full_path(rel))),
        }
    }

    fn write(&self, rel: &str, data: &[u8], overwrite: bool) -> VfsResult<Response> {
        if rel == "/" {
            return Err(VfsError::IsADirectory(self.full_path(rel)));
        }
        let mut inner = self.inner.write();
        let old = match inner.nodes.get(rel) {
            Some(Node::Dir) => return Err(VfsError::IsADirectory(self.full_path(rel))),
            Some(Node::File { data }) => {
                if !overwrite {
                    return Err(VfsError::AlreadyExists(self.full_path(rel)));
                }
                data.len()
            }
            None => 0,
        };
        self.check_capacity(inner.used, data.len(), old)?;

        Self::ensure_parents(&mut inner.nodes, rel);
        inner.nodes.insert(rel.to_string(), Node::File { data: data.to_vec() });
        inner.used = inner.used + data.len() - old;
        Ok(Response::Done)
    }

    fn mkdir(&self, rel: &str) -> VfsResult<Response> {
        let mut inner = self.inner.write();
        if rel == "/" || inner.nodes.contains_key(rel) {
            return Err(VfsError::AlreadyExists(self.full_path(rel)));
        }
        Self::ensure_parents(&mut inner.nodes, rel);
        inner.nodes.insert(rel.to_string(), Node::Dir);
        Ok(Response::Done)
    }

    fn unlink(&self, rel: &str) -> VfsResult<Response> {
        let mut inner = self.inner.write();
        match inner.nodes.remove(rel) {
            Some(Node::File { data }) => {
                inner.used -= data.len();
                Ok(Response::Done)
            }
            Some(Node::Dir) => {
                // Directories go away with their subtree
                let prefix = format!("{}/", rel);
                let doomed: Vec<String> = inner
                    .nodes
                    .keys()
                    .filter(|k| k.starts_with(&prefix))
                    .cloned()
                    .collect();
                for key in doomed {
                    if let Some(node) = inner.nodes.remove(&key) {
                        inner.used -= node.size();
                    }
                }
                Ok(Response::Done)
            }
            None => Err(VfsError::NotFound(self.full_path(rel))),
        }
    }

    fn copy(&self, src: &str, dst: &str, overwrite: bool) -> VfsResult<Response> {
        let data = match self.read(src)? {
            Response::Data(data) => data,
            _ => unreachable!("read returns Data"),
        };
        self.write(dst, &data, overwrite)
    }

    fn rename(&self, src: &str, dst: &str, overwrite: bool) -> VfsResult<Response> {
        if src == dst {
            return Ok(Response::Done);
        }
        let mut inner = self.inner.write();
        match inner.nodes.get(src) {
            Some(Node::File { .. }) => {}
            Some(Node::Dir) => return Err(VfsError::IsADirectory(self.full_path(src))),
            None => return Err(VfsError::NotFound(self.full_path(src))),
        }
        let replaced = match inner.nodes.get(dst) {
            Some(Node::Dir) => return Err(VfsError::IsADirectory(self.full_path(dst))),
            Some(Node::File { data }) => {
                if !overwrite {
                    return Err(VfsError::AlreadyExists(self.full_path(dst)));
                }
                data.len()
            }
            None => 0,
        };

        // The entry moves rather than being duplicated, so a move in a
        // full store never trips the capacity check; replacing a target
        // only frees bytes.
        if let Some(node) = inner.nodes.remove(src) {
            Self::ensure_parents(&mut inner.nodes, dst);
            inner.nodes.insert(dst.to_string(), node);
            inner.used -= replaced;
        }
        Ok(Response::Done)
    }

    fn trash(&self, rel: &str) -> VfsResult<Response> {
        let mut inner = self.inner.write();
        let node = inner
            .nodes
            .remove(rel)
            .ok_or_else(|| VfsError::NotFound(self.full_path(rel)))?;
        inner.used -= node.size();
        inner.trash.insert(rel.to_string(), node);
        Ok(Response::Done)
    }

    fn untrash(&self, rel: &str) -> VfsResult<Response> {
        let mut inner = self.inner.write();
        let node = inner
            .trash
            .remove(rel)
            .ok_or_else(|| VfsError::NotFound(self.full_path(rel)))?;
        self.check_capacity(inner.used, node.size(), 0)?;
        inner.used += node.size();
        Self::ensure_parents(&mut inner.nodes, rel);
        inner.nodes.insert(rel.to_string(), node);
        Ok(Response::Done)
    }

    fn empty_trash(&self) -> VfsResult<Response> {
        self.inner.write().trash.clear();
        Ok(Response::Done)
    }

    fn free_space(&self) -> VfsResult<Response> {
        let inner = self.inner.read();
        let free = match self.capacity {
            Some(cap) => cap.saturating_sub(inner.used) as u64,
            None => u64::MAX,
        };
        Ok(Response::FreeSpace(free))
    }

    fn fileinfo(&self, rel: &str) -> VfsResult<Response> {
        let inner = self.inner.read();
        if rel == "/" {
            return Ok(Response::Info(FileEntry {
                path: self.full_path("/"),
                filename: "/".to_string(),
                kind: FileKind::Directory,
                size: 0,
                mime: None,
            }));
        }
        inner
            .nodes
            .get(rel)
            .map(|node| Response::Info(self.entry_for(rel, node)))
            .ok_or_else(|| VfsError::NotFound(self.full_path(rel)))
    }
}

impl Transport for MemStore {
    fn request(&self, op: Operation, req: &Request) -> VfsResult<Response> {
        let rel = req.path.relative();
        match op {
            Operation::Scandir => self.scandir(rel),
            Operation::Read => self.read(rel),
            Operation::Write => {
                let data = req.data.as_deref().unwrap_or(&[]);
                // Plain writes replace by default; `overwrite=false` callers
                // opt into create-only semantics through copy/move.
                self.write(rel, data, true)
            }
            Operation::Copy | Operation::Move => {
                let dest = req
                    .dest
                    .as_ref()
                    .ok_or_else(|| VfsError::InvalidPath("missing destination".into()))?;
                if dest.scheme() != req.path.scheme() {
                    return Err(VfsError::NotSupported(
                        "cross-mount transfer handled by the dispatcher".into(),
                    ));
                }
                if op == Operation::Copy {
                    self.copy(rel, dest.relative(), req.options.overwrite)
                } else {
                    self.rename(rel, dest.relative(), req.options.overwrite)
                }
            }
            Operation::Unlink => self.unlink(rel),
            Operation::Mkdir => self.mkdir(rel),
            Operation::Exists => {
                let exists = rel == "/" || self.inner.read().nodes.contains_key(rel);
                Ok(Response::Flag(exists))
            }
            Operation::FileInfo => self.fileinfo(rel),
            Operation::Trash => self.trash(rel),
            Operation::Untrash => self.untrash(rel),
            Operation::EmptyTrash => self.empty_trash(),
            Operation::FreeSpace => self.free_space(),
            Operation::Url => Ok(Response::Url(req.path.to_string())),
        }
    }

    fn name(&self) -> &str {
        "memstore"
    }
}

/// Parent key of a normalized relative path
fn parent_of(rel: &str) -> &str {
    match rel.rfind('/') {
        Some(0) => "/",
        Some(idx) => &rel[..idx],
        None => "/",
    }
}

/// Minimal extension-based MIME lookup for listings
fn guess_mime(rel: &str) -> Option<String> {
    let ext = rel.rsplit('.').next()?;
    let mime = match ext {
        "txt" | "md" | "log" => "text/plain",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(mime.to_string())
}
