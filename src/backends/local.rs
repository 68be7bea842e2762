//! Local filesystem backend.
//!
//! Serves the same [`FileService`](crate::FileService) contract as the remote
//! backend over `std::fs`, so editors can treat local and remote files alike.
//! Optionally rooted at a base directory; rooted services refuse paths that
//! climb out with `..` or through a symlink.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    Charset, FileDir, FileNode, FilePayload, FileRead, FileSession, FileWrite, FsError, NodeKind,
};

/// How far into a file to look for NUL bytes when guessing binary content.
const BINARY_SNIFF_LEN: usize = 8 * 1024;

/// File service over the local filesystem.
///
/// # Example
///
/// ```rust
/// use mvsfs::{FileRead, FileWrite, FilePayload, Charset, LocalFileService};
///
/// let dir = std::env::temp_dir().join("mvsfs-doc-local");
/// std::fs::create_dir_all(&dir).unwrap();
/// let service = LocalFileService::rooted(&dir);
///
/// service.write_file("note.txt", &FilePayload::from_text("hi", Charset::Utf8)).unwrap();
/// assert_eq!(service.read_file("note.txt").unwrap().editor_text(), "hi");
/// ```
#[derive(Debug)]
pub struct LocalFileService {
    root: Option<PathBuf>,
    charset: Charset,
    closed: AtomicBool,
}

impl LocalFileService {
    /// Service addressing paths as given, UTF-8 text.
    pub fn new() -> Self {
        Self {
            root: None,
            charset: Charset::Utf8,
            closed: AtomicBool::new(false),
        }
    }

    /// Service resolving every path below `root`.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        let root: PathBuf = root.into();
        let root = root.canonicalize().unwrap_or(root);
        Self {
            root: Some(root),
            ..Self::new()
        }
    }

    /// Charset used to decode text files.
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Base directory, if rooted.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn resolve(&self, path: &str, operation: &'static str) -> Result<PathBuf, FsError> {
        if self.is_closed() {
            return Err(FsError::Closed);
        }
        let Some(root) = &self.root else {
            return Ok(PathBuf::from(path));
        };

        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(FsError::PermissionDenied {
                path: path.to_string(),
                operation,
            });
        }

        let full = root.join(relative);
        let canonical = canonical(&full, path, operation)?;
        if !canonical.starts_with(root) {
            tracing::warn!(path, target = %canonical.display(), "path escapes root");
            return Err(FsError::PermissionDenied {
                path: path.to_string(),
                operation,
            });
        }
        Ok(full)
    }
}

impl Default for LocalFileService {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve symlinks in `full`. The part that does not exist yet is
/// appended to its nearest existing ancestor.
fn canonical(full: &Path, path: &str, operation: &'static str) -> Result<PathBuf, FsError> {
    let mut existing = full;
    let mut missing = Vec::new();
    // symlink_metadata so a dangling link counts as existing
    while fs::symlink_metadata(existing).is_err() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => return Ok(full.to_path_buf()),
        }
    }
    let mut canonical = existing
        .canonicalize()
        .map_err(|e| FsError::from_io(e, operation, path))?;
    canonical.extend(missing.iter().rev());
    Ok(canonical)
}

fn looks_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(BINARY_SNIFF_LEN).any(|&b| b == 0)
}

impl FileRead for LocalFileService {
    fn read_file(&self, path: &str) -> Result<FilePayload, FsError> {
        let full = self.resolve(path, "read")?;
        let bytes = fs::read(&full).map_err(|e| FsError::from_io(e, "read", path))?;
        tracing::debug!(path, bytes = bytes.len(), "local read");
        if looks_binary(&bytes) {
            Ok(FilePayload::binary(bytes))
        } else {
            Ok(FilePayload::new(bytes, self.charset))
        }
    }
}

impl FileWrite for LocalFileService {
    fn write_file(&self, path: &str, payload: &FilePayload) -> Result<(), FsError> {
        let full = self.resolve(path, "write")?;
        tracing::debug!(path, bytes = payload.len(), "local write");
        fs::write(&full, payload.bytes()).map_err(|e| FsError::from_io(e, "write", path))
    }

    fn delete(&self, path: &str) -> Result<bool, FsError> {
        let full = self.resolve(path, "delete")?;
        let meta = match fs::symlink_metadata(&full) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(FsError::from_io(e, "delete", path)),
        };
        let removed = if meta.is_dir() {
            fs::remove_dir(&full)
        } else {
            fs::remove_file(&full)
        };
        removed.map_err(|e| FsError::from_io(e, "delete", path))?;
        tracing::debug!(path, "local delete");
        Ok(true)
    }
}

impl FileDir for LocalFileService {
    fn list(&self, path: &str) -> Result<Vec<FileNode>, FsError> {
        let full = self.resolve(path, "list")?;
        let meta = fs::metadata(&full).map_err(|e| FsError::from_io(e, "list", path))?;
        if !meta.is_dir() {
            return Err(FsError::NotADirectory {
                path: path.to_string(),
            });
        }

        let mut nodes = Vec::new();
        for entry in fs::read_dir(&full).map_err(|e| FsError::from_io(e, "list", path))? {
            let entry = entry.map_err(|e| FsError::from_io(e, "list", path))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let meta = entry
                .metadata()
                .map_err(|e| FsError::from_io(e, "list", path))?;
            let kind = if meta.is_dir() {
                NodeKind::Directory
            } else {
                NodeKind::File
            };
            let child = Path::new(path).join(&name).to_string_lossy().into_owned();
            let mut node = FileNode::new(name, child, kind);
            if kind == NodeKind::File {
                node.size = Some(meta.len());
            }
            node.modified = meta.modified().ok();
            nodes.push(node);
        }
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::debug!(path, entries = nodes.len(), "local list");
        Ok(nodes)
    }

    fn create_directory(&self, path: &str) -> Result<bool, FsError> {
        let full = self.resolve(path, "create_directory")?;
        if full.is_dir() {
            return Ok(false);
        }
        fs::create_dir_all(&full).map_err(|e| FsError::from_io(e, "create_directory", path))?;
        Ok(true)
    }
}

impl FileSession for LocalFileService {
    fn close(&self) -> Result<(), FsError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("local file service closed");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
