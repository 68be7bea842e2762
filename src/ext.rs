//! # Extension Traits
//!
//! Convenience operations built on top of [`FileService`].
//!
//! [`FileServiceExt`] provides the optimistic-concurrency write and a few
//! helpers as default methods with a blanket implementation, so every
//! service (including `dyn FileService`) gets them.
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`write_if_unchanged`](FileServiceExt::write_if_unchanged) | Write only if the remote still has the expected hash |
//! | [`read_text`](FileServiceExt::read_text) | Read and decode for an editor |

use crate::{FilePayload, FileService, FileWriteResult, FsError};

/// Extension methods for any file service.
///
/// # Example
///
/// ```rust
/// use mvsfs::*;
///
/// /// Save `text`, or hand back what is stored now if someone saved first.
/// fn save(
///     service: &dyn FileService,
///     path: &str,
///     loaded: &FilePayload,
///     text: &str,
/// ) -> Result<Option<String>, FsError> {
///     let edited = FilePayload::from_text(text, loaded.charset());
///     match service.write_if_unchanged(path, &edited, loaded.hash().as_str())? {
///         FileWriteResult::Success => Ok(None),
///         FileWriteResult::Conflict(current) => Ok(Some(current.editor_text().into_owned())),
///     }
/// }
///
/// let host = MemoryHost::new().with_dataset("USERID.NOTES", b"v1".to_vec());
/// let connection = ConnectionId::new("ftp", "zos", Some("USERID".into()));
/// let provider = StaticCredentials::new().with(Credentials::new("zos", "USERID", "pw"));
/// let service = RemoteFileService::connect(host, &connection, &provider)?;
///
/// let loaded = service.read_file("USERID.NOTES")?;
/// service.write_file("USERID.NOTES", &service.payload_from_editor_text("v2"))?;
///
/// let current = save(&service, "USERID.NOTES", &loaded, "v3")?;
/// assert_eq!(current.as_deref(), Some("v2"));
/// # Ok::<(), FsError>(())
/// ```
pub trait FileServiceExt: FileService {
    /// Write `payload` only if the content at `path` still hashes to
    /// `expected_hash`.
    ///
    /// - Hash matches: the payload is written, [`FileWriteResult::Success`].
    /// - Hash differs: nothing is written, [`FileWriteResult::Conflict`]
    ///   carries the current remote content.
    /// - The current content cannot be read (typically it does not exist
    ///   yet): no conflict is possible and the payload is written. This is
    ///   how new files are created through the same call.
    /// - `expected_hash` is empty: written unconditionally.
    ///
    /// This is check-then-act, not compare-and-swap. Another writer can land
    /// between the read and the write; the window is narrowed, not closed.
    ///
    /// # Errors
    ///
    /// - [`FsError::Closed`] if the service was closed
    /// - any error of the final [`write_file`](crate::FileWrite::write_file)
    fn write_if_unchanged(
        &self,
        path: &str,
        payload: &FilePayload,
        expected_hash: &str,
    ) -> Result<FileWriteResult, FsError> {
        if self.is_closed() {
            return Err(FsError::Closed);
        }
        if expected_hash.trim().is_empty() {
            self.write_file(path, payload)?;
            return Ok(FileWriteResult::Success);
        }

        match self.read_file(path) {
            Ok(current) if !current.hash().matches(expected_hash) => {
                tracing::warn!(
                    path,
                    expected = expected_hash,
                    current = %current.hash(),
                    "remote content changed, write refused"
                );
                return Ok(FileWriteResult::Conflict(current));
            }
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(path, error = %err, "current content unreadable, writing without check");
            }
        }

        self.write_file(path, payload)?;
        Ok(FileWriteResult::Success)
    }

    /// Read `path` and return the text an editor should show.
    fn read_text(&self, path: &str) -> Result<String, FsError> {
        Ok(self.read_file(path)?.editor_text().into_owned())
    }
}

// Blanket implementation
impl<S: FileService + ?Sized> FileServiceExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Charset, FileDir, FileNode, FileRead, FileSession, FileWrite};
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Map-backed service counting writes.
    #[derive(Default)]
    struct MockService {
        files: Mutex<HashMap<String, Vec<u8>>>,
        writes: AtomicUsize,
        closed: AtomicBool,
        fail_reads: bool,
    }

    impl MockService {
        fn with(path: &str, content: &[u8]) -> Self {
            let service = Self::default();
            service.files.lock().insert(path.into(), content.to_vec());
            service
        }
    }

    impl FileRead for MockService {
        fn read_file(&self, path: &str) -> Result<FilePayload, FsError> {
            if self.fail_reads {
                return Err(FsError::Backend("read failed".into()));
            }
            self.files
                .lock()
                .get(path)
                .map(|b| FilePayload::new(b.clone(), Charset::Latin1))
                .ok_or_else(|| FsError::NotFound { path: path.into() })
        }
    }

    impl FileWrite for MockService {
        fn write_file(&self, path: &str, payload: &FilePayload) -> Result<(), FsError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.files.lock().insert(path.into(), payload.bytes().to_vec());
            Ok(())
        }
        fn delete(&self, path: &str) -> Result<bool, FsError> {
            Ok(self.files.lock().remove(path).is_some())
        }
    }

    impl FileDir for MockService {
        fn list(&self, _: &str) -> Result<Vec<FileNode>, FsError> {
            Ok(vec![])
        }
        fn create_directory(&self, _: &str) -> Result<bool, FsError> {
            Ok(true)
        }
    }

    impl FileSession for MockService {
        fn close(&self) -> Result<(), FsError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
        fn is_closed(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }
    }

    fn text(s: &str) -> FilePayload {
        FilePayload::from_text(s, Charset::Latin1)
    }

    #[test]
    fn matching_hash_writes() {
        let service = MockService::with("a", b"old");
        let expected = text("old").hash().to_string();
        let result = service.write_if_unchanged("a", &text("new"), &expected).unwrap();
        assert!(result.is_success());
        assert_eq!(service.writes.load(Ordering::SeqCst), 1);
        assert_eq!(service.read_text("a").unwrap(), "new");
    }

    #[test]
    fn stale_hash_conflicts_without_writing() {
        let service = MockService::with("a", b"theirs");
        let stale = text("mine-before").hash().to_string();
        let result = service.write_if_unchanged("a", &text("mine"), &stale).unwrap();
        let current = result.conflict().unwrap();
        assert_eq!(current.bytes(), b"theirs");
        assert_eq!(service.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_file_is_created() {
        let service = MockService::default();
        let result = service
            .write_if_unchanged("new", &text("x"), "deadbeef")
            .unwrap();
        assert!(result.is_success());
        assert_eq!(service.writes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_read_proceeds_to_write() {
        let service = MockService {
            fail_reads: true,
            ..MockService::default()
        };
        let result = service.write_if_unchanged("a", &text("x"), "abc").unwrap();
        assert!(result.is_success());
    }

    #[test]
    fn empty_hash_writes_unconditionally() {
        let service = MockService::with("a", b"theirs");
        assert!(service.write_if_unchanged("a", &text("x"), "").unwrap().is_success());
        assert_eq!(service.writes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn closed_service_refuses() {
        let service = MockService::with("a", b"x");
        service.close().unwrap();
        let err = service.write_if_unchanged("a", &text("y"), "").unwrap_err();
        assert!(matches!(err, FsError::Closed));
        assert_eq!(service.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn ext_available_on_dyn_service() {
        let service = MockService::with("a", b"hello");
        let dyn_service: &dyn FileService = &service;
        assert_eq!(dyn_service.read_text("a").unwrap(), "hello");
    }
}
