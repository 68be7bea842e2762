//! Write operations of the file-access contract.

use crate::{FilePayload, FsError};

/// Write operations of a file service.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self` to allow
/// concurrent access.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FileWrite`.
pub trait FileWrite: Send + Sync {
    /// Overwrite `path` with `payload`, unconditionally.
    ///
    /// For a conflict-checked write use
    /// [`FileServiceExt::write_if_unchanged`](crate::FileServiceExt::write_if_unchanged).
    ///
    /// # Errors
    ///
    /// - [`FsError::PermissionDenied`] if write access is denied
    /// - [`FsError::Io`] or [`FsError::Reply`] on transport failure
    fn write_file(&self, path: &str, payload: &FilePayload) -> Result<(), FsError>;

    /// Remove `path`.
    ///
    /// Returns `Ok(false)` when there was nothing to remove or the host
    /// declined without an error.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotSupported`] if the host protocol cannot delete
    fn delete(&self, path: &str) -> Result<bool, FsError>;
}
