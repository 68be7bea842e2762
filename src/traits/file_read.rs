//! Read operations of the file-access contract.

use crate::{FilePayload, FsError};

/// Read operations of a file service.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self` to allow
/// concurrent access from independent callers (several open editors, say).
/// Calls on the same path are not serialized by the contract.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FileRead`.
pub trait FileRead: Send + Sync {
    /// Read the whole content at `path`.
    ///
    /// For record-structured hosts the payload hash covers the stored bytes
    /// with trailing padding removed, before any marker transcoding.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::PermissionDenied`] if read access is denied
    /// - [`FsError::Io`] or [`FsError::Reply`] on transport failure
    fn read_file(&self, path: &str) -> Result<FilePayload, FsError>;
}
