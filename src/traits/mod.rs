//! # File Service Traits
//!
//! The trait hierarchy of the file-access contract.
//!
//! ```text
//! FileRead + FileWrite + FileDir + FileSession = FileService
//!                                                    ↓
//!                                  FileServiceExt (write_if_unchanged, ...)
//! ```
//!
//! ## Quick Reference
//!
//! | Trait | Operations |
//! |-------|------------|
//! | [`FileRead`] | `read_file` |
//! | [`FileWrite`] | `write_file`, `delete` |
//! | [`FileDir`] | `list`, `create_directory` |
//! | [`FileSession`] | `close`, `is_closed` |
//!
//! ## Blanket Implementation
//!
//! Implement the four component traits and [`FileService`] comes for free:
//!
//! ```rust
//! use mvsfs::{FileDir, FileNode, FilePayload, FileRead, FileService, FileSession, FileWrite, FsError};
//!
//! struct Empty;
//!
//! # impl FileRead for Empty {
//! #     fn read_file(&self, path: &str) -> Result<FilePayload, FsError> { Err(FsError::NotFound { path: path.into() }) }
//! # }
//! # impl FileWrite for Empty {
//! #     fn write_file(&self, _: &str, _: &FilePayload) -> Result<(), FsError> { Ok(()) }
//! #     fn delete(&self, _: &str) -> Result<bool, FsError> { Ok(false) }
//! # }
//! # impl FileDir for Empty {
//! #     fn list(&self, _: &str) -> Result<Vec<FileNode>, FsError> { Ok(vec![]) }
//! #     fn create_directory(&self, _: &str) -> Result<bool, FsError> { Ok(false) }
//! # }
//! # impl FileSession for Empty {
//! #     fn close(&self) -> Result<(), FsError> { Ok(()) }
//! #     fn is_closed(&self) -> bool { false }
//! # }
//! fn use_service(_: &dyn FileService) {}
//! use_service(&Empty);
//! ```
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` and take `&self`. Backends use interior
//! mutability for their state.

mod file_dir;
mod file_read;
mod file_session;
mod file_write;

pub use file_dir::FileDir;
pub use file_read::FileRead;
pub use file_session::FileSession;
pub use file_write::FileWrite;

/// A complete file service: read, write, list, and lifecycle.
///
/// Backends: [`LocalFileService`](crate::LocalFileService) for the local
/// filesystem and [`RemoteFileService`](crate::RemoteFileService) over any
/// [`Transport`](crate::Transport).
///
/// # Blanket Implementation
///
/// Automatically implemented for any type that implements all four component
/// traits. You never implement `FileService` directly.
///
/// # Example
///
/// ```rust
/// use mvsfs::{FileService, FsError};
///
/// fn copy_file(from: &dyn FileService, to: &dyn FileService, path: &str) -> Result<(), FsError> {
///     let payload = from.read_file(path)?;
///     to.write_file(path, &payload)
/// }
/// ```
pub trait FileService: FileRead + FileWrite + FileDir + FileSession {}

// Blanket implementation - any type implementing all four gets FileService for free
impl<T: FileRead + FileWrite + FileDir + FileSession> FileService for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_service_is_object_safe() {
        fn _check(_: &dyn FileService) {}
    }

    #[test]
    fn file_service_requires_send_sync() {
        fn _assert_send_sync<T: Send + Sync>() {}
        fn _check<T: FileService>() {
            _assert_send_sync::<T>();
        }
    }
}
