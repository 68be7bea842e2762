//! Listing and container operations of the file-access contract.

use crate::{FileNode, FsError};

/// Listing and container operations of a file service.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FileDir`.
pub trait FileDir: Send + Sync {
    /// Children of `path`.
    ///
    /// Entries are produced fresh per call; nothing is cached.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::NotADirectory`] if the path cannot have children
    /// - [`FsError::PermissionDenied`] if listing is denied
    fn list(&self, path: &str) -> Result<Vec<FileNode>, FsError>;

    /// Create a container at `path`.
    ///
    /// Returns `Ok(false)` if the host declined without an error.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotSupported`] if the host protocol cannot create one
    fn create_directory(&self, path: &str) -> Result<bool, FsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_dir_is_object_safe() {
        fn _check(_: &dyn FileDir) {}
    }
}
