//! # Transport Trait
//!
//! The byte-moving collaborator underneath a remote file service.
//!
//! A transport knows how to fetch and store raw bytes at a host path and how
//! to run a listing query. It knows nothing about quoting rules, record
//! markers or hashes; [`RemoteFileService`](crate::RemoteFileService) adds
//! those on top.
//!
//! Retries and timeouts belong here too: see [`RetryLayer`](crate::RetryLayer).

use std::sync::Arc;
use std::time::SystemTime;

use crate::{Credentials, FsError};

/// Type hint carried by a listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryKind {
    /// Readable content.
    File,
    /// Listable container.
    Directory,
}

/// One raw entry of a listing answer.
///
/// `name` is whatever the host returned: a bare name, a fully qualified
/// dataset name or a whole `LIST` line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemoteEntry {
    /// Name as returned by the host.
    pub name: String,
    /// Entry type, if the host said.
    pub kind: Option<EntryKind>,
    /// Size in bytes, if the host said.
    pub size: Option<u64>,
    /// Last modification time, if the host said.
    #[cfg_attr(feature = "serde", serde(with = "crate::types::optional_system_time_serde"))]
    pub modified: Option<SystemTime>,
}

impl RemoteEntry {
    /// Entry with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            size: None,
            modified: None,
        }
    }

    /// Set the type hint.
    pub fn with_kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the size.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the modification time.
    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }
}

/// Raw byte transport to a host.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; methods take `&self`. Transports
/// with a single control connection serialize calls internally.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn Transport`.
///
/// # Optional operations
///
/// `delete` and `make_directory` default to [`FsError::NotSupported`]: many
/// hosts cannot express them. `login` defaults to accepting anything and
/// `system_type` to unknown.
pub trait Transport: Send + Sync {
    /// Fetch the bytes stored at `path`.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if nothing is stored at `path`
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, FsError>;

    /// Store `data` at `path`, replacing what was there.
    fn write_bytes(&self, path: &str, data: &[u8]) -> Result<(), FsError>;

    /// Run a listing query. An empty answer is not an error.
    fn list(&self, query: &str) -> Result<Vec<RemoteEntry>, FsError>;

    /// Remove `path`. `Ok(false)` means the host refused without an error.
    fn delete(&self, path: &str) -> Result<bool, FsError> {
        let _ = path;
        Err(FsError::NotSupported {
            operation: "delete",
        })
    }

    /// Create a container at `path`.
    fn make_directory(&self, path: &str) -> Result<bool, FsError> {
        let _ = path;
        Err(FsError::NotSupported {
            operation: "create_directory",
        })
    }

    /// Authenticate the session.
    ///
    /// # Errors
    ///
    /// - [`FsError::AuthFailed`] if the host rejects the credentials
    fn login(&self, credentials: &Credentials) -> Result<(), FsError> {
        let _ = credentials;
        Ok(())
    }

    /// Host system type as reported by the server (an FTP `SYST` answer such
    /// as `MVS is the operating system of this server`).
    fn system_type(&self) -> Option<String> {
        None
    }

    /// End the session. Must tolerate being called more than once.
    fn disconnect(&self) -> Result<(), FsError> {
        Ok(())
    }
}

macro_rules! forward_transport {
    ($($ptr:ty),*) => {$(
        impl<T: Transport + ?Sized> Transport for $ptr {
            fn read_bytes(&self, path: &str) -> Result<Vec<u8>, FsError> {
                (**self).read_bytes(path)
            }
            fn write_bytes(&self, path: &str, data: &[u8]) -> Result<(), FsError> {
                (**self).write_bytes(path, data)
            }
            fn list(&self, query: &str) -> Result<Vec<RemoteEntry>, FsError> {
                (**self).list(query)
            }
            fn delete(&self, path: &str) -> Result<bool, FsError> {
                (**self).delete(path)
            }
            fn make_directory(&self, path: &str) -> Result<bool, FsError> {
                (**self).make_directory(path)
            }
            fn login(&self, credentials: &Credentials) -> Result<(), FsError> {
                (**self).login(credentials)
            }
            fn system_type(&self) -> Option<String> {
                (**self).system_type()
            }
            fn disconnect(&self) -> Result<(), FsError> {
                (**self).disconnect()
            }
        }
    )*};
}

forward_transport!(Box<T>, Arc<T>);
