//! # Remote File Service
//!
//! [`FileService`](crate::FileService) over any [`Transport`].
//!
//! ## Responsibility
//! - Resolve credentials and log in at connect time
//! - Detect the host flavor (MVS or Unix) unless forced
//! - Resolve every path through the dataset grammar on MVS hosts
//! - Trim padding and decode record markers on read, encode them on write
//! - Collapse wildcard listings into the next navigation level
//!
//! ## Usage
//!
//! ```rust
//! use mvsfs::{
//!     ConnectionId, Credentials, FileDir, FileRead, MemoryHost, RemoteFileService,
//!     StaticCredentials,
//! };
//!
//! let host = MemoryHost::new()
//!     .with_login("USERID", "secret")
//!     .with_dataset("USERID.DATA", b"A\xff\x01B\xff\x01\xff\x02".to_vec());
//! let connection = ConnectionId::new("ftp", "zos.example.com", Some("USERID".into()));
//! let provider = StaticCredentials::new()
//!     .with(Credentials::new("zos.example.com", "USERID", "secret"));
//!
//! let service = RemoteFileService::connect(host, &connection, &provider).unwrap();
//! assert_eq!(service.read_file("USERID.DATA").unwrap().editor_text(), "A\nB");
//! assert_eq!(service.list("USERID").unwrap()[0].path, "'USERID.DATA'");
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::codec::parse_padding;
use crate::listing::collapse_entries;
use crate::{
    Charset, ConnectionId, CredentialsProvider, EntryKind, FileDir, FileNode, FilePayload,
    FileRead, FileSession, FileWrite, FsError, Location, LocationKind, MvsDialect, NodeKind,
    PathDialect, RemoteEntry, RemoteMarkerConfig, Settings, Transport, UnixDialect,
    VirtualResource, decode_for_editor, encode_for_remote, trim_padding,
};

/// FTP reply code for a rejected login.
const LOGIN_REJECTED: u16 = 530;

// ============================================================================
// Host flavor
// ============================================================================

/// Naming scheme of the remote host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HostFlavor {
    /// Dataset names: grammar, padding and record markers apply.
    Mvs,
    /// Hierarchical paths: bytes pass through untouched.
    Unix,
}

impl HostFlavor {
    /// Flavor from a host's system type reply.
    ///
    /// ```rust
    /// use mvsfs::HostFlavor;
    ///
    /// assert_eq!(HostFlavor::detect(Some("215 MVS is the operating system")), HostFlavor::Mvs);
    /// assert_eq!(HostFlavor::detect(Some("215 UNIX Type: L8")), HostFlavor::Unix);
    /// assert_eq!(HostFlavor::detect(None), HostFlavor::Unix);
    /// ```
    pub fn detect(system_type: Option<&str>) -> Self {
        match system_type {
            Some(reply) if reply.to_ascii_uppercase().contains("MVS") => HostFlavor::Mvs,
            _ => HostFlavor::Unix,
        }
    }

    fn dialect(self) -> Box<dyn PathDialect> {
        match self {
            HostFlavor::Mvs => Box::new(MvsDialect),
            HostFlavor::Unix => Box::new(UnixDialect),
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Configures and connects a [`RemoteFileService`].
#[derive(Debug)]
pub struct RemoteServiceBuilder<T> {
    transport: T,
    settings: Settings,
    flavor: Option<HostFlavor>,
}

impl<T: Transport> RemoteServiceBuilder<T> {
    /// Use these settings instead of the defaults.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Skip detection and treat the host as `flavor`.
    pub fn flavor(mut self, flavor: HostFlavor) -> Self {
        self.flavor = Some(flavor);
        self
    }

    /// Resolve credentials, log in and build the service.
    ///
    /// # Errors
    ///
    /// - [`FsError::AuthFailed`] if `provider` has no credentials for
    ///   `connection` or the host rejects them
    /// - any other error the transport reports during login
    pub fn connect(
        self,
        connection: &ConnectionId,
        provider: &dyn CredentialsProvider,
    ) -> Result<RemoteFileService<T>, FsError> {
        let credentials = provider.resolve(connection).ok_or_else(|| FsError::AuthFailed {
            reason: format!("no credentials for {connection}"),
        })?;

        match self.transport.login(&credentials) {
            Ok(()) => {}
            Err(FsError::Reply { code, message }) if code == LOGIN_REJECTED => {
                return Err(FsError::AuthFailed { reason: message });
            }
            Err(err) => return Err(err),
        }

        let flavor = self
            .flavor
            .unwrap_or_else(|| HostFlavor::detect(self.transport.system_type().as_deref()));
        let is_mvs = flavor == HostFlavor::Mvs;
        let record_structure = self.settings.record_structure.unwrap_or(is_mvs);
        let markers = if record_structure {
            self.settings.marker_config()
        } else {
            None
        };
        let padding = if is_mvs {
            parse_padding(&self.settings.padding)
        } else {
            None
        };
        let charset = self.settings.charset();

        tracing::info!(
            connection = %connection,
            ?flavor,
            record_structure = markers.is_some(),
            %charset,
            "connected"
        );

        Ok(RemoteFileService {
            transport: self.transport,
            flavor,
            dialect: flavor.dialect(),
            charset,
            markers,
            padding,
            connection: connection.clone(),
            closed: AtomicBool::new(false),
        })
    }
}

// ============================================================================
// Service
// ============================================================================

/// File service backed by a remote host.
///
/// Paths are whatever the user typed; on MVS hosts they are normalized
/// (`USERID.DATA` and `'USERID.DATA'` are the same dataset) and `/` is read
/// as a qualifier separator. The hash of a read payload is taken over the
/// padding-trimmed bytes exactly as the host stores them, so it can be handed
/// straight to [`write_if_unchanged`](crate::FileServiceExt::write_if_unchanged).
pub struct RemoteFileService<T> {
    transport: T,
    flavor: HostFlavor,
    dialect: Box<dyn PathDialect>,
    charset: Charset,
    markers: Option<RemoteMarkerConfig>,
    padding: Option<u8>,
    connection: ConnectionId,
    closed: AtomicBool,
}

impl<T: Transport> RemoteFileService<T> {
    /// Start configuring a service over `transport`.
    pub fn builder(transport: T) -> RemoteServiceBuilder<T> {
        RemoteServiceBuilder {
            transport,
            settings: Settings::default(),
            flavor: None,
        }
    }

    /// Connect with default settings and flavor detection.
    pub fn connect(
        transport: T,
        connection: &ConnectionId,
        provider: &dyn CredentialsProvider,
    ) -> Result<Self, FsError> {
        Self::builder(transport).connect(connection, provider)
    }

    /// Flavor in effect.
    pub fn flavor(&self) -> HostFlavor {
        self.flavor
    }

    /// Charset of remote text.
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Record markers in effect, `None` when content passes through.
    pub fn marker_config(&self) -> Option<&RemoteMarkerConfig> {
        self.markers.as_ref()
    }

    /// Connection this service was opened for.
    pub fn connection(&self) -> &ConnectionId {
        &self.connection
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Payload to write for text edited in an editor.
    ///
    /// With record markers in effect the text is encoded into records, so the
    /// payload's hash matches what a later read of the same content yields.
    pub fn payload_from_editor_text(&self, text: &str) -> FilePayload {
        match &self.markers {
            Some(markers) => FilePayload::record_structured(
                encode_for_remote(text, self.charset, Some(markers)),
                self.charset,
                text.to_string(),
            ),
            None => FilePayload::from_text(text, self.charset),
        }
    }

    fn ensure_open(&self) -> Result<(), FsError> {
        if self.is_closed() {
            Err(FsError::Closed)
        } else {
            Ok(())
        }
    }

    /// Host path of a readable or writable entry. MVS hosts also get the
    /// parsed location so callers can reject the root.
    fn resolve(&self, path: &str) -> Result<(String, Option<Location>), FsError> {
        self.ensure_open()?;
        let absolute = self.dialect.to_absolute(path);
        match self.flavor {
            HostFlavor::Mvs => {
                let location = Location::parse(Some(&absolute))?;
                Ok((location.logical_path(), Some(location)))
            }
            HostFlavor::Unix => Ok((absolute, None)),
        }
    }

    fn payload_from_remote(&self, bytes: Vec<u8>) -> FilePayload {
        match &self.markers {
            Some(markers) => {
                let text = decode_for_editor(&bytes, self.charset, Some(markers));
                FilePayload::record_structured(bytes, self.charset, text)
            }
            None => FilePayload::new(bytes, self.charset),
        }
    }

    fn remote_bytes(&self, payload: &FilePayload) -> Vec<u8> {
        match &self.markers {
            Some(markers) if !payload.is_binary() && !payload.is_record_structured() => {
                encode_for_remote(&payload.editor_text(), self.charset, Some(markers))
            }
            _ => payload.bytes().to_vec(),
        }
    }

    /// List `query`, retrying once upper-cased when nothing comes back.
    ///
    /// Returns the entries and whether the upper-cased query produced them.
    fn list_candidates(&self, query: &str) -> Result<(Vec<RemoteEntry>, bool), FsError> {
        let upper = query.to_ascii_uppercase();
        let mut candidates = vec![(query, false)];
        if upper != query {
            candidates.push((upper.as_str(), true));
        }

        let mut last_not_found = None;
        for (candidate, upper_cased) in candidates {
            match self.transport.list(candidate) {
                Ok(entries) if !entries.is_empty() => {
                    tracing::debug!(query = candidate, entries = entries.len(), "remote list");
                    return Ok((entries, upper_cased));
                }
                Ok(_) => {
                    tracing::debug!(query = candidate, "empty listing");
                    last_not_found = None;
                }
                Err(err @ FsError::NotFound { .. }) => {
                    tracing::debug!(query = candidate, "listing target not found");
                    last_not_found = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        match last_not_found {
            Some(err) => Err(err),
            None => Ok((Vec::new(), false)),
        }
    }

    fn list_mvs(&self, path: &str) -> Result<Vec<FileNode>, FsError> {
        let location = Location::parse(Some(&self.dialect.to_absolute(path)))?;
        match location.kind() {
            LocationKind::Root => {
                tracing::debug!("root listing needs a high-level qualifier");
                return Ok(Vec::new());
            }
            LocationKind::Member => {
                return Err(FsError::NotADirectory {
                    path: location.logical_path(),
                });
            }
            LocationKind::Hlq | LocationKind::Dataset => {}
        }

        let (entries, upper_cased) = self.list_candidates(&location.query_path())?;
        let parent = if upper_cased {
            Location::parse(Some(&location.logical_path().to_ascii_uppercase()))?
        } else {
            location
        };
        let children = collapse_entries(&parent, entries)?;
        Ok(children.into_iter().map(VirtualResource::into_node).collect())
    }

    fn list_unix(&self, path: &str) -> Result<Vec<FileNode>, FsError> {
        let directory = self.dialect.to_absolute(path);
        let entries = self.transport.list(&directory)?;
        tracing::debug!(path = %directory, entries = entries.len(), "remote list");

        let mut nodes: Vec<FileNode> = entries
            .into_iter()
            .filter_map(|entry| {
                let name = entry.name.rsplit('/').next().unwrap_or(&entry.name).to_string();
                if name.is_empty() || name == "." || name == ".." {
                    return None;
                }
                let kind = match entry.kind {
                    Some(EntryKind::Directory) => NodeKind::Directory,
                    _ => NodeKind::File,
                };
                let child = self.dialect.child_of(&directory, &name);
                let mut node = FileNode::new(name, child, kind);
                node.size = entry.size;
                node.modified = entry.modified;
                Some(node)
            })
            .collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(nodes)
    }
}

impl<T> fmt::Debug for RemoteFileService<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteFileService")
            .field("connection", &self.connection)
            .field("flavor", &self.flavor)
            .field("charset", &self.charset)
            .field("markers", &self.markers)
            .field("padding", &self.padding)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> FileRead for RemoteFileService<T> {
    fn read_file(&self, path: &str) -> Result<FilePayload, FsError> {
        let (target, location) = self.resolve(path)?;
        if location == Some(Location::Root) {
            return Err(FsError::NotFound { path: target });
        }

        let raw = self.transport.read_bytes(&target)?;
        let bytes = match self.padding {
            Some(pad) => trim_padding(&raw, pad).to_vec(),
            None => raw,
        };
        tracing::debug!(path = %target, bytes = bytes.len(), "remote read");
        Ok(self.payload_from_remote(bytes))
    }
}

impl<T: Transport> FileWrite for RemoteFileService<T> {
    fn write_file(&self, path: &str, payload: &FilePayload) -> Result<(), FsError> {
        let (target, location) = self.resolve(path)?;
        if location == Some(Location::Root) {
            return Err(FsError::NotSupported {
                operation: "write to root",
            });
        }

        let bytes = self.remote_bytes(payload);
        tracing::debug!(path = %target, bytes = bytes.len(), "remote write");
        self.transport.write_bytes(&target, &bytes)
    }

    fn delete(&self, path: &str) -> Result<bool, FsError> {
        let (target, location) = self.resolve(path)?;
        if location == Some(Location::Root) {
            return Err(FsError::NotSupported {
                operation: "delete root",
            });
        }
        tracing::debug!(path = %target, "remote delete");
        self.transport.delete(&target)
    }
}

impl<T: Transport> FileDir for RemoteFileService<T> {
    fn list(&self, path: &str) -> Result<Vec<FileNode>, FsError> {
        self.ensure_open()?;
        match self.flavor {
            HostFlavor::Mvs => self.list_mvs(path),
            HostFlavor::Unix => self.list_unix(path),
        }
    }

    fn create_directory(&self, path: &str) -> Result<bool, FsError> {
        let (target, location) = self.resolve(path)?;
        if let Some(location) = &location {
            if matches!(location.kind(), LocationKind::Root | LocationKind::Member) {
                return Err(FsError::NotSupported {
                    operation: "create_directory",
                });
            }
        }
        tracing::debug!(path = %target, "remote create directory");
        self.transport.make_directory(&target)
    }
}

impl<T: Transport> FileSession for RemoteFileService<T> {
    fn close(&self) -> Result<(), FsError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::info!(connection = %self.connection, "closing");
        self.transport.disconnect()
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
