//! # mvsfs
//!
//! Dataset navigation, record-structure transcoding and a hash-checked
//! file-access contract for **z/OS MVS hosts**.
//!
//! MVS has no directories. It has high-level qualifiers, dot-qualified dataset
//! names and partitioned datasets with members, and it hands out record data
//! with out-of-band record markers. This crate turns all of that into
//! something an editor can browse, open and save like ordinary files.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use mvsfs::*;
//!
//! let host = MemoryHost::new()
//!     .with_dataset("KKR097.JCLKURS.CNTL", b"//JOB\xff\x01//STEP\xff\x01".to_vec())
//!     .with_dataset("KKR097.TSO.CNTL", Vec::new());
//! let connection = ConnectionId::new("ftp", "zos", Some("KKR097".into()));
//! let provider = StaticCredentials::new().with(Credentials::new("zos", "KKR097", "secret"));
//!
//! let service = RemoteFileService::connect(host, &connection, &provider)?;
//!
//! // Browse: 'KKR097.*' collapses to the next qualifier level.
//! let children: Vec<_> = service.list("KKR097")?.into_iter().map(|n| n.path).collect();
//! assert_eq!(children, ["'KKR097.JCLKURS'", "'KKR097.TSO'"]);
//!
//! // Open: record markers become newlines.
//! let loaded = service.read_file("KKR097.JCLKURS.CNTL")?;
//! assert_eq!(loaded.editor_text(), "//JOB\n//STEP");
//!
//! // Save: only if nobody changed the dataset since it was opened.
//! let edited = service.payload_from_editor_text("//JOB\n//STEP\n//DD");
//! let result = service.write_if_unchanged("KKR097.JCLKURS.CNTL", &edited, loaded.hash().as_str())?;
//! assert!(result.is_success());
//! # Ok::<(), FsError>(())
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Location`] | `Root → Hlq → Dataset → Member` navigation state |
//! | [`RemoteMarkerConfig`] | Record, end and padding markers of a host |
//! | [`FilePayload`] | Content plus charset and [`ContentHash`] |
//! | [`FileService`] | Read, write, list and close, for any backend |
//! | [`FileServiceExt`] | [`write_if_unchanged`](FileServiceExt::write_if_unchanged) and helpers |
//! | [`Transport`] | Byte-level host boundary (FTP, SFTP, in-memory) |
//! | [`FsError`] | Error type with context; [`ErrorCode`] for callers |
//!
//! ---
//!
//! ## Pure Functions
//!
//! | Function | Does |
//! |----------|------|
//! | [`normalize`] | Canonical single-quoted dataset name |
//! | [`to_wildcard_query`] | `'HLQ'` → `'HLQ.*'` |
//! | [`decode_for_editor`] / [`encode_for_remote`] | Record markers ↔ newlines |
//! | [`trim_padding`] | Drop trailing fill bytes |
//! | [`collapse_listing`] | Flat wildcard listing → next navigation level |
//! | [`parse_hex`] | Settings hex strings → bytes |
//!
//! ---
//!
//! ## Trait Hierarchy
//!
//! ```text
//! FileRead + FileWrite + FileDir + FileSession = FileService
//!                                                    ↓
//!                                            FileServiceExt
//!
//! Transport ──Layer──▶ Retrying<Transport> ──▶ RemoteFileService
//! ```
//!
//! [`FileService`] has a **blanket implementation**: implement the four
//! component traits and it comes for free, together with [`FileServiceExt`].
//!
//! ---
//!
//! ## Error Handling
//!
//! ```rust
//! use mvsfs::{ErrorCode, FsError};
//!
//! let err = FsError::NotFound { path: "'USERID.MISSING'".into() };
//! assert_eq!(err.to_string(), "not found: 'USERID.MISSING'");
//! assert_eq!(err.code(), ErrorCode::NotFound);
//! ```
//!
//! ---
//!
//! ## Thread Safety
//!
//! All service and transport traits require `Send + Sync` and take `&self`.
//! Backends keep their state behind atomics and locks, so a service can be
//! shared through `Arc` without locking at the call site.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for [`Settings`], [`Location`], [`FileNode`], [`FilePayload`], etc. |

// Private modules
mod auth;
mod backends;
mod codec;
mod config;
mod error;
mod ext;
mod layer;
mod listing;
mod padding;
mod path;
mod retry;
mod traits;
mod transport;
mod types;

// Public re-exports - error types
pub use error::{ErrorCode, FsError, PathError};

// Public re-exports - dataset paths
pub use path::{
    extract_hlq, has_wildcard, is_member_name, normalize, to_wildcard_query, unquote, Location,
    LocationKind, MvsDialect, PathDialect, UnixDialect, ROOT_PATH,
};

// Public re-exports - content transforms
pub use codec::{decode_for_editor, encode_for_remote, parse_hex, RemoteMarkerConfig};
pub use listing::{collapse_listing, listing_entry_name, VirtualResource};
pub use padding::trim_padding;

// Public re-exports - core types
pub use types::{Charset, ContentHash, FileNode, FilePayload, FileWriteResult, NodeKind};

// Public re-exports - file-access contract
pub use ext::FileServiceExt;
pub use traits::{FileDir, FileRead, FileService, FileSession, FileWrite};

// Public re-exports - auth and transport
pub use auth::{ConnectionId, Credentials, CredentialsProvider, StaticCredentials};
pub use transport::{EntryKind, RemoteEntry, Transport};

// Public re-exports - infrastructure
pub use config::{RetrySettings, Settings};
pub use layer::{Layer, LayerExt};
pub use retry::{BackoffStrategy, RetryLayer, RetryPolicy, Retrying};

// Public re-exports - backends
pub use backends::{HostFlavor, LocalFileService, MemoryHost, RemoteFileService, RemoteServiceBuilder};
