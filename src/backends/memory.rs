//! In-memory MVS host.
//!
//! A [`Transport`] that behaves like the dataset side of a z/OS FTP server:
//! sequential datasets and partitioned datasets with members, addressed by
//! quoted dataset names and listed with wildcard queries. Names are matched
//! exactly, as a real host does for quoted names.
//!
//! ```rust
//! use mvsfs::{MemoryHost, Transport};
//!
//! let host = MemoryHost::new()
//!     .with_dataset("USERID.DATA", b"hello".to_vec())
//!     .with_member("USERID.PDS", "MEM1", b"x".to_vec());
//!
//! assert_eq!(host.read_bytes("'USERID.DATA'").unwrap(), b"hello");
//! let names: Vec<_> = host.list("'USERID.*'").unwrap().into_iter().map(|e| e.name).collect();
//! assert_eq!(names, ["USERID.DATA", "USERID.PDS"]);
//! ```

use std::collections::BTreeMap;

use parking_lot::{Mutex, RwLock};

use crate::path::grammar;
use crate::{Credentials, EntryKind, FsError, Location, RemoteEntry, Transport};

const SYSTEM_TYPE: &str = "MVS is the operating system of this server. FTP Server is running on z/OS.";

#[derive(Debug, Clone)]
enum Dataset {
    Sequential(Vec<u8>),
    Partitioned(BTreeMap<String, Vec<u8>>),
}

/// In-memory MVS-style [`Transport`].
#[derive(Debug, Default)]
pub struct MemoryHost {
    datasets: RwLock<BTreeMap<String, Dataset>>,
    login: Option<(String, String)>,
    session_user: Mutex<Option<String>>,
}

impl MemoryHost {
    /// Empty host accepting any login.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept this user and password.
    pub fn with_login(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.login = Some((username.into(), password.into()));
        self
    }

    /// Add a sequential dataset.
    pub fn with_dataset(self, name: &str, content: Vec<u8>) -> Self {
        self.datasets
            .write()
            .insert(grammar::unquote(name).to_string(), Dataset::Sequential(content));
        self
    }

    /// Add a member, creating its partitioned dataset if needed.
    pub fn with_member(self, dataset: &str, member: &str, content: Vec<u8>) -> Self {
        {
            let mut datasets = self.datasets.write();
            let entry = datasets
                .entry(grammar::unquote(dataset).to_string())
                .or_insert_with(|| Dataset::Partitioned(BTreeMap::new()));
            if let Dataset::Partitioned(members) = entry {
                members.insert(member.to_string(), content);
            }
        }
        self
    }

    /// Stored bytes of a dataset or member, if present.
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.read_bytes(path).ok()
    }

    /// User of the last successful login.
    pub fn session_user(&self) -> Option<String> {
        self.session_user.lock().clone()
    }

    fn parse(path: &str) -> Result<Location, FsError> {
        Ok(Location::parse(Some(path))?)
    }
}

fn not_found(path: &str) -> FsError {
    FsError::NotFound {
        path: path.to_string(),
    }
}

impl Transport for MemoryHost {
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, FsError> {
        let datasets = self.datasets.read();
        match Self::parse(path)? {
            Location::Hlq(name) | Location::Dataset(name) => match datasets.get(&name) {
                Some(Dataset::Sequential(bytes)) => Ok(bytes.clone()),
                Some(Dataset::Partitioned(_)) => Err(FsError::Reply {
                    code: 550,
                    message: format!("{name} is a partitioned data set"),
                }),
                None => Err(not_found(path)),
            },
            Location::Member { dataset, member } => match datasets.get(&dataset) {
                Some(Dataset::Partitioned(members)) => {
                    members.get(&member).cloned().ok_or_else(|| not_found(path))
                }
                _ => Err(not_found(path)),
            },
            Location::Root => Err(not_found(path)),
        }
    }

    fn write_bytes(&self, path: &str, data: &[u8]) -> Result<(), FsError> {
        let mut datasets = self.datasets.write();
        match Self::parse(path)? {
            Location::Hlq(name) | Location::Dataset(name) => match datasets.get_mut(&name) {
                Some(Dataset::Partitioned(_)) => Err(FsError::Reply {
                    code: 550,
                    message: format!("{name} is a partitioned data set"),
                }),
                _ => {
                    datasets.insert(name, Dataset::Sequential(data.to_vec()));
                    Ok(())
                }
            },
            Location::Member { dataset, member } => match datasets.get_mut(&dataset) {
                Some(Dataset::Partitioned(members)) => {
                    members.insert(member, data.to_vec());
                    Ok(())
                }
                _ => Err(not_found(path)),
            },
            Location::Root => Err(FsError::NotSupported {
                operation: "write to root",
            }),
        }
    }

    fn list(&self, query: &str) -> Result<Vec<RemoteEntry>, FsError> {
        let body = grammar::unquote(query);
        let datasets = self.datasets.read();

        if let Some(prefix) = body.strip_suffix(".*") {
            let qualified = format!("{prefix}.");
            return Ok(datasets
                .iter()
                .filter(|(name, _)| name.starts_with(&qualified))
                .map(|(name, dataset)| match dataset {
                    Dataset::Sequential(bytes) => RemoteEntry::named(name.as_str())
                        .with_kind(EntryKind::File)
                        .with_size(bytes.len() as u64),
                    Dataset::Partitioned(_) => {
                        RemoteEntry::named(name.as_str()).with_kind(EntryKind::Directory)
                    }
                })
                .collect());
        }

        match datasets.get(body) {
            Some(Dataset::Partitioned(members)) => Ok(members
                .iter()
                .map(|(member, bytes)| {
                    RemoteEntry::named(member.as_str())
                        .with_kind(EntryKind::File)
                        .with_size(bytes.len() as u64)
                })
                .collect()),
            Some(Dataset::Sequential(bytes)) => Ok(vec![
                RemoteEntry::named(body)
                    .with_kind(EntryKind::File)
                    .with_size(bytes.len() as u64),
            ]),
            None => Err(not_found(query)),
        }
    }

    fn delete(&self, path: &str) -> Result<bool, FsError> {
        let mut datasets = self.datasets.write();
        match Self::parse(path)? {
            Location::Hlq(name) | Location::Dataset(name) => Ok(datasets.remove(&name).is_some()),
            Location::Member { dataset, member } => match datasets.get_mut(&dataset) {
                Some(Dataset::Partitioned(members)) => Ok(members.remove(&member).is_some()),
                _ => Ok(false),
            },
            Location::Root => Ok(false),
        }
    }

    fn make_directory(&self, path: &str) -> Result<bool, FsError> {
        let mut datasets = self.datasets.write();
        match Self::parse(path)? {
            Location::Hlq(name) | Location::Dataset(name) => {
                if datasets.contains_key(&name) {
                    return Ok(false);
                }
                datasets.insert(name, Dataset::Partitioned(BTreeMap::new()));
                Ok(true)
            }
            _ => Err(FsError::NotSupported {
                operation: "create_directory",
            }),
        }
    }

    fn login(&self, credentials: &Credentials) -> Result<(), FsError> {
        if let Some((user, password)) = &self.login {
            if credentials.username != *user || credentials.password != *password {
                return Err(FsError::AuthFailed {
                    reason: format!("530 login incorrect for {}", credentials.username),
                });
            }
        }
        *self.session_user.lock() = Some(credentials.username.clone());
        Ok(())
    }

    fn system_type(&self) -> Option<String> {
        Some(SYSTEM_TYPE.to_string())
    }

    fn disconnect(&self) -> Result<(), FsError> {
        *self.session_user.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> MemoryHost {
        MemoryHost::new()
            .with_dataset("USERID.SEQ", b"data".to_vec())
            .with_member("USERID.PDS", "MEMA", b"a".to_vec())
            .with_member("USERID.PDS", "MEMB", b"bb".to_vec())
            .with_dataset("OTHER.SEQ", Vec::new())
    }

    #[test]
    fn reads_sequential_and_members() {
        let host = host();
        assert_eq!(host.read_bytes("'USERID.SEQ'").unwrap(), b"data");
        assert_eq!(host.read_bytes("'USERID.PDS(MEMB)'").unwrap(), b"bb");
        assert!(matches!(
            host.read_bytes("'USERID.NOPE'"),
            Err(FsError::NotFound { .. })
        ));
        assert!(matches!(
            host.read_bytes("'USERID.PDS'"),
            Err(FsError::Reply { code: 550, .. })
        ));
    }

    #[test]
    fn wildcard_lists_fully_qualified_names() {
        let entries = host().list("'USERID.*'").unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["USERID.PDS", "USERID.SEQ"]);
        assert_eq!(entries[0].kind, Some(EntryKind::Directory));
        assert_eq!(entries[1].size, Some(4));
    }

    #[test]
    fn wildcard_is_case_sensitive() {
        assert!(host().list("'userid.*'").unwrap().is_empty());
    }

    #[test]
    fn pds_lists_members() {
        let entries = host().list("'USERID.PDS'").unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["MEMA", "MEMB"]);
    }

    #[test]
    fn writes_and_deletes() {
        let host = host();
        host.write_bytes("'USERID.NEW'", b"n").unwrap();
        host.write_bytes("'USERID.PDS(MEMC)'", b"c").unwrap();
        assert_eq!(host.contents("'USERID.NEW'"), Some(b"n".to_vec()));
        assert!(matches!(
            host.write_bytes("'NOPDS.X(M)'", b"x"),
            Err(FsError::NotFound { .. })
        ));
        assert!(host.delete("'USERID.PDS(MEMC)'").unwrap());
        assert!(!host.delete("'USERID.PDS(MEMC)'").unwrap());
    }

    #[test]
    fn make_directory_allocates_pds() {
        let host = host();
        assert!(host.make_directory("'USERID.NEWPDS'").unwrap());
        assert!(!host.make_directory("'USERID.NEWPDS'").unwrap());
        host.write_bytes("'USERID.NEWPDS(M)'", b"m").unwrap();
        assert_eq!(host.contents("'USERID.NEWPDS(M)'"), Some(b"m".to_vec()));
    }

    #[test]
    fn login_checks_credentials() {
        let host = MemoryHost::new().with_login("USERID", "pw");
        let bad = host.login(&Credentials::new("h", "USERID", "wrong"));
        assert!(matches!(bad, Err(FsError::AuthFailed { .. })));
        host.login(&Credentials::new("h", "USERID", "pw")).unwrap();
        assert_eq!(host.session_user().as_deref(), Some("USERID"));
        host.disconnect().unwrap();
        assert_eq!(host.session_user(), None);
    }

    #[test]
    fn reports_mvs_system_type() {
        assert!(host().system_type().unwrap().contains("MVS"));
    }
}
