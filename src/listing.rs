//! Collapse flat wildcard listings into the immediate child level.
//!
//! A query such as `'KKR097.*'` returns every dataset below the HLQ, fully
//! qualified and at any depth. Navigation wants only the next qualifier:
//!
//! ```text
//! KKR097.JCLKURS.CNTL   ─┐
//! KKR097.JCLKURS.MACLIB ─┼─▶ JCLKURS
//! KKR097.TSO.CNTL       ───▶ TSO
//! KKR097                ───▶ (self reference, dropped)
//! ```

use std::collections::BTreeMap;
use std::time::SystemTime;

use crate::{FileNode, Location, LocationKind, NodeKind, PathError, RemoteEntry};

/// Longest valid dataset name, qualifiers and dots included.
const MAX_DATASET_NAME: usize = 44;

/// First column of the header line a host puts above a dataset or member `LIST`.
const HEADER_COLUMNS: [&str; 2] = ["Volume", "Name"];

/// One navigable child produced by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualResource {
    /// Label for display.
    pub display_name: String,
    /// Where the child lives.
    pub location: Location,
    /// Size reported by the host, when the entry was listed directly.
    pub size: Option<u64>,
    /// Modification time reported by the host, when the entry was listed directly.
    #[cfg_attr(feature = "serde", serde(with = "crate::types::optional_system_time_serde"))]
    pub modified: Option<SystemTime>,
}

impl VirtualResource {
    /// Resource for `location`, labelled with its display name.
    pub fn new(location: Location) -> Self {
        Self {
            display_name: location.display_name().to_string(),
            location,
            size: None,
            modified: None,
        }
    }

    /// Whether the child can be listed further.
    pub fn is_directory(&self) -> bool {
        self.location.is_directory()
    }

    /// Convert into a contract-level [`FileNode`].
    pub fn into_node(self) -> FileNode {
        let kind = if self.is_directory() {
            NodeKind::Directory
        } else {
            NodeKind::File
        };
        FileNode {
            name: self.display_name,
            path: self.location.logical_path(),
            kind,
            size: self.size,
            modified: self.modified,
        }
    }
}

/// Reduce one listing entry to a dataset name.
///
/// Hosts answer either with bare names or with full dataset `LIST` lines
/// whose last column is the name. Surrounding quotes are removed. Header
/// lines yield `None`, as does anything that is not a plausible dataset
/// name: at most 44 characters of letters, digits, `@ # $ . ( )`.
///
/// ```rust
/// use mvsfs::listing_entry_name;
///
/// assert_eq!(listing_entry_name("'USERID.DATA'"), Some("USERID.DATA"));
/// assert_eq!(
///     listing_entry_name("WRK001 3390 2024/01/02 1 15 FB 80 27920 PS USERID.DATA"),
///     Some("USERID.DATA")
/// );
/// assert_eq!(listing_entry_name("Volume Unit Referred Ext Used Recfm Lrecl BlkSz Dsorg Dsname"), None);
/// assert_eq!(listing_entry_name("  "), None);
/// ```
pub fn listing_entry_name(raw: &str) -> Option<&str> {
    if is_header_line(raw) {
        return None;
    }
    let token = raw.split_whitespace().last()?;
    let name = token.trim_matches('\'');
    is_valid_dataset_name(name).then_some(name)
}

/// Member name of one entry of a partitioned dataset listing.
///
/// Member `LIST` lines carry the name in the first column, followed by ISPF
/// statistics. Single-token entries are read like dataset entries so that
/// `DSN(MEM)` forms still work.
fn member_entry_name(raw: &str) -> Option<&str> {
    let mut tokens = raw.split_whitespace();
    let first = tokens.next()?;
    if tokens.next().is_none() {
        return listing_entry_name(first);
    }
    if is_header_line(raw) {
        return None;
    }
    let name = first.trim_matches('\'');
    is_valid_dataset_name(name).then_some(name)
}

/// A multi-column line that starts with a known column title.
fn is_header_line(raw: &str) -> bool {
    let mut tokens = raw.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(first), Some(_)) => HEADER_COLUMNS.iter().any(|h| h.eq_ignore_ascii_case(first)),
        _ => false,
    }
}

fn is_valid_dataset_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_DATASET_NAME
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '@' | '#' | '$' | '(' | ')'))
}

/// Collapse fully qualified names to one resource per immediate child.
///
/// Each name has the parent's qualifier prefix removed (case-insensitively)
/// and is cut at the next `.`; the resulting keys are deduplicated, entries
/// equal to the parent itself are dropped, and the output is sorted by key.
/// Under a dataset, `DSN(MEM)` entries collapse to `MEM`.
///
/// Entries that are not dataset names, or that cannot be a child of
/// `parent`, are skipped with a warning. Under a dataset, multi-column
/// entries are member `LIST` lines and the name is their first column.
///
/// # Errors
///
/// [`PathError::InvalidTransition`] when `parent` is a member.
///
/// ```rust
/// use mvsfs::{collapse_listing, Location};
///
/// let parent = Location::hlq("KKR097").unwrap();
/// let names = ["KKR097.JCLKURS.CNTL", "KKR097.TSO.CNTL", "KKR097.JCLKURS.MACLIB", "KKR097"];
/// let children = collapse_listing(&parent, names).unwrap();
/// let paths: Vec<_> = children.iter().map(|r| r.location.logical_path()).collect();
/// assert_eq!(paths, ["'KKR097.JCLKURS'", "'KKR097.TSO'"]);
/// ```
pub fn collapse_listing<I, S>(parent: &Location, names: I) -> Result<Vec<VirtualResource>, PathError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    collapse_entries(
        parent,
        names.into_iter().map(|name| RemoteEntry::named(name.as_ref())),
    )
}

/// [`collapse_listing`] over transport entries that may carry size and time.
///
/// Size and modification time are kept only for entries that are the
/// immediate child themselves, never for a deeper entry that merely shares
/// its key.
pub(crate) fn collapse_entries<I>(parent: &Location, entries: I) -> Result<Vec<VirtualResource>, PathError>
where
    I: IntoIterator<Item = RemoteEntry>,
{
    let mut entries = entries.into_iter().peekable();
    if parent.kind() == LocationKind::Member {
        let child = entries.peek().map(|e| e.name.clone()).unwrap_or_default();
        return Err(PathError::InvalidTransition {
            from: LocationKind::Member,
            child,
        });
    }

    let parent_name = parent.unquoted();
    let mut children: BTreeMap<String, VirtualResource> = BTreeMap::new();

    let in_dataset = parent.kind() == LocationKind::Dataset;

    for entry in entries {
        let raw = entry.name.as_str();
        let name = if in_dataset {
            member_entry_name(raw)
        } else {
            listing_entry_name(raw)
        };
        let Some(name) = name else {
            if !raw.trim().is_empty() {
                tracing::warn!(entry = raw, "skipping unrecognized listing entry");
            }
            continue;
        };
        if name.eq_ignore_ascii_case(&parent_name) {
            tracing::debug!(entry = name, "skipping self reference");
            continue;
        }

        let (key, direct) = child_key(parent, &parent_name, name);
        if key.is_empty() {
            continue;
        }
        let sort_key = key.to_ascii_uppercase();

        if let Some(existing) = children.get_mut(&sort_key) {
            if direct {
                existing.size = existing.size.or(entry.size);
                existing.modified = existing.modified.or(entry.modified);
            }
            continue;
        }

        match parent.create_child(key) {
            Ok(location) => {
                let mut resource = VirtualResource::new(location);
                if direct {
                    resource.size = entry.size;
                    resource.modified = entry.modified;
                }
                children.insert(sort_key, resource);
            }
            Err(err) => tracing::warn!(entry = name, error = %err, "skipping listing entry"),
        }
    }

    Ok(children.into_values().collect())
}

/// Immediate child key of `name` below `parent`, and whether `name` is that
/// child itself rather than something deeper.
fn child_key<'a>(parent: &Location, parent_name: &str, name: &'a str) -> (&'a str, bool) {
    if parent.kind() == LocationKind::Dataset {
        if let Some(member) = strip_prefix_ignore_case(name, parent_name, '(') {
            let member = member.strip_suffix(')').unwrap_or(member);
            return (member, true);
        }
    }

    let rest = if parent_name.is_empty() {
        name
    } else {
        strip_prefix_ignore_case(name, parent_name, '.').unwrap_or(name)
    };
    let end = rest.find(['.', '(']).unwrap_or(rest.len());
    (&rest[..end], end == rest.len())
}

fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str, separator: char) -> Option<&'a str> {
    let head = name.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    name.get(prefix.len()..)?.strip_prefix(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn paths(resources: &[VirtualResource]) -> Vec<String> {
        resources.iter().map(|r| r.location.logical_path()).collect()
    }

    #[test]
    fn collapses_hlq_listing() {
        let parent = Location::hlq("KKR097").unwrap();
        let names = [
            "KKR097.JCLKURS.CNTL",
            "KKR097.TSO.CNTL",
            "KKR097.JCLKURS.MACLIB",
            "KKR097",
        ];
        let children = collapse_listing(&parent, names).unwrap();
        assert_eq!(paths(&children), ["'KKR097.JCLKURS'", "'KKR097.TSO'"]);
        assert_eq!(children[0].display_name, "JCLKURS");
        assert!(children.iter().all(|c| c.location.kind() == LocationKind::Dataset));
    }

    #[test]
    fn relative_and_quoted_names() {
        let parent = Location::hlq("USERID").unwrap();
        let names = ["'USERID.B'", "A", "userid.c.d", "B"];
        let children = collapse_listing(&parent, names).unwrap();
        assert_eq!(paths(&children), ["'USERID.A'", "'USERID.B'", "'USERID.c'"]);
    }

    #[test]
    fn root_listing_yields_hlqs() {
        let names = ["SYS1.PARMLIB", "SYS1.PROCLIB", "USERID.DATA"];
        let children = collapse_listing(&Location::Root, names).unwrap();
        assert_eq!(paths(&children), ["'SYS1'", "'USERID'"]);
        assert!(children.iter().all(|c| c.location.kind() == LocationKind::Hlq));
    }

    #[test]
    fn dataset_listing_yields_members() {
        let parent = Location::dataset("USERID.PDS").unwrap();
        let names = ["MEMB", "USERID.PDS(MEMA)", "'USERID.PDS'", "MEMB"];
        let children = collapse_listing(&parent, names).unwrap();
        assert_eq!(paths(&children), ["'USERID.PDS(MEMA)'", "'USERID.PDS(MEMB)'"]);
        assert!(children.iter().all(|c| !c.is_directory()));
    }

    #[test]
    fn raw_list_lines_are_reduced_to_names() {
        let parent = Location::hlq("USERID").unwrap();
        let names = [
            "WRK001 3390   2024/01/02  1   15  FB      80 27920  PS  USERID.DATA",
            "Migrated                                                 USERID.OLD",
            "",
        ];
        let children = collapse_listing(&parent, names).unwrap();
        assert_eq!(paths(&children), ["'USERID.DATA'", "'USERID.OLD'"]);
    }

    #[test]
    fn invalid_entries_are_skipped() {
        let parent = Location::hlq("USERID").unwrap();
        let names = ["USERID.GOOD", "USERID.BAD*", "USERID.%%%"];
        let children = collapse_listing(&parent, names).unwrap();
        assert_eq!(paths(&children), ["'USERID.GOOD'"]);
    }

    #[test]
    fn member_parent_is_an_invalid_transition() {
        let parent = Location::member("USERID.PDS(MEM)").unwrap();
        let err = collapse_listing(&parent, ["X"]).unwrap_err();
        assert!(matches!(err, PathError::InvalidTransition { from: LocationKind::Member, .. }));
    }

    #[test]
    fn dataset_header_line_is_not_an_entry() {
        let parent = Location::hlq("USERID").unwrap();
        let names = [
            "Volume Unit    Referred Ext Used Recfm Lrecl BlkSz Dsorg Dsname",
            "WRK001 3390   2024/01/02  1   15  FB      80 27920  PS  USERID.DATA",
        ];
        let children = collapse_listing(&parent, names).unwrap();
        assert_eq!(paths(&children), ["'USERID.DATA'"]);
    }

    #[test]
    fn member_list_lines_use_the_first_column() {
        let parent = Location::dataset("USERID.PDS").unwrap();
        let names = [
            " Name     VV.MM   Created       Changed      Size  Init   Mod   Id",
            "MEMA      01.00 2024/01/02 2024/01/03 12:00   10    10     0 USERID",
            "MEMB",
        ];
        let children = collapse_listing(&parent, names).unwrap();
        assert_eq!(paths(&children), ["'USERID.PDS(MEMA)'", "'USERID.PDS(MEMB)'"]);
    }

    #[test]
    fn single_token_named_like_a_header_is_a_dataset() {
        let parent = Location::hlq("USERID").unwrap();
        let children = collapse_listing(&parent, ["NAME", "USERID.VOLUME"]).unwrap();
        assert_eq!(paths(&children), ["'USERID.NAME'", "'USERID.VOLUME'"]);
    }

    #[test]
    fn size_and_time_stick_to_direct_entries_only() {
        let parent = Location::hlq("USERID").unwrap();
        let changed = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let entries = [
            RemoteEntry::named("USERID.A.DEEP").with_size(10).with_modified(UNIX_EPOCH),
            RemoteEntry::named("USERID.A").with_size(80).with_modified(changed),
            RemoteEntry::named("USERID.B.X").with_size(5).with_modified(changed),
        ];
        let children = collapse_entries(&parent, entries).unwrap();
        assert_eq!(children[0].size, Some(80));
        assert_eq!(children[0].modified, Some(changed));
        assert_eq!(children[1].size, None);
        assert_eq!(children[1].modified, None);

        let node = children[0].clone().into_node();
        assert_eq!(node.modified, Some(changed));
    }

    #[test]
    fn entry_names() {
        assert_eq!(listing_entry_name("USERID.PDS(MEM)"), Some("USERID.PDS(MEM)"));
        assert_eq!(listing_entry_name("x".repeat(45).as_str()), None);
        assert_eq!(listing_entry_name("a-b"), None);
        assert_eq!(listing_entry_name("volume unit referred"), None);
        assert_eq!(member_entry_name("MEMA 01.00 2024/01/02 0 USERID"), Some("MEMA"));
        assert_eq!(member_entry_name("Name VV.MM Created Id"), None);
        assert_eq!(member_entry_name("USERID.PDS(MEM)"), Some("USERID.PDS(MEM)"));
    }

    #[test]
    fn into_node() {
        let resource = VirtualResource::new(Location::member("USERID.PDS(MEM)").unwrap());
        let node = resource.into_node();
        assert_eq!(node.name, "MEM");
        assert_eq!(node.path, "'USERID.PDS(MEM)'");
        assert_eq!(node.kind, NodeKind::File);
    }
}
