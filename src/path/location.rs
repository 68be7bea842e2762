//! Navigation state machine over the MVS namespace.
//!
//! ```text
//! Root ──child──▶ Hlq ──child──▶ Dataset ──child──▶ Member
//! ```
//!
//! Every [`Location`] is an immutable value; navigating produces a new one.

use std::fmt;
use std::str::FromStr;

use super::grammar::{self, ROOT_PATH};
use crate::PathError;

/// The four kinds of addressable points in the MVS namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocationKind {
    /// The namespace root; parent of every high-level qualifier.
    Root,
    /// A high-level qualifier such as `USERID`.
    Hlq,
    /// A dataset such as `USERID.DATA.SET`.
    Dataset,
    /// A member of a partitioned dataset, `USERID.PDS(MEMBER)`.
    Member,
}

/// One addressable point in the MVS namespace.
///
/// Names are stored unquoted; [`logical_path`](Self::logical_path) produces the
/// canonical quoted form. Build values with [`Location::parse`] or
/// [`Location::create_child`]; both enforce the naming grammar.
///
/// # Example
///
/// ```rust
/// use mvsfs::{Location, LocationKind};
///
/// let member = Location::parse(Some("USERID.PDS(MEMBER)")).unwrap();
/// assert_eq!(member.kind(), LocationKind::Member);
/// assert_eq!(member.logical_path(), "'USERID.PDS(MEMBER)'");
/// assert_eq!(member.display_name(), "MEMBER");
/// assert!(!member.is_directory());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Location {
    /// The namespace root, `''`.
    Root,
    /// A high-level qualifier (single qualifier, no dots).
    Hlq(String),
    /// A fully qualified dataset name.
    Dataset(String),
    /// A member inside a partitioned dataset.
    Member {
        /// Fully qualified dataset name.
        dataset: String,
        /// Member name.
        member: String,
    },
}

impl Location {
    /// Parse a raw path into a location.
    ///
    /// `None`, empty input, `/` and `''` are the root. A single qualifier is an
    /// HLQ, a dotted name a dataset, and a name ending in `(...)` a member.
    /// Quoted input is unquoted first.
    ///
    /// # Errors
    ///
    /// [`PathError::Parse`] for unbalanced parentheses, empty qualifiers,
    /// embedded quotes or whitespace.
    pub fn parse(raw: Option<&str>) -> Result<Self, PathError> {
        let Some(raw) = raw else {
            return Ok(Location::Root);
        };
        let body = grammar::canonical_body(raw);
        if body.is_empty() || body == "/" {
            return Ok(Location::Root);
        }
        if body.contains('\'') {
            return Err(PathError::parse(raw, "embedded quote"));
        }
        if body.contains(char::is_whitespace) {
            return Err(PathError::parse(raw, "embedded whitespace"));
        }

        if body.contains(['(', ')']) {
            let (dataset, member) = split_member(raw, body)?;
            check_qualifiers(raw, dataset)?;
            return Ok(Location::Member {
                dataset: dataset.to_string(),
                member: member.to_string(),
            });
        }

        check_qualifiers(raw, body)?;
        if body.contains('.') {
            Ok(Location::Dataset(body.to_string()))
        } else {
            Ok(Location::Hlq(body.to_string()))
        }
    }

    /// Parse a raw path that must denote an HLQ.
    pub fn hlq(raw: &str) -> Result<Self, PathError> {
        Self::parse_as(raw, LocationKind::Hlq, "expected a single qualifier")
    }

    /// Parse a raw path that must denote a dataset.
    pub fn dataset(raw: &str) -> Result<Self, PathError> {
        Self::parse_as(raw, LocationKind::Dataset, "expected a dotted dataset name")
    }

    /// Parse a raw path that must denote a member.
    pub fn member(raw: &str) -> Result<Self, PathError> {
        Self::parse_as(raw, LocationKind::Member, "expected DATASET(MEMBER)")
    }

    fn parse_as(raw: &str, kind: LocationKind, reason: &'static str) -> Result<Self, PathError> {
        let location = Self::parse(Some(raw))?;
        if location.kind() == kind {
            Ok(location)
        } else {
            Err(PathError::parse(raw, reason))
        }
    }

    /// Kind tag of this location.
    pub fn kind(&self) -> LocationKind {
        match self {
            Location::Root => LocationKind::Root,
            Location::Hlq(_) => LocationKind::Hlq,
            Location::Dataset(_) => LocationKind::Dataset,
            Location::Member { .. } => LocationKind::Member,
        }
    }

    /// The unquoted name, e.g. `USERID.PDS(MEMBER)`; empty for the root.
    pub fn unquoted(&self) -> String {
        match self {
            Location::Root => String::new(),
            Location::Hlq(name) | Location::Dataset(name) => name.clone(),
            Location::Member { dataset, member } => format!("{dataset}({member})"),
        }
    }

    /// Canonical single-quoted path used to address the host.
    pub fn logical_path(&self) -> String {
        match self {
            Location::Root => ROOT_PATH.to_string(),
            _ => grammar::quote(&self.unquoted()),
        }
    }

    /// Label for display: last qualifier, or the member name.
    pub fn display_name(&self) -> &str {
        match self {
            Location::Root => "",
            Location::Hlq(name) => name,
            Location::Dataset(name) => name.rsplit('.').next().unwrap_or(name),
            Location::Member { member, .. } => member,
        }
    }

    /// Path used to list the children of this location.
    ///
    /// HLQs need a wildcard qualifier (`'USERID.*'`); datasets list their
    /// members under their own name.
    pub fn query_path(&self) -> String {
        match self {
            Location::Hlq(_) => grammar::to_wildcard_query(&self.logical_path()),
            _ => self.logical_path(),
        }
    }

    /// `true` for every kind except [`LocationKind::Member`].
    pub fn is_directory(&self) -> bool {
        !matches!(self, Location::Member { .. })
    }

    /// The enclosing location, or `None` for the root.
    ///
    /// A dataset's parent is its HLQ; a member's parent is its dataset.
    pub fn parent(&self) -> Option<Location> {
        match self {
            Location::Root => None,
            Location::Hlq(_) => Some(Location::Root),
            Location::Dataset(name) => Some(Location::Hlq(grammar::extract_hlq(name).to_string())),
            Location::Member { dataset, .. } => Some(Location::Dataset(dataset.clone())),
        }
    }

    /// Derive a child location from a name returned by a listing.
    ///
    /// Servers sometimes return fully qualified names; when the child already
    /// starts with this location's name, the qualifier is not repeated.
    ///
    /// ```rust
    /// use mvsfs::Location;
    ///
    /// let hlq = Location::parse(Some("USERID")).unwrap();
    /// let a = hlq.create_child("DATA.SET").unwrap();
    /// let b = hlq.create_child("USERID.DATA.SET").unwrap();
    /// assert_eq!(a, b);
    /// assert_eq!(a.logical_path(), "'USERID.DATA.SET'");
    /// ```
    ///
    /// # Errors
    ///
    /// - [`PathError::InvalidTransition`] when called on a member
    /// - [`PathError::Parse`] when the child name is empty or malformed for the
    ///   target kind
    pub fn create_child(&self, raw_child: &str) -> Result<Location, PathError> {
        let child = grammar::canonical_body(raw_child);

        match self {
            Location::Member { .. } => Err(PathError::InvalidTransition {
                from: LocationKind::Member,
                child: raw_child.to_string(),
            }),
            _ if child.is_empty() => Err(PathError::parse(raw_child, "empty child name")),
            Location::Root => Location::hlq(grammar::extract_hlq(child)),
            Location::Hlq(parent) => {
                let name = match strip_qualifier_prefix(child, parent, '.') {
                    Some(_) => child.to_string(),
                    None => format!("{parent}.{child}"),
                };
                Location::dataset(&name)
            }
            Location::Dataset(parent) => {
                let member = match strip_qualifier_prefix(child, parent, '(') {
                    Some(rest) => rest.strip_suffix(')').unwrap_or(rest),
                    None => strip_qualifier_prefix(child, parent, '.').unwrap_or(child),
                };
                if member.contains(['.', '(', ')']) {
                    return Err(PathError::parse(raw_child, "member name must be a single token"));
                }
                Location::member(&format!("{parent}({member})"))
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.logical_path())
    }
}

impl FromStr for Location {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Location::parse(Some(s))
    }
}

/// Case-insensitive `prefix + separator` strip; returns the non-empty rest.
fn strip_qualifier_prefix<'a>(name: &'a str, prefix: &str, separator: char) -> Option<&'a str> {
    let head = name.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    let rest = name.get(prefix.len()..)?.strip_prefix(separator)?;
    (!rest.is_empty()).then_some(rest)
}

fn split_member<'a>(raw: &str, body: &'a str) -> Result<(&'a str, &'a str), PathError> {
    let (Some(open), Some(close)) = (body.find('('), body.find(')')) else {
        return Err(PathError::parse(raw, "unbalanced parentheses"));
    };
    if body.matches('(').count() != 1 || body.matches(')').count() != 1 || close < open {
        return Err(PathError::parse(raw, "unbalanced parentheses"));
    }
    if close != body.len() - 1 {
        return Err(PathError::parse(raw, "text after member name"));
    }
    let dataset = &body[..open];
    let member = &body[open + 1..close];
    if dataset.is_empty() {
        return Err(PathError::parse(raw, "empty dataset name"));
    }
    if member.is_empty() {
        return Err(PathError::parse(raw, "empty member name"));
    }
    if member.contains('.') {
        return Err(PathError::parse(raw, "member name must be a single token"));
    }
    Ok((dataset, member))
}

fn check_qualifiers(raw: &str, name: &str) -> Result<(), PathError> {
    if name.split('.').any(str::is_empty) {
        return Err(PathError::parse(raw, "empty qualifier"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(raw: &str) -> Location {
        Location::parse(Some(raw)).unwrap()
    }

    #[test]
    fn parse_root_forms() {
        assert_eq!(Location::parse(None).unwrap(), Location::Root);
        assert_eq!(loc(""), Location::Root);
        assert_eq!(loc("/"), Location::Root);
        assert_eq!(loc("''"), Location::Root);
        assert_eq!(Location::Root.logical_path(), "''");
    }

    #[test]
    fn parse_hlq() {
        let hlq = loc("USERID");
        assert_eq!(hlq.kind(), LocationKind::Hlq);
        assert_eq!(hlq.logical_path(), "'USERID'");
        assert_eq!(hlq.display_name(), "USERID");
        assert_eq!(loc("'USERID'"), hlq);
    }

    #[test]
    fn parse_dataset() {
        let ds = loc("USERID.DATA.SET");
        assert_eq!(ds.kind(), LocationKind::Dataset);
        assert_eq!(ds.logical_path(), "'USERID.DATA.SET'");
        assert_eq!(ds.display_name(), "SET");
    }

    #[test]
    fn parse_member() {
        let m = loc("USERID.PDS(MEMBER)");
        assert_eq!(m.kind(), LocationKind::Member);
        assert_eq!(m.logical_path(), "'USERID.PDS(MEMBER)'");
        assert_eq!(m.display_name(), "MEMBER");
    }

    #[test]
    fn parse_trailing_dot_is_normalized_away() {
        assert_eq!(loc("USERID."), loc("USERID"));
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for bad in [
            "USERID.PDS(MEM",
            "USERID.PDSMEM)",
            "USERID.PDS)MEM(",
            "USERID.PDS(MEM)X",
            "USERID.PDS((MEM))",
            "(MEM)",
            "USERID.PDS()",
            "USERID..PDS",
            ".USERID",
            "USER ID",
            "USER'ID",
        ] {
            let err = Location::parse(Some(bad)).unwrap_err();
            assert!(matches!(err, PathError::Parse { .. }), "input {bad:?}");
        }
    }

    #[test]
    fn query_paths() {
        assert_eq!(loc("USERID").query_path(), "'USERID.*'");
        assert_eq!(loc("USERID.PDS").query_path(), "'USERID.PDS'");
        assert_eq!(loc("USERID.PDS(M)").query_path(), "'USERID.PDS(M)'");
        assert_eq!(Location::Root.query_path(), "''");
    }

    #[test]
    fn directory_flags() {
        assert!(Location::Root.is_directory());
        assert!(loc("USERID").is_directory());
        assert!(loc("USERID.PDS").is_directory());
        assert!(!loc("USERID.PDS(MEM)").is_directory());
    }

    #[test]
    fn root_child_is_hlq() {
        let child = Location::Root.create_child("USERID").unwrap();
        assert_eq!(child, Location::Hlq("USERID".into()));
        let qualified = Location::Root.create_child("'USERID.DATA'").unwrap();
        assert_eq!(qualified, Location::Hlq("USERID".into()));
    }

    #[test]
    fn hlq_child_is_dataset_without_duplicate_qualifier() {
        let parent = Location::hlq("USERID").unwrap();
        let relative = parent.create_child("DATA.SET").unwrap();
        let qualified = parent.create_child("USERID.DATA.SET").unwrap();
        assert_eq!(relative.kind(), LocationKind::Dataset);
        assert_eq!(relative.logical_path(), "'USERID.DATA.SET'");
        assert_eq!(relative, qualified);
    }

    #[test]
    fn hlq_prefix_match_is_case_insensitive() {
        let parent = Location::hlq("userid").unwrap();
        let child = parent.create_child("USERID.DATA").unwrap();
        assert_eq!(child.logical_path(), "'USERID.DATA'");
    }

    #[test]
    fn dataset_child_is_member() {
        let parent = Location::dataset("USERID.PDS").unwrap();
        let child = parent.create_child("MEMBER1").unwrap();
        assert_eq!(child.kind(), LocationKind::Member);
        assert_eq!(child.logical_path(), "'USERID.PDS(MEMBER1)'");
        assert_eq!(child.display_name(), "MEMBER1");
    }

    #[test]
    fn dataset_child_accepts_qualified_member_forms() {
        let parent = Location::dataset("USERID.PDS").unwrap();
        let expected = parent.create_child("MEM").unwrap();
        assert_eq!(parent.create_child("USERID.PDS(MEM)").unwrap(), expected);
        assert_eq!(parent.create_child("'USERID.PDS.MEM'").unwrap(), expected);
    }

    #[test]
    fn dataset_child_rejects_multi_qualifier_names() {
        let parent = Location::dataset("USERID.PDS").unwrap();
        let err = parent.create_child("OTHER.NAME").unwrap_err();
        assert!(matches!(err, PathError::Parse { .. }));
    }

    #[test]
    fn member_has_no_children() {
        let member = loc("USERID.PDS(MEM)");
        let err = member.create_child("X").unwrap_err();
        assert_eq!(
            err,
            PathError::InvalidTransition {
                from: LocationKind::Member,
                child: "X".into(),
            }
        );
    }

    #[test]
    fn empty_child_is_rejected() {
        let err = loc("USERID").create_child("  ").unwrap_err();
        assert!(matches!(err, PathError::Parse { .. }));
    }

    #[test]
    fn typed_constructors_check_kind() {
        assert!(Location::hlq("A.B").is_err());
        assert!(Location::dataset("A").is_err());
        assert!(Location::member("A.B").is_err());
        assert!(Location::member("A.B(C)").is_ok());
    }

    #[test]
    fn parents_walk_back_up() {
        let member = loc("USERID.PDS(MEM)");
        let dataset = member.parent().unwrap();
        assert_eq!(dataset, loc("USERID.PDS"));
        let hlq = dataset.parent().unwrap();
        assert_eq!(hlq, loc("USERID"));
        assert_eq!(hlq.parent(), Some(Location::Root));
        assert_eq!(Location::Root.parent(), None);
    }

    #[test]
    fn display_and_from_str_agree() {
        let parsed: Location = "'USERID.PDS(MEM)'".parse().unwrap();
        assert_eq!(parsed.to_string(), "'USERID.PDS(MEM)'");
    }

    #[test]
    fn locations_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Location>();
        assert_send_sync::<LocationKind>();
    }
}
