//! # Dataset Paths
//!
//! The MVS naming grammar: quoting rules in [`grammar`], the
//! `Root → Hlq → Dataset → Member` state machine in [`location`], and the
//! host-dialect strategy in [`dialect`].
//!
//! Everything here is pure; no function performs I/O or holds state.

pub(crate) mod dialect;
pub(crate) mod grammar;
pub(crate) mod location;

pub use dialect::{MvsDialect, PathDialect, UnixDialect};
pub use grammar::{
    extract_hlq, has_wildcard, is_member_name, normalize, to_wildcard_query, unquote, ROOT_PATH,
};
pub use location::{Location, LocationKind};
