//! # PathDialect Trait
//!
//! Strategy trait for host-specific path spelling.
//!
//! ## Responsibility
//! - Turn user-supplied paths into the absolute form a host expects
//! - Join a listing entry onto its parent path
//!
//! ## Dependencies
//! - [`grammar`](super::grammar) and [`Location`] for the MVS dialect
//!
//! ## Usage
//!
//! ```rust
//! use mvsfs::{MvsDialect, PathDialect, UnixDialect};
//!
//! assert_eq!(MvsDialect.to_absolute("USERID/DATA"), "'USERID.DATA'");
//! assert_eq!(MvsDialect.child_of("'USERID.PDS'", "MEM"), "'USERID.PDS(MEM)'");
//! assert_eq!(UnixDialect.child_of("/u/user", "file.txt"), "/u/user/file.txt");
//! ```

use super::grammar::{self, ROOT_PATH};
use crate::Location;

// ============================================================================
// Trait Definition
// ============================================================================

/// Strategy trait for how a host spells paths.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; dialects are stateless and shared by
/// every operation of a file service.
///
/// # Object Safety
///
/// Object-safe, so a service can pick its dialect at connect time and hold a
/// `Box<dyn PathDialect>`.
///
/// # Implementors
///
/// - [`MvsDialect`]: quoted, dot-qualified dataset names
/// - [`UnixDialect`]: slash-separated hierarchical paths
pub trait PathDialect: Send + Sync {
    /// Absolute host path for `path`.
    fn to_absolute(&self, path: &str) -> String;

    /// Absolute host path of the entry `child` listed under `parent`.
    fn child_of(&self, parent: &str, child: &str) -> String;
}

// ============================================================================
// MVS
// ============================================================================

/// Dialect for MVS dataset names.
///
/// Empty input and `/` map to the root `''`. Slashes are accepted as
/// qualifier separators so that generic callers can still address datasets.
#[derive(Debug, Clone, Copy, Default)]
pub struct MvsDialect;

impl PathDialect for MvsDialect {
    fn to_absolute(&self, path: &str) -> String {
        let trimmed = path.trim();
        if trimmed.is_empty() || trimmed == "/" {
            return ROOT_PATH.to_string();
        }
        let dotted = trimmed.trim_start_matches('/').replace('/', ".");
        grammar::normalize(&dotted)
    }

    fn child_of(&self, parent: &str, child: &str) -> String {
        let joined = Location::parse(Some(&self.to_absolute(parent)))
            .and_then(|location| location.create_child(child));
        match joined {
            Ok(location) => location.logical_path(),
            // Not expressible as a navigation step; fall back to plain qualification.
            Err(_) => {
                let parent = grammar::canonical_body(parent);
                let child = grammar::canonical_body(child);
                if parent.is_empty() {
                    grammar::normalize(child)
                } else {
                    grammar::normalize(&format!("{parent}.{child}"))
                }
            }
        }
    }
}

// ============================================================================
// Unix
// ============================================================================

/// Dialect for hierarchical, slash-separated hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixDialect;

impl PathDialect for UnixDialect {
    fn to_absolute(&self, path: &str) -> String {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return "/".to_string();
        }
        if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        }
    }

    fn child_of(&self, parent: &str, child: &str) -> String {
        let parent = self.to_absolute(parent);
        if parent.ends_with('/') {
            format!("{parent}{child}")
        } else {
            format!("{parent}/{child}")
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
