//! Error types for path grammar and file-access operations.

use std::fmt;

use crate::LocationKind;

/// Error raised by the dataset path grammar.
///
/// Grammar errors are surfaced immediately. The only corrections ever applied
/// to an input are the documented normalization rules (quote stripping,
/// trailing-dot removal); anything else is rejected here.
///
/// # Examples
///
/// ```rust
/// use mvsfs::{Location, PathError};
///
/// let err = Location::parse(Some("USERID.PDS(MEM")).unwrap_err();
/// assert!(matches!(err, PathError::Parse { .. }));
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The input does not follow the dataset naming grammar.
    #[error("malformed dataset path {input:?}: {reason}")]
    Parse {
        /// The offending input, as given.
        input: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A child was requested from a location that cannot have children.
    #[error("{from:?} location cannot have child {child:?}")]
    InvalidTransition {
        /// Kind of the parent location.
        from: LocationKind,
        /// The raw child name that was requested.
        child: String,
    },
}

impl PathError {
    pub(crate) fn parse(input: impl Into<String>, reason: &'static str) -> Self {
        Self::Parse {
            input: input.into(),
            reason,
        }
    }
}

/// Coarse error classification surfaced to callers of the file-access contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCode {
    /// The addressed object does not exist.
    NotFound,
    /// Access control rejected the operation.
    PermissionDenied,
    /// Credentials were missing or rejected.
    AuthFailed,
    /// Optimistic-concurrency check failed.
    Conflict,
    /// Transport or storage failure.
    IoError,
    /// Anything not covered above.
    Unknown,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::AuthFailed => "AUTH_FAILED",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::IoError => "IO_ERROR",
            ErrorCode::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// File-access error with contextual variants.
///
/// Every variant maps onto one [`ErrorCode`] via [`FsError::code`].
///
/// # Examples
///
/// ```rust
/// use mvsfs::{ErrorCode, FsError};
///
/// let err = FsError::NotFound { path: "'USERID.DATA'".into() };
/// assert_eq!(err.to_string(), "not found: 'USERID.DATA'");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// Path does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: String,
    },

    /// Expected something listable but found a leaf.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The path that cannot be listed.
        path: String,
    },

    /// Permission denied for operation.
    #[error("{operation}: permission denied: {path}")]
    PermissionDenied {
        /// The path where permission was denied.
        path: String,
        /// The operation that was denied.
        operation: &'static str,
    },

    /// Credentials could not be resolved or were rejected.
    #[error("authentication failed: {reason}")]
    AuthFailed {
        /// Why authentication failed.
        reason: String,
    },

    /// Concurrent modification detected.
    #[error("conflict: {path}")]
    Conflict {
        /// The path with a conflict.
        path: String,
    },

    /// The backend or host protocol cannot express this operation.
    #[error("operation not supported: {operation}")]
    NotSupported {
        /// The unsupported operation.
        operation: &'static str,
    },

    /// The service was closed before the call.
    #[error("file service is closed")]
    Closed,

    /// The transport answered with a negative status reply.
    #[error("transport reply {code}: {message}")]
    Reply {
        /// Protocol reply code (e.g. an FTP reply code).
        code: u16,
        /// Reply text.
        message: String,
    },

    /// The path does not follow the dataset grammar.
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    /// I/O error with context.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Generic backend error.
    #[error("backend error: {0}")]
    Backend(String),
}

impl FsError {
    /// Classify this error into the caller-facing [`ErrorCode`] set.
    pub fn code(&self) -> ErrorCode {
        match self {
            FsError::NotFound { .. } => ErrorCode::NotFound,
            FsError::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            FsError::AuthFailed { .. } => ErrorCode::AuthFailed,
            FsError::Conflict { .. } => ErrorCode::Conflict,
            FsError::NotADirectory { .. }
            | FsError::NotSupported { .. }
            | FsError::Closed
            | FsError::Reply { .. }
            | FsError::Io { .. } => ErrorCode::IoError,
            FsError::InvalidPath(_) | FsError::Backend(_) => ErrorCode::Unknown,
        }
    }

    /// Convert an I/O error, keeping the path and operation it happened on.
    ///
    /// `NotFound` and `PermissionDenied` kinds become the specific variants.
    pub fn from_io(error: std::io::Error, operation: &'static str, path: impl Into<String>) -> Self {
        let path = path.into();
        match error.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound { path },
            std::io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path, operation },
            _ => FsError::Io {
                operation,
                path,
                source: error,
            },
        }
    }
}

impl From<std::io::Error> for FsError {
    fn from(error: std::io::Error) -> Self {
        FsError::from_io(error, "io", String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = FsError::NotFound {
            path: "'USERID.MISSING'".into(),
        };
        assert_eq!(err.to_string(), "not found: 'USERID.MISSING'");
    }

    #[test]
    fn permission_denied_display() {
        let err = FsError::PermissionDenied {
            path: "'SYS1.PARMLIB'".into(),
            operation: "write",
        };
        assert_eq!(err.to_string(), "write: permission denied: 'SYS1.PARMLIB'");
    }

    #[test]
    fn codes_cover_every_variant() {
        assert_eq!(FsError::Closed.code(), ErrorCode::IoError);
        assert_eq!(
            FsError::AuthFailed {
                reason: "no credentials".into()
            }
            .code(),
            ErrorCode::AuthFailed
        );
        assert_eq!(
            FsError::Conflict { path: "x".into() }.code(),
            ErrorCode::Conflict
        );
        assert_eq!(
            FsError::Reply {
                code: 550,
                message: "no such dataset".into()
            }
            .code(),
            ErrorCode::IoError
        );
        assert_eq!(FsError::Backend("boom".into()).code(), ErrorCode::Unknown);
        let path_err = PathError::parse("A(", "unbalanced parentheses");
        assert_eq!(FsError::from(path_err).code(), ErrorCode::Unknown);
    }

    #[test]
    fn from_io_not_found_keeps_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = FsError::from_io(io_err, "read", "/tmp/x");
        assert!(matches!(err, FsError::NotFound { ref path } if path == "/tmp/x"));
    }

    #[test]
    fn from_io_permission_denied() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err = FsError::from(io_err);
        assert!(matches!(err, FsError::PermissionDenied { .. }));
    }

    #[test]
    fn from_io_other() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "test");
        let err = FsError::from(io_err);
        assert!(matches!(err, FsError::Io { .. }));
        assert_eq!(err.code(), ErrorCode::IoError);
    }

    #[test]
    fn error_code_display() {
        assert_eq!(ErrorCode::NotFound.to_string(), "NOT_FOUND");
        assert_eq!(ErrorCode::IoError.to_string(), "IO_ERROR");
    }

    #[test]
    fn invalid_transition_display() {
        let err = PathError::InvalidTransition {
            from: LocationKind::Member,
            child: "X".into(),
        };
        assert!(err.to_string().contains("Member"));
    }
}
