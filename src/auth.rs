//! Credential resolution for connections.
//!
//! A file service never prompts anyone. It asks a [`CredentialsProvider`]
//! for the credentials of a [`ConnectionId`] and gets them or nothing.
//! Whether the provider reads a keyring, a settings file or opens a dialog
//! is its own business.

use std::fmt;

/// Identity of a connection: who talks to which host over what.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionId {
    /// Protocol scheme, e.g. `ftp` or `local`.
    pub scheme: String,
    /// Host name.
    pub host: String,
    /// User name, if known before resolution.
    pub username: Option<String>,
}

impl ConnectionId {
    /// Identity for `scheme://username@host`.
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, username: Option<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            username,
        }
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.username {
            Some(user) => write!(f, "{}://{}@{}", self.scheme, user, self.host),
            None => write!(f, "{}://{}", self.scheme, self.host),
        }
    }
}

/// Resolved login data.
///
/// `Debug` output never includes the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Host the credentials are valid for.
    pub host: String,
    /// User name.
    pub username: String,
    /// Password.
    pub password: String,
}

impl Credentials {
    /// Bundle host, user and password.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Source of credentials for a connection.
///
/// Implemented for closures, so a one-off provider is just
/// `|id: &ConnectionId| ...`.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn CredentialsProvider`.
pub trait CredentialsProvider: Send + Sync {
    /// Credentials for `connection`, or `None` if there are none (or the
    /// user declined to give any).
    fn resolve(&self, connection: &ConnectionId) -> Option<Credentials>;
}

impl<F> CredentialsProvider for F
where
    F: Fn(&ConnectionId) -> Option<Credentials> + Send + Sync,
{
    fn resolve(&self, connection: &ConnectionId) -> Option<Credentials> {
        self(connection)
    }
}

/// Provider holding a fixed list of credentials, matched by host and, when
/// the connection names one, by user.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    entries: Vec<Credentials>,
}

impl StaticCredentials {
    /// Empty provider; resolves nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one set of credentials.
    pub fn with(mut self, credentials: Credentials) -> Self {
        self.entries.push(credentials);
        self
    }
}

impl CredentialsProvider for StaticCredentials {
    fn resolve(&self, connection: &ConnectionId) -> Option<Credentials> {
        self.entries
            .iter()
            .find(|c| {
                c.host.eq_ignore_ascii_case(&connection.host)
                    && connection
                        .username
                        .as_deref()
                        .is_none_or(|user| user == c.username)
            })
            .cloned()
    }
}
