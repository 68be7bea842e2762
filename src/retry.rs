//! Transport-side retries.
//!
//! File services never retry on their own. A transport that should survive
//! flaky connections is wrapped once, at construction:
//!
//! ```rust
//! use mvsfs::{LayerExt, MemoryHost, RetryLayer, RetryPolicy};
//!
//! let transport = MemoryHost::new().layer(RetryLayer::new(RetryPolicy::default()));
//! # let _ = transport;
//! ```

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::time::Duration;

use crate::{Credentials, FsError, Layer, RemoteEntry, Transport};

/// How the wait between attempts grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BackoffStrategy {
    /// Same wait before every retry.
    #[default]
    Fixed,
    /// Wait doubles with every retry.
    Exponential,
}

impl BackoffStrategy {
    /// Parse a settings value (`FIXED`, `EXPONENTIAL`, any case).
    /// Anything else is [`BackoffStrategy::Fixed`].
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("EXPONENTIAL") {
            BackoffStrategy::Exponential
        } else {
            BackoffStrategy::Fixed
        }
    }
}

/// When and how often a failed transport call is repeated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
    strategy: BackoffStrategy,
    max_backoff: Duration,
    retry_on_timeout: bool,
    retry_on_transient_io: bool,
    retry_reply_codes: BTreeSet<u16>,
}

impl Default for RetryPolicy {
    /// Two attempts, no wait, retry on timeouts and transient I/O.
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::ZERO,
            strategy: BackoffStrategy::Fixed,
            max_backoff: Duration::ZERO,
            retry_on_timeout: true,
            retry_on_transient_io: true,
            retry_reply_codes: BTreeSet::new(),
        }
    }
}

impl RetryPolicy {
    /// A single attempt; nothing is retried.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            retry_on_timeout: false,
            retry_on_transient_io: false,
            ..Self::default()
        }
    }

    /// Total number of attempts, including the first. At least one.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Base wait and growth strategy.
    pub fn with_backoff(mut self, backoff: Duration, strategy: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self.strategy = strategy;
        self
    }

    /// Upper bound for a single wait. Zero means unbounded.
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    /// Whether timeouts are retried.
    pub fn with_retry_on_timeout(mut self, retry: bool) -> Self {
        self.retry_on_timeout = retry;
        self
    }

    /// Whether dropped or refused connections are retried.
    pub fn with_retry_on_transient_io(mut self, retry: bool) -> Self {
        self.retry_on_transient_io = retry;
        self
    }

    /// Reply codes that are retried.
    pub fn with_reply_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.retry_reply_codes = codes.into_iter().collect();
        self
    }

    /// Total number of attempts.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait before retry number `retry` (zero-based: the wait before the
    /// second attempt is `delay(0)`).
    pub fn delay(&self, retry: u32) -> Duration {
        if self.backoff.is_zero() {
            return Duration::ZERO;
        }
        let delay = match self.strategy {
            BackoffStrategy::Fixed => self.backoff,
            BackoffStrategy::Exponential => self
                .backoff
                .checked_mul(1u32.checked_shl(retry).unwrap_or(u32::MAX))
                .unwrap_or(Duration::MAX),
        };
        if !self.max_backoff.is_zero() && delay > self.max_backoff {
            self.max_backoff
        } else {
            delay
        }
    }

    /// Whether `error` is worth another attempt.
    pub fn is_retryable(&self, error: &FsError) -> bool {
        match error {
            FsError::Io { source, .. } => {
                let kind = source.kind();
                (self.retry_on_timeout && is_timeout(kind))
                    || (self.retry_on_transient_io && is_transient(kind))
            }
            FsError::Reply { code, .. } => self.retry_reply_codes.contains(code),
            _ => false,
        }
    }

    /// Whether attempt number `attempt` (one-based) that failed with `error`
    /// should be followed by another one.
    pub fn should_retry(&self, error: &FsError, attempt: u32) -> bool {
        attempt < self.max_attempts && self.is_retryable(error)
    }
}

fn is_timeout(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::TimedOut | ErrorKind::WouldBlock)
}

fn is_transient(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::ConnectionRefused
            | ErrorKind::BrokenPipe
            | ErrorKind::NotConnected
            | ErrorKind::UnexpectedEof
            | ErrorKind::HostUnreachable
            | ErrorKind::NetworkUnreachable
    )
}

/// Parse a comma-separated reply code list (`"421, 425"`). Invalid or zero
/// entries are skipped.
pub(crate) fn parse_reply_codes(raw: &str) -> BTreeSet<u16> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<u16>().ok())
        .filter(|code| *code > 0)
        .collect()
}

/// [`Layer`] that wraps a transport in [`Retrying`].
#[derive(Debug, Clone, Default)]
pub struct RetryLayer {
    policy: RetryPolicy,
}

impl RetryLayer {
    /// Layer applying `policy`.
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }
}

impl<T: Transport> Layer<T> for RetryLayer {
    type Transport = Retrying<T>;

    fn layer(self, transport: T) -> Self::Transport {
        Retrying {
            inner: transport,
            policy: self.policy,
        }
    }
}

/// Transport that repeats failed calls according to a [`RetryPolicy`].
///
/// `system_type` and `disconnect` are passed through once.
#[derive(Debug)]
pub struct Retrying<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> Retrying<T> {
    /// The wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// The active policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn run<R>(
        &self,
        operation: &'static str,
        path: &str,
        mut call: impl FnMut() -> Result<R, FsError>,
    ) -> Result<R, FsError> {
        let mut attempt = 1;
        loop {
            match call() {
                Ok(value) => return Ok(value),
                Err(err) if self.policy.should_retry(&err, attempt) => {
                    let delay = self.policy.delay(attempt - 1);
                    tracing::warn!(
                        operation,
                        path,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "transport call failed, retrying"
                    );
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                }
                Err(err) => {
                    if attempt > 1 {
                        tracing::warn!(operation, path, attempt, error = %err, "giving up");
                    }
                    return Err(err);
                }
            }
        }
    }
}

impl<T: Transport> Transport for Retrying<T> {
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, FsError> {
        self.run("read", path, || self.inner.read_bytes(path))
    }

    fn write_bytes(&self, path: &str, data: &[u8]) -> Result<(), FsError> {
        self.run("write", path, || self.inner.write_bytes(path, data))
    }

    fn list(&self, query: &str) -> Result<Vec<RemoteEntry>, FsError> {
        self.run("list", query, || self.inner.list(query))
    }

    fn delete(&self, path: &str) -> Result<bool, FsError> {
        self.run("delete", path, || self.inner.delete(path))
    }

    fn make_directory(&self, path: &str) -> Result<bool, FsError> {
        self.run("create_directory", path, || self.inner.make_directory(path))
    }

    fn login(&self, credentials: &Credentials) -> Result<(), FsError> {
        self.run("login", &credentials.host, || self.inner.login(credentials))
    }

    fn system_type(&self) -> Option<String> {
        self.inner.system_type()
    }

    fn disconnect(&self) -> Result<(), FsError> {
        self.inner.disconnect()
    }
}
