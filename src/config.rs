//! Settings consumed by the file services.
//!
//! The values mirror what the application persists: marker bytes as hex
//! strings, the charset as a label, retry tuning as plain numbers. This crate
//! only reads them; loading and saving the settings file is the caller's job.
//!
//! With the `serde` feature the structs (de)serialize with camelCase keys and
//! every field is optional:
//!
//! ```rust
//! # #[cfg(feature = "serde")] {
//! use mvsfs::Settings;
//!
//! let settings = Settings::from_json_str(r#"{ "lineEnding": "0D25", "padding": "" }"#).unwrap();
//! assert_eq!(settings.line_ending, "0D25");
//! assert_eq!(settings.file_end_marker, "FF02");
//! # }
//! ```

use std::time::Duration;

use crate::retry::parse_reply_codes;
use crate::{BackoffStrategy, Charset, RemoteMarkerConfig, RetryPolicy};

/// Codec and transport settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct Settings {
    /// Charset label of remote text.
    pub encoding: String,
    /// Record marker as hex.
    pub line_ending: String,
    /// End-of-data marker as hex; empty disables it.
    pub file_end_marker: String,
    /// Fill byte as hex; empty disables trimming.
    pub padding: String,
    /// Drop one trailing newline when decoding.
    pub remove_final_newline: bool,
    /// Force record transcoding on or off. `None` enables it for MVS hosts.
    pub record_structure: Option<bool>,
    /// Transport retry tuning.
    pub retry: RetrySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            encoding: "ISO-8859-1".to_string(),
            line_ending: "FF01".to_string(),
            file_end_marker: "FF02".to_string(),
            padding: "00".to_string(),
            remove_final_newline: true,
            record_structure: None,
            retry: RetrySettings::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing keys take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Marker configuration for the codec.
    ///
    /// `None` when the line ending is not valid hex; the codec then passes
    /// content through untouched.
    pub fn marker_config(&self) -> Option<RemoteMarkerConfig> {
        let config = RemoteMarkerConfig::from_hex(
            &self.line_ending,
            &self.file_end_marker,
            &self.padding,
            self.remove_final_newline,
        );
        if config.is_none() {
            tracing::warn!(
                line_ending = %self.line_ending,
                "line ending is not valid hex, record transcoding disabled"
            );
        }
        config
    }

    /// Charset named by [`encoding`](Self::encoding), ISO-8859-1 if unknown.
    pub fn charset(&self) -> Charset {
        Charset::from_label(&self.encoding).unwrap_or_else(|| {
            tracing::warn!(encoding = %self.encoding, "unknown charset, using ISO-8859-1");
            Charset::Latin1
        })
    }
}

/// Retry tuning for transports.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct RetrySettings {
    /// Attempts including the first.
    pub max_attempts: u32,
    /// Base wait between attempts in milliseconds.
    pub backoff_ms: u64,
    /// `FIXED` or `EXPONENTIAL`.
    pub backoff_strategy: String,
    /// Upper bound for one wait; zero means unbounded.
    pub max_backoff_ms: u64,
    /// Retry on timeouts.
    pub retry_on_timeout: bool,
    /// Retry on dropped or refused connections.
    pub retry_on_transient_io: bool,
    /// Comma-separated reply codes to retry on.
    pub retry_on_reply_codes: String,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff_ms: 0,
            backoff_strategy: "FIXED".to_string(),
            max_backoff_ms: 0,
            retry_on_timeout: true,
            retry_on_transient_io: true,
            retry_on_reply_codes: String::new(),
        }
    }
}

impl RetrySettings {
    /// Build the policy these settings describe.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_backoff(
                Duration::from_millis(self.backoff_ms),
                BackoffStrategy::from_label(&self.backoff_strategy),
            )
            .with_max_backoff(Duration::from_millis(self.max_backoff_ms))
            .with_retry_on_timeout(self.retry_on_timeout)
            .with_retry_on_transient_io(self.retry_on_transient_io)
            .with_reply_codes(parse_reply_codes(&self.retry_on_reply_codes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_give_standard_markers() {
        let config = Settings::default().marker_config().unwrap();
        assert_eq!(config.record_marker, vec![0xFF, 0x01]);
        assert_eq!(config.end_marker, Some(vec![0xFF, 0x02]));
        assert_eq!(config.padding_byte, Some(0x00));
        assert!(config.remove_final_newline);
    }

    #[test]
    fn malformed_line_ending_disables_transcoding() {
        let settings = Settings {
            line_ending: "FF0".into(),
            ..Settings::default()
        };
        assert!(settings.marker_config().is_none());
    }

    #[test]
    fn empty_end_marker_and_padding_are_disabled() {
        let settings = Settings {
            file_end_marker: String::new(),
            padding: String::new(),
            ..Settings::default()
        };
        let config = settings.marker_config().unwrap();
        assert_eq!(config.end_marker, None);
        assert_eq!(config.padding_byte, None);
    }

    #[test]
    fn unknown_charset_falls_back() {
        let settings = Settings {
            encoding: "IBM-1047".into(),
            ..Settings::default()
        };
        assert_eq!(settings.charset(), Charset::Latin1);
        let utf8 = Settings {
            encoding: "UTF-8".into(),
            ..Settings::default()
        };
        assert_eq!(utf8.charset(), Charset::Utf8);
    }

    #[test]
    fn retry_settings_build_policy() {
        let settings = RetrySettings {
            max_attempts: 4,
            backoff_ms: 50,
            backoff_strategy: "exponential".into(),
            max_backoff_ms: 120,
            retry_on_reply_codes: "421,425".into(),
            ..RetrySettings::default()
        };
        let policy = settings.policy();
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.delay(1), Duration::from_millis(100));
        assert_eq!(policy.delay(2), Duration::from_millis(120));
        assert!(policy.is_retryable(&crate::FsError::Reply {
            code: 425,
            message: String::new(),
        }));
    }

    #[test]
    fn default_retry_policy_matches_policy_default() {
        assert_eq!(RetrySettings::default().policy(), RetryPolicy::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_uses_camel_case_and_defaults() {
        let settings = Settings::from_json_str(
            r#"{ "encoding": "UTF-8", "removeFinalNewline": false, "retry": { "maxAttempts": 3 } }"#,
        )
        .unwrap();
        assert_eq!(settings.encoding, "UTF-8");
        assert!(!settings.remove_final_newline);
        assert_eq!(settings.line_ending, "FF01");
        assert_eq!(settings.retry.max_attempts, 3);
        assert_eq!(settings.retry.backoff_strategy, "FIXED");
    }
}
