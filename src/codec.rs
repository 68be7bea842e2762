//! Record-structure codec: remote record-marked bytes ↔ editor text.
//!
//! Record-oriented datasets arrive as one byte stream in which every record
//! is terminated by an out-of-band marker (typically `FF01`) and the data may
//! be closed by an end marker (typically `FF02`). Editors want `\n`-separated
//! lines instead.
//!
//! Both directions are total functions: a missing or empty marker
//! configuration means "pass through", never an error.
//!
//! ```rust
//! use mvsfs::{decode_for_editor, encode_for_remote, Charset, RemoteMarkerConfig};
//!
//! let config = RemoteMarkerConfig::new(vec![0xFF, 0x01]).with_end_marker(vec![0xFF, 0x02]);
//! let remote = encode_for_remote("A\nB", Charset::Latin1, Some(&config));
//! assert_eq!(remote, b"A\xff\x01B\xff\x01\xff\x02");
//! assert_eq!(decode_for_editor(&remote, Charset::Latin1, Some(&config)), "A\nB");
//! ```

use crate::Charset;

/// Record, end-of-data and padding markers of a remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemoteMarkerConfig {
    /// Bytes terminating each record. An empty marker disables transcoding.
    pub record_marker: Vec<u8>,
    /// Bytes closing the data, if the host writes them.
    pub end_marker: Option<Vec<u8>>,
    /// Fill byte trimmed from the end of raw content.
    pub padding_byte: Option<u8>,
    /// Drop one trailing `\n` after decoding.
    pub remove_final_newline: bool,
}

impl RemoteMarkerConfig {
    /// Config with only a record marker; final newline removal is on.
    pub fn new(record_marker: Vec<u8>) -> Self {
        Self {
            record_marker,
            end_marker: None,
            padding_byte: None,
            remove_final_newline: true,
        }
    }

    /// Set the end marker. An empty marker disables it.
    pub fn with_end_marker(mut self, end_marker: Vec<u8>) -> Self {
        self.end_marker = (!end_marker.is_empty()).then_some(end_marker);
        self
    }

    /// Set the padding byte.
    pub fn with_padding(mut self, padding_byte: u8) -> Self {
        self.padding_byte = Some(padding_byte);
        self
    }

    /// Set whether one trailing newline is removed when decoding.
    pub fn with_remove_final_newline(mut self, remove: bool) -> Self {
        self.remove_final_newline = remove;
        self
    }

    /// Build from the hex strings kept in settings.
    ///
    /// Returns `None` when `line_ending` is not valid hex, which callers treat
    /// as "no record structure". A malformed end marker or padding only
    /// disables that one marker; a padding value must be exactly one byte.
    ///
    /// ```rust
    /// use mvsfs::RemoteMarkerConfig;
    ///
    /// let config = RemoteMarkerConfig::from_hex("FF01", "FF02", "00", true).unwrap();
    /// assert_eq!(config.record_marker, vec![0xFF, 0x01]);
    /// assert_eq!(config.padding_byte, Some(0x00));
    /// assert!(RemoteMarkerConfig::from_hex("F", "", "", true).is_none());
    /// ```
    pub fn from_hex(
        line_ending: &str,
        file_end_marker: &str,
        padding: &str,
        remove_final_newline: bool,
    ) -> Option<Self> {
        let record_marker = parse_hex(line_ending)?;
        let end_marker = parse_hex(file_end_marker);
        Some(Self {
            record_marker,
            end_marker,
            padding_byte: parse_padding(padding),
            remove_final_newline,
        })
    }

    fn is_active(&self) -> bool {
        !self.record_marker.is_empty()
    }
}

/// Turn remote bytes into editor text.
///
/// In order: every record marker becomes `\n` (left to right, non-overlapping),
/// a trailing end marker is dropped, one final `\n` is dropped when
/// configured, and the rest is decoded with `charset`.
///
/// Without an active config the bytes are only decoded.
pub fn decode_for_editor(
    remote: &[u8],
    charset: Charset,
    config: Option<&RemoteMarkerConfig>,
) -> String {
    let Some(config) = config.filter(|c| c.is_active()) else {
        return charset.decode(remote).into_owned();
    };

    let mut bytes = replace_all(remote, &config.record_marker, b"\n");
    if let Some(end) = config.end_marker.as_deref().filter(|m| !m.is_empty()) {
        if bytes.ends_with(end) {
            bytes.truncate(bytes.len() - end.len());
        }
    }
    if config.remove_final_newline && bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    charset.decode(&bytes).into_owned()
}

/// Turn editor text into remote bytes.
///
/// The text is split on `\n` keeping a trailing empty segment, so
/// `"A\n"` yields two records. Each segment is encoded and followed by the
/// record marker; the end marker, if any, closes the data.
///
/// Without an active config the text is only encoded.
pub fn encode_for_remote(text: &str, charset: Charset, config: Option<&RemoteMarkerConfig>) -> Vec<u8> {
    let Some(config) = config.filter(|c| c.is_active()) else {
        return charset.encode(text);
    };

    let mut out = Vec::with_capacity(text.len() + config.record_marker.len() * 4);
    for segment in text.split('\n') {
        out.extend_from_slice(&charset.encode(segment));
        out.extend_from_slice(&config.record_marker);
    }
    if let Some(end) = &config.end_marker {
        out.extend_from_slice(end);
    }
    out
}

/// Parse a hex string such as `"FF01"` into bytes.
///
/// Whitespace is ignored and case does not matter. Empty, odd-length or
/// non-hex input yields `None`; this function never fails loudly.
///
/// ```rust
/// use mvsfs::parse_hex;
///
/// assert_eq!(parse_hex("FF01"), Some(vec![0xFF, 0x01]));
/// assert_eq!(parse_hex("ff 02"), Some(vec![0xFF, 0x02]));
/// assert_eq!(parse_hex("F"), None);
/// assert_eq!(parse_hex("   "), None);
/// ```
pub fn parse_hex(raw: &str) -> Option<Vec<u8>> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() || compact.len() % 2 != 0 {
        return None;
    }
    hex::decode(compact).ok()
}

/// Parse a single fill byte from hex; anything but exactly one byte is `None`.
pub(crate) fn parse_padding(raw: &str) -> Option<u8> {
    match parse_hex(raw)?.as_slice() {
        [byte] => Some(*byte),
        _ => None,
    }
}

fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    if needle.is_empty() {
        return haystack.to_vec();
    }
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(needle) {
            out.extend_from_slice(replacement);
            i += needle.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}
