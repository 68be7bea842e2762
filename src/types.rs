//! Core value types of the file-access contract.

use std::borrow::Cow;
use std::fmt;
use std::time::SystemTime;

use sha2::{Digest, Sha256};

use crate::FsError;

/// Character set used to turn remote bytes into editor text and back.
///
/// Mainframe settings name charsets by label (`ISO-8859-1`, `UTF-8`); see
/// [`Charset::from_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Charset {
    /// ISO-8859-1. Every byte maps to exactly one character.
    #[default]
    Latin1,
    /// UTF-8.
    Utf8,
    /// 7-bit US-ASCII.
    Ascii,
}

impl Charset {
    /// Look up a charset by its settings label, ignoring case.
    ///
    /// ```rust
    /// use mvsfs::Charset;
    ///
    /// assert_eq!(Charset::from_label("iso-8859-1"), Some(Charset::Latin1));
    /// assert_eq!(Charset::from_label("UTF8"), Some(Charset::Utf8));
    /// assert_eq!(Charset::from_label("IBM-1047"), None);
    /// ```
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "ISO-8859-1" | "ISO8859-1" | "ISO_8859_1" | "LATIN1" | "LATIN-1" | "L1" => {
                Some(Charset::Latin1)
            }
            "UTF-8" | "UTF8" => Some(Charset::Utf8),
            "US-ASCII" | "ASCII" => Some(Charset::Ascii),
            _ => None,
        }
    }

    /// Canonical label.
    pub fn label(&self) -> &'static str {
        match self {
            Charset::Latin1 => "ISO-8859-1",
            Charset::Utf8 => "UTF-8",
            Charset::Ascii => "US-ASCII",
        }
    }

    /// Decode bytes. Malformed input becomes U+FFFD; decoding never fails.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        match self {
            Charset::Latin1 => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
            Charset::Utf8 => String::from_utf8_lossy(bytes),
            Charset::Ascii => Cow::Owned(
                bytes
                    .iter()
                    .map(|&b| if b.is_ascii() { char::from(b) } else { '\u{FFFD}' })
                    .collect(),
            ),
        }
    }

    /// Encode text. Characters the charset cannot represent become `?`.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Charset::Utf8 => text.as_bytes().to_vec(),
            Charset::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
            Charset::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Hex-encoded SHA-256 of the raw stored bytes.
///
/// This is the unit of optimistic-concurrency comparison: a write is only
/// accepted when the caller's last-seen hash still matches the remote.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ContentHash(String);

impl ContentHash {
    /// Hash `bytes`.
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    /// The lowercase hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against a hash string from a caller, ignoring case and
    /// surrounding whitespace.
    pub fn matches(&self, expected: &str) -> bool {
        self.0.eq_ignore_ascii_case(expected.trim())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// File content as read from or written to a backend.
///
/// The hash is computed once at construction over `bytes` and cannot drift
/// from them: there are no setters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilePayload {
    bytes: Vec<u8>,
    charset: Charset,
    hash: ContentHash,
    is_binary: bool,
    record_structure: bool,
    editor_text: Option<String>,
}

impl FilePayload {
    /// Text payload in the given charset.
    pub fn new(bytes: Vec<u8>, charset: Charset) -> Self {
        Self::build(bytes, charset, false, false, None)
    }

    /// Binary payload. The charset is nominal.
    pub fn binary(bytes: Vec<u8>) -> Self {
        Self::build(bytes, Charset::Latin1, true, false, None)
    }

    /// Payload whose bytes carry record markers, with the text already
    /// decoded for the editor.
    pub fn record_structured(bytes: Vec<u8>, charset: Charset, editor_text: String) -> Self {
        Self::build(bytes, charset, false, true, Some(editor_text))
    }

    /// Encode `text` with `charset` into a plain text payload.
    pub fn from_text(text: &str, charset: Charset) -> Self {
        Self::new(charset.encode(text), charset)
    }

    fn build(
        bytes: Vec<u8>,
        charset: Charset,
        is_binary: bool,
        record_structure: bool,
        editor_text: Option<String>,
    ) -> Self {
        let hash = ContentHash::of(&bytes);
        Self {
            bytes,
            charset,
            hash,
            is_binary,
            record_structure,
            editor_text,
        }
    }

    /// Raw bytes as stored.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Charset of the text content.
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Content hash over [`bytes`](Self::bytes).
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    /// Whether the content should not be shown as text.
    pub fn is_binary(&self) -> bool {
        self.is_binary
    }

    /// Whether the bytes carry record markers.
    pub fn is_record_structured(&self) -> bool {
        self.record_structure
    }

    /// Text for the editor: the pre-decoded text of a record-structured
    /// payload, otherwise the bytes decoded with the payload charset.
    pub fn editor_text(&self) -> Cow<'_, str> {
        match &self.editor_text {
            Some(text) => Cow::Borrowed(text),
            None => self.charset.decode(&self.bytes),
        }
    }

    /// Size of the raw content in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` if there is no content.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Outcome of a conditional write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileWriteResult {
    /// The content was written.
    Success,
    /// The remote changed since it was read; nothing was written.
    Conflict(FilePayload),
}

impl FileWriteResult {
    /// `true` for [`FileWriteResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, FileWriteResult::Success)
    }

    /// Current remote content, if this is a conflict.
    pub fn conflict(&self) -> Option<&FilePayload> {
        match self {
            FileWriteResult::Success => None,
            FileWriteResult::Conflict(current) => Some(current),
        }
    }

    /// Turn a conflict into [`FsError::Conflict`] for callers that only
    /// care about success.
    pub fn into_result(self, path: &str) -> Result<(), FsError> {
        match self {
            FileWriteResult::Success => Ok(()),
            FileWriteResult::Conflict(_) => Err(FsError::Conflict {
                path: path.to_string(),
            }),
        }
    }
}

/// Type of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// Readable content: a file, sequential dataset or PDS member.
    File,
    /// Listable container: a directory, HLQ or partitioned dataset.
    Directory,
}

/// One entry returned by [`FileDir::list`](crate::FileDir::list).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileNode {
    /// Label for display (file name, last qualifier or member name).
    pub name: String,
    /// Absolute path usable with the same service.
    pub path: String,
    /// Entry type.
    pub kind: NodeKind,
    /// Size in bytes, when the backend knows it.
    pub size: Option<u64>,
    /// Last modification time, when the backend knows it.
    #[cfg_attr(feature = "serde", serde(with = "optional_system_time_serde"))]
    pub modified: Option<SystemTime>,
}

impl FileNode {
    /// Entry without size or time information.
    pub fn new(name: impl Into<String>, path: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
            size: None,
            modified: None,
        }
    }

    /// Returns `true` if this is a directory.
    #[inline]
    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// Serde support for `Option<SystemTime>` (when serde feature is enabled).
#[cfg(feature = "serde")]
pub(crate) mod optional_system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &Option<SystemTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        time.map(|t| {
            let duration = t.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
            (duration.as_secs(), duration.subsec_nanos())
        })
        .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SystemTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<(u64, u32)> = Deserialize::deserialize(deserializer)?;
        Ok(raw.map(|(secs, nanos)| UNIX_EPOCH + Duration::new(secs, nanos)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_labels() {
        assert_eq!(Charset::from_label("ISO-8859-1"), Some(Charset::Latin1));
        assert_eq!(Charset::from_label(" latin1 "), Some(Charset::Latin1));
        assert_eq!(Charset::from_label("utf-8"), Some(Charset::Utf8));
        assert_eq!(Charset::from_label("US-ASCII"), Some(Charset::Ascii));
        assert_eq!(Charset::from_label("EBCDIC"), None);
        assert_eq!(Charset::default(), Charset::Latin1);
        assert_eq!(Charset::Utf8.to_string(), "UTF-8");
    }

    #[test]
    fn latin1_maps_every_byte() {
        let bytes: Vec<u8> = (0..=255).collect();
        let text = Charset::Latin1.decode(&bytes);
        assert_eq!(text.chars().count(), 256);
        assert_eq!(Charset::Latin1.encode(&text), bytes);
    }

    #[test]
    fn latin1_encode_replaces_unmappable() {
        assert_eq!(Charset::Latin1.encode("a€b"), b"a?b");
        assert_eq!(Charset::Latin1.encode("é"), vec![0xE9]);
    }

    #[test]
    fn ascii_and_utf8_are_lossy_not_failing() {
        assert_eq!(Charset::Ascii.decode(&[b'A', 0xC4]), "A\u{FFFD}");
        assert_eq!(Charset::Ascii.encode("Ä"), b"?");
        assert_eq!(Charset::Utf8.decode(&[0xFF]), "\u{FFFD}");
        assert_eq!(Charset::Utf8.encode("Ä"), "Ä".as_bytes());
    }

    #[test]
    fn content_hash_is_sha256_hex() {
        let hash = ContentHash::of(b"abc");
        assert_eq!(
            hash.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert!(hash.matches("BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD"));
        assert!(!hash.matches(""));
    }

    #[test]
    fn payload_hash_follows_bytes() {
        let a = FilePayload::new(b"LINE1".to_vec(), Charset::Latin1);
        let b = FilePayload::binary(b"LINE1".to_vec());
        let c = FilePayload::new(b"LINE2".to_vec(), Charset::Latin1);
        assert_eq!(a.hash(), b.hash());
        assert_ne!(a.hash(), c.hash());
        assert!(b.is_binary());
        assert!(!a.is_binary());
    }

    #[test]
    fn payload_editor_text() {
        let plain = FilePayload::from_text("H\u{e9}llo", Charset::Latin1);
        assert_eq!(plain.bytes(), b"H\xe9llo");
        assert_eq!(plain.editor_text(), "H\u{e9}llo");

        let structured =
            FilePayload::record_structured(b"A\xff\x01".to_vec(), Charset::Latin1, "A".into());
        assert!(structured.is_record_structured());
        assert_eq!(structured.editor_text(), "A");
        assert_eq!(structured.len(), 3);
    }

    #[test]
    fn write_result_into_result() {
        assert!(FileWriteResult::Success.into_result("'A.B'").is_ok());
        let current = FilePayload::binary(vec![1]);
        let conflict = FileWriteResult::Conflict(current.clone());
        assert_eq!(conflict.conflict(), Some(&current));
        let err = conflict.into_result("'A.B'").unwrap_err();
        assert!(matches!(err, FsError::Conflict { ref path } if path == "'A.B'"));
    }

    #[test]
    fn file_node_kind() {
        let node = FileNode::new("PDS", "'USERID.PDS'", NodeKind::Directory);
        assert!(node.is_directory());
        assert_eq!(node.size, None);
    }

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Charset>();
        assert_send_sync::<ContentHash>();
        assert_send_sync::<FilePayload>();
        assert_send_sync::<FileWriteResult>();
        assert_send_sync::<FileNode>();
    }
}
