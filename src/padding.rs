//! Trailing fill-byte removal.

/// Remove the trailing run of `pad` bytes.
///
/// Interior occurrences are kept: record data may legitimately contain the
/// fill byte. If every byte equals `pad` the result is empty.
///
/// ```rust
/// use mvsfs::trim_padding;
///
/// assert_eq!(trim_padding(&[b'A', 0, b'B', 0, 0], 0), &[b'A', 0, b'B']);
/// assert_eq!(trim_padding(&[0, 0], 0), &[] as &[u8]);
/// ```
pub fn trim_padding(bytes: &[u8], pad: u8) -> &[u8] {
    match bytes.iter().rposition(|&b| b != pad) {
        Some(last) => &bytes[..=last],
        None => &[],
    }
}
