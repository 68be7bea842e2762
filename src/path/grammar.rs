//! Quoting and normalization rules for MVS dataset names.
//!
//! Dataset names travel to the host enclosed in exactly one pair of single
//! quotes (`'USERID.DATA.SET'`). Users and servers hand us names in every
//! other shape: unquoted, doubly quoted, with stray trailing dots. These
//! functions fold all of those into the one canonical form.
//!
//! | Input | [`normalize`] |
//! |-------|---------------|
//! | `HLQ` | `'HLQ'` |
//! | `''HLQ''` | `'HLQ'` |
//! | `HLQ.` | `'HLQ'` |
//! | `HLQ.*` | `'HLQ.*'` |
//! | `HLQ.PDS(MEM)` | `'HLQ.PDS(MEM)'` |
//! | empty, `/`, `''` | `''` |

/// Logical path of the namespace root.
pub const ROOT_PATH: &str = "''";

/// Remove surrounding whitespace and every leading/trailing single quote.
///
/// Only quoting is undone; trailing dots are left alone.
///
/// ```rust
/// assert_eq!(mvsfs::unquote("''HLQ.DATA.''"), "HLQ.DATA.");
/// assert_eq!(mvsfs::unquote("HLQ"), "HLQ");
/// ```
pub fn unquote(raw: &str) -> &str {
    raw.trim().trim_matches('\'')
}

/// Canonical body of a path: unquoted, trailing dots removed unless the
/// name ends in an explicit `.*` wildcard.
///
/// Repeats until nothing changes so that inputs like `'A.'.'` still settle.
pub(crate) fn canonical_body(raw: &str) -> &str {
    let mut current = raw;
    loop {
        let stripped = unquote(current);
        let stripped = if is_explicit_wildcard(stripped) {
            stripped
        } else {
            stripped.trim_end_matches('.')
        };
        if stripped.len() == current.len() {
            return stripped;
        }
        current = stripped;
    }
}

/// Produce the canonical single-quoted form of a path.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
///
/// ```rust
/// use mvsfs::normalize;
///
/// assert_eq!(normalize("''USERID''"), "'USERID'");
/// assert_eq!(normalize("USERID."), "'USERID'");
/// assert_eq!(normalize("USERID.*"), "'USERID.*'");
/// assert_eq!(normalize("/"), "''");
/// ```
pub fn normalize(raw: &str) -> String {
    let body = canonical_body(raw);
    if body.is_empty() || body == "/" {
        return ROOT_PATH.to_string();
    }
    quote(body)
}

/// Turn a path into the wildcard query that lists the qualifiers below it.
///
/// `'HLQ'` becomes `'HLQ.*'`; a path that already ends in `*` is only normalized.
///
/// ```rust
/// assert_eq!(mvsfs::to_wildcard_query("'USERID'"), "'USERID.*'");
/// assert_eq!(mvsfs::to_wildcard_query("USERID.*"), "'USERID.*'");
/// ```
pub fn to_wildcard_query(raw: &str) -> String {
    let body = canonical_body(raw);
    if body.is_empty() || body == "/" {
        return ROOT_PATH.to_string();
    }
    if body.ends_with('*') {
        return quote(body);
    }
    quote(&format!("{body}.*"))
}

/// First qualifier of a dataset or member path.
///
/// ```rust
/// assert_eq!(mvsfs::extract_hlq("'USERID.DATA.SET'"), "USERID");
/// assert_eq!(mvsfs::extract_hlq("USERID(MEMBER)"), "USERID");
/// ```
pub fn extract_hlq(raw: &str) -> &str {
    let body = unquote(raw);
    body.split(['.', '(']).next().unwrap_or(body)
}

/// Whether the path contains an MVS wildcard character (`*` or `%`).
pub fn has_wildcard(raw: &str) -> bool {
    unquote(raw).contains(['*', '%'])
}

fn is_explicit_wildcard(body: &str) -> bool {
    body.ends_with(".*")
}

pub(crate) fn quote(body: &str) -> String {
    format!("'{body}'")
}

/// Whether `name` is usable as a PDS member name: one to eight characters of
/// `A-Z`, `0-9`, `@`, `#`, `$`, not starting with a digit.
pub fn is_member_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.len() <= 8
        && !first.is_ascii_digit()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '#' | '$'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_quotes_bare_names() {
        assert_eq!(normalize("HLQ"), "'HLQ'");
        assert_eq!(normalize("HLQ.DATA.SET"), "'HLQ.DATA.SET'");
        assert_eq!(normalize("HLQ.PDS(MEM)"), "'HLQ.PDS(MEM)'");
    }

    #[test]
    fn normalize_collapses_repeated_quotes() {
        assert_eq!(normalize("'HLQ'"), "'HLQ'");
        assert_eq!(normalize("''HLQ''"), "'HLQ'");
        assert_eq!(normalize("'''HLQ.X'"), "'HLQ.X'");
    }

    #[test]
    fn normalize_strips_trailing_dots_but_keeps_wildcard() {
        assert_eq!(normalize("HLQ."), "'HLQ'");
        assert_eq!(normalize("'HLQ..'"), "'HLQ'");
        assert_eq!(normalize("HLQ.*"), "'HLQ.*'");
        assert_eq!(normalize("'HLQ.*'"), "'HLQ.*'");
    }

    #[test]
    fn normalize_root_forms() {
        assert_eq!(normalize(""), ROOT_PATH);
        assert_eq!(normalize("   "), ROOT_PATH);
        assert_eq!(normalize("''"), ROOT_PATH);
        assert_eq!(normalize("/"), ROOT_PATH);
        assert_eq!(normalize("."), ROOT_PATH);
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            "",
            "/",
            "''",
            "HLQ",
            "''HLQ''",
            "HLQ.",
            "HLQ.*",
            "HLQ.*.",
            "'A.'.'",
            "A'.",
            " 'USERID.PDS(MEM)' ",
            "'''",
            "X.Y.Z...",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn unquote_leaves_trailing_dots() {
        assert_eq!(unquote("'HLQ.'"), "HLQ.");
        assert_eq!(unquote("''HLQ''"), "HLQ");
        assert_eq!(unquote(""), "");
    }

    #[test]
    fn wildcard_query() {
        assert_eq!(to_wildcard_query("HLQ"), "'HLQ.*'");
        assert_eq!(to_wildcard_query("'HLQ.DATA'"), "'HLQ.DATA.*'");
        assert_eq!(to_wildcard_query("'HLQ.*'"), "'HLQ.*'");
        assert_eq!(to_wildcard_query("HLQ."), "'HLQ.*'");
        assert_eq!(to_wildcard_query(""), ROOT_PATH);
    }

    #[test]
    fn hlq_extraction() {
        assert_eq!(extract_hlq("USERID.DATA.SET"), "USERID");
        assert_eq!(extract_hlq("'USERID.PDS(MEM)'"), "USERID");
        assert_eq!(extract_hlq("USERID"), "USERID");
        assert_eq!(extract_hlq("USERID(MEM)"), "USERID");
        assert_eq!(extract_hlq("''"), "");
    }

    #[test]
    fn wildcard_detection() {
        assert!(has_wildcard("'HLQ.*'"));
        assert!(has_wildcard("HLQ.DA%A"));
        assert!(!has_wildcard("HLQ.DATA"));
    }

    #[test]
    fn member_names() {
        assert!(is_member_name("MEMBER1"));
        assert!(is_member_name("$TEMP#@"));
        assert!(!is_member_name(""));
        assert!(!is_member_name("TOOLONGNAME"));
        assert!(!is_member_name("1ABC"));
        assert!(!is_member_name("A.B"));
        assert!(!is_member_name("A(B)"));
    }
}
