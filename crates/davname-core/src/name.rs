//! Display-name derivation from resource URLs.
//!
//! A display name is the last path segment of a resource URL, ignoring the
//! trailing slash of a collection and dropping the rightmost extension:
//!
//! | URL                | Name      |
//! |--------------------|-----------|
//! | `/`                | `""`      |
//! | `/reports/`        | `reports` |
//! | `/reports/q3.pdf`  | `q3`      |
//! | `/a%20b.html`      | `a b`     |
//!
//! Slash and extension trimming operate on the raw, still-escaped URL text.
//! Percent-decoding is applied to the trimmed segment only, so an escaped
//! `%2F` or `%2E` never influences where the name is cut.

use percent_encoding::percent_decode_str;
use std::borrow::Cow;

/// Derive the display name for a resource URL.
///
/// Total over all inputs: empty strings, slash-only paths and malformed
/// percent-escapes all produce a string. See [`unescape`] for how bad
/// escapes are handled.
pub fn derive_name(url: &str) -> String {
    let name = strip_extension(candidate(url));
    unescape(name).into_owned()
}

/// Select the raw (still-escaped) segment that names the resource.
///
/// - No `/` at all: the whole input.
/// - Trailing `/`: the segment before it, or everything before it when no
///   other `/` exists.
/// - Otherwise: everything after the last `/`.
pub fn candidate(url: &str) -> &str {
    match url.rfind('/') {
        None => url,
        Some(end) if end + 1 == url.len() => {
            let remainder = &url[..end];
            match remainder.rfind('/') {
                None => remainder,
                Some(begin) => &remainder[begin + 1..],
            }
        }
        Some(end) => &url[end + 1..],
    }
}

/// Truncate `name` at its rightmost `.`.
///
/// There is no list of known extensions: `release.notes` becomes `release`
/// and `.profile` becomes the empty string.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    }
}

/// Percent-decode a trimmed name.
///
/// `+` is left alone. A `%` not followed by two hex digits is passed through
/// literally. If the decoded bytes are not valid UTF-8, or decode to a NUL
/// character (not representable in XML character data), the raw input is
/// returned unmodified.
pub fn unescape(name: &str) -> Cow<'_, str> {
    match percent_decode_str(name).decode_utf8() {
        Ok(decoded) if !decoded.contains('\0') => decoded,
        _ => Cow::Borrowed(name),
    }
}


/// Property-based tests using proptest.
#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Never panics, whatever the input.
        #[test]
        fn derive_name_is_total(url in any::<String>()) {
            let _ = derive_name(&url);
        }

        /// Without a slash, only a trailing extension is removed.
        #[test]
        fn no_slash_strips_only_extension(stem in "[a-zA-Z0-9_-]{0,12}", ext in proptest::option::of("[a-z0-9]{0,4}")) {
            let url = match &ext {
                Some(ext) => format!("{stem}.{ext}"),
                None => stem.clone(),
            };
            prop_assert_eq!(derive_name(&url), stem);
        }

        /// Unescaped names never contain a separator.
        #[test]
        fn plain_names_have_no_separators(url in "[a-z/._-]{0,32}") {
            prop_assert!(!derive_name(&url).contains('/'));
        }

        /// Only the rightmost dot of the segment is cut; inner dots stay.
        #[test]
        fn only_rightmost_dot_is_removed(url in "[a-z/._-]{0,32}") {
            let name = derive_name(&url);
            let raw = candidate(&url);
            prop_assert_eq!(&name, strip_extension(raw));
            let dots = raw.matches('.').count();
            prop_assert_eq!(name.matches('.').count(), dots.saturating_sub(1));
        }

        /// A collection and its trailing-slash-free form name the same thing,
        /// as long as the segment has no extension.
        #[test]
        fn trailing_slash_is_ignored(segments in prop::collection::vec("[a-z0-9_-]{1,8}", 1..5)) {
            let path = format!("/{}", segments.join("/"));
            let collection = format!("{path}/");
            prop_assert_eq!(derive_name(&path), derive_name(&collection));
            prop_assert_eq!(derive_name(&collection), segments.last().cloned().unwrap_or_default());
        }
    }
}
