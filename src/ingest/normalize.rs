// Expected on-disk filename derived from a sidecar title

use crate::constants::{MAX_TITLE_FILENAME_CHARS, UNSAFE_TITLE_CHARS, UNSAFE_TITLE_REPLACEMENT};

/// Derive the filename the export tool would have given the media file titled `title`.
///
/// Apostrophes and semicolons become underscores, then the base is cut so that
/// base + extension fits in 51 characters. The extension is never shortened.
pub fn expected_image_filename(title: &str) -> String {
    let sanitized: String = title
        .chars()
        .map(|c| if UNSAFE_TITLE_CHARS.contains(&c) { UNSAFE_TITLE_REPLACEMENT } else { c })
        .collect();

    let (base, ext) = split_extension(&sanitized);
    let keep = MAX_TITLE_FILENAME_CHARS.saturating_sub(ext.chars().count());
    let truncated: String = base.chars().take(keep).collect();

    format!("{}{}", truncated, ext)
}

/// Split at the last dot; the extension keeps its dot.
/// Leading dots never start an extension (".hidden" has none).
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if name[..idx].chars().any(|c| c != '.') => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_title_unchanged() {
        assert_eq!(expected_image_filename("Sunset Beach.jpg"), "Sunset Beach.jpg");
    }

    #[test]
    fn test_unsafe_chars_replaced() {
        let name = expected_image_filename("Bob's party; night.jpg");
        assert_eq!(name, "Bob_s party_ night.jpg");
        assert!(!name.contains('\''));
        assert!(!name.contains(';'));
    }

    #[test]
    fn test_long_title_truncated_to_limit() {
        let title = format!("{}.jpeg", "x".repeat(80));
        let name = expected_image_filename(&title);
        assert_eq!(name.chars().count(), 51);
        assert!(name.ends_with(".jpeg"));
        assert_eq!(name, format!("{}.jpeg", "x".repeat(46)));
    }

    #[test]
    fn test_exact_limit_kept() {
        let title = format!("{}.jpg", "a".repeat(47));
        assert_eq!(expected_image_filename(&title), title);
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let title = format!("{}.jpg", "é".repeat(60));
        let name = expected_image_filename(&title);
        assert_eq!(name.chars().count(), 51);
        assert_eq!(name, format!("{}.jpg", "é".repeat(47)));
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a.b.jpg"), ("a.b", ".jpg"));
        assert_eq!(split_extension("noext"), ("noext", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
        assert_eq!(split_extension("..dots.png"), ("..dots", ".png"));
    }

    #[test]
    fn test_title_without_extension_truncated() {
        let title = "y".repeat(70);
        assert_eq!(expected_image_filename(&title), "y".repeat(51));
    }
}
