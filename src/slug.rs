//! URL-safe slug generation for section identifiers.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Convert a title string into a lowercase, hyphen-delimited, ASCII-only slug.
///
/// The pipeline, in order:
///
/// 1. Canonical-decompose and drop combining marks ("é" becomes "e").
/// 2. Trim surrounding whitespace.
/// 3. Lowercase.
/// 4. Delete apostrophes (straight and curly) outright.
/// 5. Delete double quotes (straight and curly) outright.
/// 6. Replace every remaining non-ASCII-alphanumeric character with a space.
/// 7. Collapse each maximal whitespace run into a single hyphen.
/// 8. Strip trailing hyphens (leading hyphens are kept).
///
/// Slugifying an already-slugified string is a no-op.
///
/// # Examples
///
/// ```
/// use entitle::slugify;
///
/// assert_eq!(slugify("Mother's Day"), "mothers-day");
/// assert_eq!(slugify("Café — Part I"), "cafe-part-i");
/// ```
pub fn slugify(text: &str) -> String {
    let folded: String = text.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let lowered = folded.trim().to_lowercase();

    let mut cleaned = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        match c {
            '\'' | '\u{2018}' | '\u{2019}' => {}
            '"' | '\u{201C}' | '\u{201D}' => {}
            c if c.is_ascii_alphanumeric() => cleaned.push(c),
            _ => cleaned.push(' '),
        }
    }

    let mut slug = String::with_capacity(cleaned.len());
    let mut in_gap = false;
    for c in cleaned.chars() {
        if c == ' ' {
            in_gap = true;
        } else {
            if in_gap {
                slug.push('-');
                in_gap = false;
            }
            slug.push(c);
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_basic() {
        assert_eq!(slugify("A Daughter of Albion"), "a-daughter-of-albion");
        assert_eq!(slugify("Chapter 7"), "chapter-7");
    }

    #[test]
    fn test_apostrophes_deleted() {
        assert_eq!(slugify("Mother's Day"), "mothers-day");
        assert_eq!(slugify("Mother\u{2019}s Day"), "mothers-day");
    }

    #[test]
    fn test_quotes_deleted() {
        assert_eq!(slugify("The \u{201C}Hero\u{201D} Returns"), "the-hero-returns");
        assert_eq!(slugify(r#"Say "Cheese""#), "say-cheese");
    }

    #[test]
    fn test_diacritics_folded() {
        assert_eq!(slugify("Café — Part I"), "cafe-part-i");
        assert_eq!(slugify("Brontë"), "bronte");
    }

    #[test]
    fn test_empty_interior_segment_collapses() {
        assert_eq!(slugify("Chapter--14"), "chapter-14");
    }

    #[test]
    fn test_leading_hyphen_kept_trailing_stripped() {
        assert_eq!(slugify("-2-14"), "-2-14");
        assert_eq!(slugify("part-3---"), "part-3");
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("\u{2014}\u{2014}"), "");
    }

    proptest! {
        #[test]
        fn slugify_is_idempotent(s in "\\PC{0,64}") {
            let once = slugify(&s);
            prop_assert_eq!(slugify(&once), once);
        }

        #[test]
        fn slug_alphabet_is_restricted(s in "\\PC{0,64}") {
            let slug = slugify(&s);
            prop_assert!(
                slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            );
            prop_assert!(!slug.ends_with('-'));
        }
    }
}
