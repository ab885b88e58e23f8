//! English title casing with a fixed capitalization-exception table.
//!
//! Operates on heading text that may contain inline XHTML: tags and character
//! references pass through untouched, and only the text between them is cased.

/// Words kept lowercase unless they open or close the title.
const SMALL_WORDS: [&str; 24] = [
    "a", "an", "and", "as", "at", "but", "by", "en", "for", "if", "in", "nor", "of", "on", "or",
    "per", "the", "to", "up", "v", "v.", "via", "vs", "vs.",
];

/// Title-case a string, passing inline markup through untouched.
///
/// Rules:
/// - The first and last words are always capitalized.
/// - Small words (articles, short conjunctions and prepositions) are lowered
///   elsewhere.
/// - Words containing a digit, or an uppercase letter past the first
///   character ("McTavish", "XIV", "AT&T"), are left exactly as written.
/// - `<...>` tag spans and `&...;` character references are copied verbatim.
pub fn titlecase(text: &str) -> String {
    let segments = tokenize(text);
    let word_count = segments
        .iter()
        .filter(|s| matches!(s, Segment::Word(_)))
        .count();

    let mut out = String::with_capacity(text.len());
    let mut word_index = 0;
    for segment in segments {
        match segment {
            Segment::Verbatim(s) => out.push_str(s),
            Segment::Word(w) => {
                let first = word_index == 0;
                let last = word_index + 1 == word_count;
                out.push_str(&case_word(w, first, last));
                word_index += 1;
            }
        }
    }
    out
}

enum Segment<'a> {
    /// Tags, character references, and whitespace: copied through unchanged.
    Verbatim(&'a str),
    Word(&'a str),
}

fn tokenize(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let bytes = text.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        let start = pos;
        match bytes[pos] {
            b'<' => {
                pos = text[pos..]
                    .find('>')
                    .map(|i| pos + i + 1)
                    .unwrap_or(bytes.len());
                segments.push(Segment::Verbatim(&text[start..pos]));
            }
            b'&' => {
                if let Some(len) = reference_len(&text[pos..]) {
                    pos += len;
                    segments.push(Segment::Verbatim(&text[start..pos]));
                } else {
                    // Bare ampersand: part of the surrounding word.
                    pos += 1;
                    while pos < bytes.len()
                        && !bytes[pos].is_ascii_whitespace()
                        && bytes[pos] != b'<'
                        && bytes[pos] != b'&'
                    {
                        pos += 1;
                    }
                    segments.push(Segment::Word(&text[start..pos]));
                }
            }
            c if c.is_ascii_whitespace() => {
                while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                    pos += 1;
                }
                segments.push(Segment::Verbatim(&text[start..pos]));
            }
            _ => {
                while pos < bytes.len()
                    && !bytes[pos].is_ascii_whitespace()
                    && bytes[pos] != b'<'
                    && bytes[pos] != b'&'
                {
                    pos += 1;
                }
                segments.push(Segment::Word(&text[start..pos]));
            }
        }
    }
    segments
}

/// Length of the character reference starting at `&`, if one is actually
/// present: a `;` must close it before any whitespace, tag, or second `&`.
fn reference_len(rest: &str) -> Option<usize> {
    for (i, b) in rest.bytes().enumerate().skip(1).take(32) {
        match b {
            b';' => return (i > 1).then_some(i + 1),
            b'<' | b'&' => return None,
            b if b.is_ascii_whitespace() => return None,
            _ => {}
        }
    }
    None
}

fn case_word(word: &str, first: bool, last: bool) -> String {
    // Mixed-case words and words with digits are deliberate; keep them.
    let mut chars = word.chars();
    chars.next();
    if word.chars().any(|c| c.is_ascii_digit()) || chars.any(|c| c.is_uppercase()) {
        return word.to_string();
    }

    let core: String = word
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '.')
        .collect::<String>()
        .to_lowercase();
    if !first && !last && SMALL_WORDS.contains(&core.as_str()) {
        return word.to_lowercase();
    }

    // Capitalize the first alphabetic character, lowercase the remainder.
    let mut out = String::with_capacity(word.len());
    let mut capitalized = false;
    for c in word.chars() {
        if !capitalized && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            capitalized = true;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_titles() {
        assert_eq!(titlecase("a daughter of albion"), "A Daughter of Albion");
        assert_eq!(titlecase("the fall of the house"), "The Fall of the House");
    }

    #[test]
    fn test_first_and_last_always_capitalized() {
        assert_eq!(titlecase("of mice and men of"), "Of Mice and Men Of");
        assert_eq!(titlecase("the"), "The");
    }

    #[test]
    fn test_apostrophes() {
        assert_eq!(titlecase("mother's day"), "Mother's Day");
        assert_eq!(titlecase("don\u{2019}t look back"), "Don\u{2019}t Look Back");
    }

    #[test]
    fn test_mixed_case_preserved() {
        assert_eq!(titlecase("mr. McTavish goes home"), "Mr. McTavish Goes Home");
        assert_eq!(titlecase("XIV"), "XIV");
    }

    #[test]
    fn test_inline_markup_passthrough() {
        assert_eq!(
            titlecase("the <i>spanish</i> armada"),
            "The <i>Spanish</i> Armada"
        );
        assert_eq!(
            titlecase("a tale of <abbr>st.</abbr> ives"),
            "A Tale of <abbr>St.</abbr> Ives"
        );
    }

    #[test]
    fn test_character_references_passthrough() {
        assert_eq!(titlecase("war &amp; peace"), "War &amp; Peace");
    }

    #[test]
    fn test_bare_ampersand_is_not_a_reference() {
        assert_eq!(titlecase("war & peace"), "War & Peace");
        assert_eq!(titlecase("crime & punishment; unabridged"), "Crime & Punishment; Unabridged");
        assert_eq!(titlecase("visiting AT&T headquarters"), "Visiting AT&T Headquarters");
    }

    #[test]
    fn test_whitespace_preserved() {
        assert_eq!(titlecase("a  double\tgap"), "A  Double\tGap");
    }
}
