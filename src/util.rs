//! Small shared helpers.

use std::borrow::Cow;

/// Decode raw file bytes to a string.
///
/// Tries UTF-8 first (handles a BOM automatically via encoding_rs) and falls
/// back to Windows-1252, which is common in older ebook sources and a
/// superset of ISO-8859-1. Avoids allocation when the input is valid UTF-8.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }
    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}
