//! UTF-16 offset helpers.
//!
//! Text offsets throughout the editor count UTF-16 code units, while Rust
//! strings are indexed by UTF-8 bytes. These helpers translate between the
//! two.

/// Length of `s` in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Translate a UTF-16 offset into a byte index into `s`.
///
/// Returns `None` if the offset is past the end of the string or falls
/// between the two halves of a surrogate pair.
pub fn byte_index(s: &str, offset: usize) -> Option<usize> {
    let mut units = 0;
    for (i, ch) in s.char_indices() {
        if units == offset {
            return Some(i);
        }
        if units > offset {
            return None;
        }
        units += ch.len_utf16();
    }
    (units == offset).then_some(s.len())
}
