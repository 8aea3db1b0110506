//! Offset units and conversion to character positions.
//!
//! Span producers count positions in different units. A Java or JavaScript
//! backend counts UTF-16 code units; Rust counts bytes, and the overlay
//! renderer splices at `char` positions.
//!
//! ```text
//!   Text: "Hi 👋 there"
//!
//!   CHAR    H  i  ␠  👋  ␠  t  h  e  r  e
//!           0  1  2  3   4  5  6  7  8  9
//!
//!   UTF-16  H  i  ␠  [ 👋 ]  ␠  t  h  e  r  e
//!           0  1  2  3    4  5  6  7  8  9  10
//!                    └2 units┘
//! ```
//!
//! An offset that points between the two halves of a surrogate pair does not
//! name a character boundary and is rejected.

use crate::config::OffsetUnit;

/// Number of UTF-16 code units in `text`.
///
/// ```
/// use annoview::offset::utf16_len;
///
/// assert_eq!(utf16_len("abc"), 3);
/// assert_eq!(utf16_len("a👋"), 3);
/// ```
#[must_use]
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Precomputed offset table for one text.
///
/// Converts offsets in a given unit to char positions in O(1).
#[derive(Debug, Clone)]
pub struct OffsetMap {
    /// `to_char[unit_offset]`, `None` inside a surrogate pair
    to_char: Vec<Option<usize>>,
    char_len: usize,
    unit: OffsetUnit,
}

impl OffsetMap {
    /// Build the table for `text`.
    #[must_use]
    pub fn new(text: &str, unit: OffsetUnit) -> Self {
        let char_len = text.chars().count();
        let to_char = match unit {
            OffsetUnit::Chars => Vec::new(),
            OffsetUnit::Utf16 => {
                let mut map = Vec::with_capacity(utf16_len(text) + 1);
                for (char_idx, ch) in text.chars().enumerate() {
                    map.push(Some(char_idx));
                    if ch.len_utf16() == 2 {
                        map.push(None);
                    }
                }
                map.push(Some(char_len));
                map
            }
        };
        Self {
            to_char,
            char_len,
            unit,
        }
    }

    /// Length of the text in this map's unit.
    #[must_use]
    pub fn len(&self) -> usize {
        match self.unit {
            OffsetUnit::Chars => self.char_len,
            OffsetUnit::Utf16 => self.to_char.len() - 1,
        }
    }

    /// True for an empty text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.char_len == 0
    }

    /// Char position of `offset`, or `None` if it is not a valid boundary.
    #[must_use]
    pub fn to_char(&self, offset: usize) -> Option<usize> {
        match self.unit {
            OffsetUnit::Chars => (offset <= self.char_len).then_some(offset),
            OffsetUnit::Utf16 => self.to_char.get(offset).copied().flatten(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_identity() {
        let map = OffsetMap::new("hello", OffsetUnit::Utf16);
        assert_eq!(map.len(), 5);
        for i in 0..=5 {
            assert_eq!(map.to_char(i), Some(i));
        }
        assert_eq!(map.to_char(6), None);
    }

    #[test]
    fn test_chars_unit() {
        let map = OffsetMap::new("Price €50", OffsetUnit::Chars);
        assert_eq!(map.len(), 9);
        assert_eq!(map.to_char(9), Some(9));
        assert_eq!(map.to_char(10), None);
    }

    #[test]
    fn test_bmp_is_one_unit() {
        // € and é are in the BMP: one UTF-16 unit each
        let text = "café €5";
        assert_eq!(utf16_len(text), text.chars().count());
        let map = OffsetMap::new(text, OffsetUnit::Utf16);
        assert_eq!(map.to_char(5), Some(5));
    }

    #[test]
    fn test_emoji_surrogate_pair() {
        let text = "Hi 👋 there";
        let map = OffsetMap::new(text, OffsetUnit::Utf16);
        assert_eq!(map.len(), 11);

        assert_eq!(map.to_char(3), Some(3));
        // between the two halves of 👋
        assert_eq!(map.to_char(4), None);
        assert_eq!(map.to_char(5), Some(4));
        assert_eq!(map.to_char(11), Some(10));
        assert_eq!(map.to_char(12), None);

        let chars = OffsetMap::new(text, OffsetUnit::Chars);
        assert_eq!(chars.len(), 10);
        assert_eq!(chars.to_char(4), Some(4));
    }

    #[test]
    fn test_empty_text() {
        for unit in [OffsetUnit::Chars, OffsetUnit::Utf16] {
            let map = OffsetMap::new("", unit);
            assert!(map.is_empty());
            assert_eq!(map.len(), 0);
            assert_eq!(map.to_char(0), Some(0));
            assert_eq!(map.to_char(1), None);
        }
    }

    #[test]
    fn test_every_char_start_is_mapped() {
        let text = "𝕏 marks 🗺️ the spot";
        let map = OffsetMap::new(text, OffsetUnit::Utf16);
        let mut units = 0;
        for (char_idx, ch) in text.chars().enumerate() {
            assert_eq!(map.to_char(units), Some(char_idx), "unit {}", units);
            if ch.len_utf16() == 2 {
                assert_eq!(map.to_char(units + 1), None);
            }
            units += ch.len_utf16();
        }
        assert_eq!(units, utf16_len(text));
        assert_eq!(map.to_char(units), Some(text.chars().count()));
    }
}
