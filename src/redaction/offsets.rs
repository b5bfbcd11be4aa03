// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Code-point offset arithmetic
// Regex matches report byte offsets; entities carry code-point offsets

/// Char boundary table for one text
pub struct CharIndex<'a> {
    text: &'a str,
    // Byte offset of every char, followed by text.len()
    boundaries: Vec<usize>,
}

impl<'a> CharIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(byte, _)| byte).collect();
        boundaries.push(text.len());
        Self { text, boundaries }
    }

    /// Number of code points in the text
    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Code-point offset of a byte offset that lies on a char boundary
    pub fn char_offset(&self, byte: usize) -> usize {
        match self.boundaries.binary_search(&byte) {
            Ok(idx) => idx,
            Err(idx) => idx,
        }
    }

    /// Byte offset of a code-point offset, `None` past the end
    pub fn byte_offset(&self, char_offset: usize) -> Option<usize> {
        self.boundaries.get(char_offset).copied()
    }

    /// Byte range covering `length` code points starting at `start`
    pub fn byte_range(&self, start: usize, length: usize) -> Option<std::ops::Range<usize>> {
        let end = start.checked_add(length)?;
        Some(self.byte_offset(start)?..self.byte_offset(end)?)
    }

    /// Substring covering `length` code points starting at `start`
    pub fn slice(&self, start: usize, length: usize) -> Option<&'a str> {
        self.byte_range(start, length).map(|range| &self.text[range])
    }
}

/// Code-point count of a string
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_offsets() {
        let index = CharIndex::new("hello");
        assert_eq!(index.char_len(), 5);
        assert_eq!(index.char_offset(3), 3);
        assert_eq!(index.byte_offset(5), Some(5));
        assert_eq!(index.byte_offset(6), None);
    }

    #[test]
    fn test_multibyte_offsets() {
        // 'é' is 2 bytes, '🚀' is 4 bytes
        let text = "é🚀ab";
        let index = CharIndex::new(text);
        assert_eq!(index.char_len(), 4);
        assert_eq!(index.char_offset(2), 1);
        assert_eq!(index.char_offset(6), 2);
        assert_eq!(index.byte_range(1, 2), Some(2..7));
        assert_eq!(index.slice(1, 2), Some("🚀a"));
        assert_eq!(index.slice(3, 2), None);
    }

    #[test]
    fn test_empty_text() {
        let index = CharIndex::new("");
        assert_eq!(index.char_len(), 0);
        assert_eq!(index.slice(0, 0), Some(""));
    }
}
