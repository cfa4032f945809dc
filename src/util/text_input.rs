use unicode_segmentation::UnicodeSegmentation;

use super::unicode;

/// A single-line input field: buffer plus a byte cursor that always sits
/// on a grapheme boundary. Optionally capped at a number of graphemes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    text: String,
    cursor: usize,
    max_len: Option<usize>,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input capped at `max_len` graphemes
    pub fn with_max_len(max_len: usize) -> Self {
        TextInput {
            max_len: Some(max_len),
            ..Self::default()
        }
    }

    /// Replace the contents, cursor at the end
    pub fn set(&mut self, text: &str) {
        self.text = match self.max_len {
            Some(max) => text.graphemes(true).take(max).collect(),
            None => text.to_string(),
        };
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Contents with surrounding whitespace removed
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor position in terminal cells
    pub fn cursor_col(&self) -> usize {
        unicode::byte_offset_to_display_col(&self.text, self.cursor)
    }

    pub fn insert_char(&mut self, c: char) {
        if c == '\n' || c == '\r' {
            return;
        }
        if let Some(max) = self.max_len
            && unicode::grapheme_count(&self.text) >= max
        {
            return;
        }
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Insert pasted text; newlines become spaces.
    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert_char(if c == '\n' { ' ' } else { c });
        }
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.text, self.cursor) {
            self.text.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.text, self.cursor) {
            self.text.replace_range(self.cursor..next, "");
        }
    }

    /// Delete the word before the cursor
    pub fn delete_word(&mut self) {
        let start = unicode::word_boundary_left(&self.text, self.cursor);
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.text, self.cursor) {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.text, self.cursor) {
            self.cursor = next;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.len();
    }
}
