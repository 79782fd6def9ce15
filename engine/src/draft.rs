//! Single-line text buffer for name and date entry.

use unicode_segmentation::UnicodeSegmentation;

/// Handles text editing with proper Unicode grapheme cluster support.
///
/// `cursor` counts graphemes, not bytes. Input beyond `limit` graphemes is
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftInput {
    text: String,
    cursor: usize,
    limit: usize,
}

impl DraftInput {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            limit,
        }
    }

    /// Pre-filled buffer with the cursor at the end.
    #[must_use]
    pub fn with_text(limit: usize, text: &str) -> Self {
        let mut draft = Self::new(limit);
        draft.enter_text(text);
        draft
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        let cursor_moved_right = self.cursor.saturating_add(1);
        self.cursor = self.clamp_cursor(cursor_moved_right);
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.grapheme_count();
    }

    pub fn enter_char(&mut self, new_char: char) {
        if new_char.is_control() || self.grapheme_count() >= self.limit {
            return;
        }
        let index = self.byte_index();
        self.text.insert(index, new_char);
        self.move_cursor_right();
    }

    /// Insert pasted text at the cursor; line breaks become spaces.
    pub fn enter_text(&mut self, text: &str) {
        let room = self.limit.saturating_sub(self.grapheme_count());
        if room == 0 || text.is_empty() {
            return;
        }
        let cleaned: String = text
            .graphemes(true)
            .map(|g| if g.chars().any(char::is_control) { " " } else { g })
            .take(room)
            .collect();
        let index = self.byte_index();
        self.text.insert_str(index, &cleaned);
        let inserted = cleaned.graphemes(true).count();
        self.cursor = self.clamp_cursor(self.cursor.saturating_add(inserted));
    }

    pub fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }

        let start = self.byte_index_at(self.cursor - 1);
        let end = self.byte_index_at(self.cursor);
        self.text.replace_range(start..end, "");
        self.move_cursor_left();
    }

    pub fn delete_char_forward(&mut self) {
        if self.cursor >= self.grapheme_count() {
            return;
        }

        let start = self.byte_index_at(self.cursor);
        let end = self.byte_index_at(self.cursor + 1);
        self.text.replace_range(start..end, "");
    }

    #[must_use]
    pub fn grapheme_count(&self) -> usize {
        self.text.graphemes(true).count()
    }

    #[must_use]
    pub fn byte_index(&self) -> usize {
        self.byte_index_at(self.cursor)
    }

    fn byte_index_at(&self, grapheme_index: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(grapheme_index)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn clamp_cursor(&self, new_cursor_pos: usize) -> usize {
        new_cursor_pos.min(self.grapheme_count())
    }
}
