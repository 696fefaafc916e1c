/// Single text field with a byte-offset cursor that always sits on a char
/// boundary.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    buffer: String,
    cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        let mut input = Self::new();
        input.set(text.into());
        input
    }

    pub fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.buffer[..self.cursor].chars().next_back() {
            self.cursor -= prev.len_utf8();
            self.buffer.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.buffer[..self.cursor].chars().next_back() {
            self.cursor -= prev.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.buffer[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    pub fn set(&mut self, text: String) {
        self.buffer = text;
        self.cursor = self.buffer.len();
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn cursor_pos(&self) -> usize {
        self.cursor
    }

    /// `(row, column)` of the cursor in characters, for multi-line fields.
    pub fn cursor_row_col(&self) -> (usize, usize) {
        let before = &self.buffer[..self.cursor];
        let row = before.matches('\n').count();
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        (row, before[line_start..].chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing_at_cursor() {
        let mut input = InputState::new();
        input.insert_char('a');
        input.insert_char('c');
        input.move_left();
        input.insert_char('b');
        assert_eq!(input.as_str(), "abc");
        assert_eq!(input.cursor_pos(), 2);

        input.move_home();
        input.backspace();
        input.delete();
        assert_eq!(input.as_str(), "bc");
    }

    #[test]
    fn test_multibyte_cursor_moves() {
        let mut input = InputState::with_text("a\u{00e9}b");
        assert_eq!(input.cursor_pos(), 4);
        input.move_left();
        input.move_left();
        assert_eq!(input.cursor_pos(), 1);
        input.delete();
        assert_eq!(input.as_str(), "ab");
    }

    #[test]
    fn test_whitespace_counts_as_empty() {
        assert!(InputState::with_text("   ").is_empty());
        assert!(!InputState::with_text(" x ").is_empty());
    }

    #[test]
    fn test_cursor_row_col() {
        let mut input = InputState::with_text("first\nsec");
        assert_eq!(input.cursor_row_col(), (1, 3));
        input.move_home();
        assert_eq!(input.cursor_row_col(), (0, 0));
    }
}
