/// Single-line text field with a cursor counted in characters.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    buffer: String,
    cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_index)
            .map(|(idx, _)| idx)
            .unwrap_or(self.buffer.len())
    }

    fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        let idx = self.byte_index(self.cursor);
        self.buffer.insert(idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let idx = self.byte_index(self.cursor);
        self.buffer.remove(idx);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let idx = self.byte_index(self.cursor);
            self.buffer.remove(idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Replace the contents and put the cursor at the end
    pub fn set(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.cursor = self.char_count();
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
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputState {
        let mut input = InputState::new();
        text.chars().for_each(|c| input.insert_char(c));
        input
    }

    #[test]
    fn test_typing_appends() {
        let input = typed("topic");
        assert_eq!(input.as_str(), "topic");
        assert_eq!(input.cursor_pos(), 5);
    }

    #[test]
    fn test_insert_in_middle() {
        let mut input = typed("fix/bg");
        input.move_left();
        input.insert_char('u');
        assert_eq!(input.as_str(), "fix/bug");
        assert_eq!(input.cursor_pos(), 6);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = typed("añb");
        input.move_left();
        input.backspace();
        assert_eq!(input.as_str(), "ab");
        assert_eq!(input.cursor_pos(), 1);
        input.delete();
        assert_eq!(input.as_str(), "a");
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut input = typed("ab");
        input.move_right();
        assert_eq!(input.cursor_pos(), 2);
        input.move_home();
        input.move_left();
        assert_eq!(input.cursor_pos(), 0);
        input.backspace();
        assert_eq!(input.as_str(), "ab");
        input.move_end();
        input.delete();
        assert_eq!(input.as_str(), "ab");
    }

    #[test]
    fn test_set_and_clear() {
        let mut input = InputState::new();
        input.set("feature");
        assert_eq!(input.cursor_pos(), 7);
        input.clear();
        assert_eq!(input.as_str(), "");
        assert_eq!(input.cursor_pos(), 0);
    }

    #[test]
    fn test_whitespace_only_counts_as_empty() {
        assert!(typed("   ").is_empty());
        assert!(!typed(" a ").is_empty());
    }
}
