use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Editable text with a cursor counted in characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
    multiline: bool,
    max_chars: Option<usize>,
    digits_only: bool,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn multiline() -> Self {
        Self {
            multiline: true,
            ..Self::default()
        }
    }

    /// A numeric code field such as an OTP.
    pub fn code(length: usize) -> Self {
        Self {
            max_chars: Some(length),
            digits_only: true,
            ..Self::default()
        }
    }

    pub fn with_value(value: &str) -> Self {
        let mut input = Self::new();
        input.set(value);
        input
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn set(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = self.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// `*` per character, for password fields.
    pub fn masked(&self) -> String {
        "*".repeat(self.len())
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }

    pub fn insert(&mut self, c: char) -> bool {
        if c == '\n' && !self.multiline {
            return false;
        }
        if self.digits_only && !c.is_ascii_digit() {
            return false;
        }
        if self.max_chars.is_some_and(|max| self.len() >= max) {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
        true
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            self.insert(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let at = self.byte_index(self.cursor - 1);
        self.value.remove(at);
        self.cursor -= 1;
    }

    pub fn delete(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    /// Apply an editing key. Returns false for keys the input does not use,
    /// so the caller can treat them as commands.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => {
                self.insert(c);
                true
            }
            KeyCode::Enter if self.multiline => {
                self.insert('\n');
                true
            }
            KeyCode::Backspace => {
                self.backspace();
                true
            }
            KeyCode::Delete => {
                self.delete();
                true
            }
            KeyCode::Left => {
                self.move_left();
                true
            }
            KeyCode::Right => {
                self.move_right();
                true
            }
            KeyCode::Home => {
                self.move_home();
                true
            }
            KeyCode::End => {
                self.move_end();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_insert_and_backspace_mid_string() {
        let mut input = TextInput::with_value("Cels");
        input.move_left();
        input.insert('l');
        assert_eq!(input.value(), "Cells");
        assert_eq!(input.cursor(), 4);
        input.backspace();
        assert_eq!(input.value(), "Cels");
    }

    #[test]
    fn test_multibyte_characters() {
        let mut input = TextInput::with_value("Zellkern äöü");
        input.backspace();
        input.move_left();
        input.insert('ß');
        assert_eq!(input.value(), "Zellkern äßö");
        input.move_home();
        input.delete();
        assert_eq!(input.value(), "ellkern äßö");
    }

    #[test]
    fn test_code_input_accepts_six_digits_only() {
        let mut input = TextInput::code(6);
        input.insert_str("12a34-5678");
        assert_eq!(input.value(), "123456");
    }

    #[test]
    fn test_enter_only_consumed_when_multiline() {
        let mut single = TextInput::new();
        assert!(!single.handle_key(key(KeyCode::Enter)));

        let mut multi = TextInput::multiline();
        multi.insert_str("# Title");
        assert!(multi.handle_key(key(KeyCode::Enter)));
        multi.insert_str("body");
        assert_eq!(multi.value(), "# Title\nbody");
    }

    #[test]
    fn test_control_keys_left_to_caller() {
        let mut input = TextInput::new();
        assert!(!input.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)));
        assert!(input.is_empty());
        assert!(input.handle_key(KeyEvent::new(KeyCode::Char('S'), KeyModifiers::SHIFT)));
        assert_eq!(input.value(), "S");
    }

    #[test]
    fn test_masked() {
        assert_eq!(TextInput::with_value("Secret1").masked(), "*******");
    }
}
