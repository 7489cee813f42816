use crate::config::{DEFAULT_MESSAGE_MAX_LEN, DEFAULT_NICKNAME_MAX_LEN};

/// Draft text with a cursor. Positions and the length cap count chars, not
/// bytes.
#[derive(Debug, Clone)]
pub struct Composer {
    buffer: Vec<char>,
    cursor_position: usize,
    max_len: usize,
    multiline: bool,
}

impl Composer {
    pub fn new(max_len: usize, multiline: bool) -> Self {
        Self {
            buffer: Vec::new(),
            cursor_position: 0,
            max_len,
            multiline,
        }
    }

    pub fn nickname() -> Self {
        Self::new(DEFAULT_NICKNAME_MAX_LEN, false)
    }

    pub fn message() -> Self {
        Self::new(DEFAULT_MESSAGE_MAX_LEN, true)
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self.truncate_to_cap();
        self
    }

    pub fn text(&self) -> String {
        self.buffer.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    /// Zero-based (line, column) of the cursor.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before = &self.buffer[..self.cursor_position];
        let line = before.iter().filter(|&&c| c == '\n').count();
        let col = before.iter().rev().take_while(|&&c| c != '\n').count();
        (line, col)
    }

    /// Returns false when the char was refused (cap reached, or a newline in
    /// a single-line composer).
    pub fn insert_char(&mut self, c: char) -> bool {
        if c == '\n' && !self.multiline {
            return false;
        }
        if c.is_control() && c != '\n' {
            return false;
        }
        if self.buffer.len() >= self.max_len {
            return false;
        }
        self.buffer.insert(self.cursor_position, c);
        self.cursor_position += 1;
        true
    }

    pub fn insert_newline(&mut self) -> bool {
        self.insert_char('\n')
    }

    /// Inserts as much of `s` as fits. Returns the number of chars taken.
    /// `\r\n` and a lone `\r` both count as one line break.
    pub fn insert_str(&mut self, s: &str) -> usize {
        let mut inserted = 0;
        let mut after_cr = false;
        for c in s.chars() {
            if c == '\n' && after_cr {
                after_cr = false;
                continue;
            }
            after_cr = c == '\r';
            let c = if c == '\r' { '\n' } else { c };
            if c == '\n' && !self.multiline {
                continue;
            }
            if self.insert_char(c) {
                inserted += 1;
            } else if self.buffer.len() >= self.max_len {
                break;
            }
        }
        inserted
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            self.buffer.remove(self.cursor_position);
        }
    }

    pub fn delete_char_forward(&mut self) {
        if self.cursor_position < self.buffer.len() {
            self.buffer.remove(self.cursor_position);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.buffer.len() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_start(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor_position = 0;
    }

    pub fn set_text(&mut self, text: &str) {
        self.clear();
        self.insert_str(text);
    }

    /// True when there is something other than whitespace to send.
    pub fn can_submit(&self) -> bool {
        self.buffer.iter().any(|c| !c.is_whitespace())
    }

    /// Takes the trimmed draft and clears it. Blank drafts are left alone and
    /// yield `None`.
    pub fn submit(&mut self) -> Option<String> {
        if !self.can_submit() {
            return None;
        }
        let text = self.text().trim().to_string();
        self.clear();
        Some(text)
    }

    fn truncate_to_cap(&mut self) {
        self.buffer.truncate(self.max_len);
        self.cursor_position = self.cursor_position.min(self.buffer.len());
    }
}
