/// A single change requested by the user on the writing screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Insert(char),
    Paste(String),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

/// In-memory text of the current writing with a cursor. The cursor is a byte offset that always
/// sits on a char boundary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    cursor: usize,
}

impl TextBuffer {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Applies `edit` and tells whether the text itself changed. Cursor movement alone doesn't
    /// count as a change.
    pub fn apply(&mut self, edit: Edit) -> bool {
        match edit {
            Edit::Insert(c) => {
                self.text.insert(self.cursor, c);
                self.cursor += c.len_utf8();
                true
            }
            Edit::Paste(s) => {
                if s.is_empty() {
                    return false;
                }
                // Terminals tend to deliver pasted line breaks as \r.
                let s = s.replace("\r\n", "\n").replace('\r', "\n");
                self.text.insert_str(self.cursor, &s);
                self.cursor += s.len();
                true
            }
            Edit::Backspace => match self.previous_boundary() {
                Some(start) => {
                    self.text.replace_range(start..self.cursor, "");
                    self.cursor = start;
                    true
                }
                None => false,
            },
            Edit::Delete => match self.next_boundary() {
                Some(end) => {
                    self.text.replace_range(self.cursor..end, "");
                    true
                }
                None => false,
            },
            Edit::Left => {
                if let Some(v) = self.previous_boundary() {
                    self.cursor = v;
                }
                false
            }
            Edit::Right => {
                if let Some(v) = self.next_boundary() {
                    self.cursor = v;
                }
                false
            }
            Edit::Home => {
                self.cursor = self.text[..self.cursor].rfind('\n').map_or(0, |v| v + 1);
                false
            }
            Edit::End => {
                self.cursor = self.text[self.cursor..]
                    .find('\n')
                    .map_or(self.text.len(), |v| self.cursor + v);
                false
            }
        }
    }

    fn previous_boundary(&self) -> Option<usize> {
        self.text[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }
}

#[cfg(test)]
mod tests {
    use super::{Edit, TextBuffer};

    fn typed(text: &str) -> TextBuffer {
        let mut buffer = TextBuffer::default();
        for c in text.chars() {
            buffer.apply(Edit::Insert(c));
        }
        buffer
    }

    #[test]
    fn test_insert_and_backspace() {
        let mut buffer = typed("héllo");
        assert_eq!(buffer.as_str(), "héllo");
        assert_eq!(buffer.cursor(), "héllo".len());

        assert!(buffer.apply(Edit::Backspace));
        assert!(buffer.apply(Edit::Backspace));
        assert!(buffer.apply(Edit::Backspace));
        assert!(buffer.apply(Edit::Backspace));
        assert_eq!(buffer.as_str(), "h");
        assert!(buffer.apply(Edit::Backspace));
        assert!(!buffer.apply(Edit::Backspace));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_movement_is_not_a_change() {
        let mut buffer = typed("ab\ncd");

        assert!(!buffer.apply(Edit::Home));
        assert_eq!(buffer.cursor(), 3);
        assert!(!buffer.apply(Edit::Left));
        assert_eq!(buffer.cursor(), 2);
        assert!(!buffer.apply(Edit::Home));
        assert_eq!(buffer.cursor(), 0);
        assert!(!buffer.apply(Edit::End));
        assert_eq!(buffer.cursor(), 2);
        assert!(!buffer.apply(Edit::Right));
        assert!(!buffer.apply(Edit::Right));
        assert!(!buffer.apply(Edit::Right));
        assert!(!buffer.apply(Edit::Right));
        assert_eq!(buffer.cursor(), 5);
    }

    #[test]
    fn test_insert_in_the_middle_and_delete() {
        let mut buffer = typed("ac");
        buffer.apply(Edit::Left);
        assert!(buffer.apply(Edit::Insert('b')));
        assert_eq!(buffer.as_str(), "abc");

        assert!(buffer.apply(Edit::Delete));
        assert_eq!(buffer.as_str(), "ab");
        assert!(!buffer.apply(Edit::Delete));
    }

    #[test]
    fn test_paste_normalizes_line_breaks() {
        let mut buffer = TextBuffer::default();

        assert!(!buffer.apply(Edit::Paste(String::new())));
        assert!(buffer.apply(Edit::Paste("one\r\ntwo\rthree".into())));
        assert_eq!(buffer.as_str(), "one\ntwo\nthree");
        assert_eq!(buffer.cursor(), buffer.as_str().len());
    }
}
