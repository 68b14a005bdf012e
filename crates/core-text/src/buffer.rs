//! Rope-backed text buffer.

use anyhow::Result;
use ropey::Rope;
use tracing::trace;

use crate::{Position, Selection, TextBuffer, TextError};

/// A text buffer backed by a `ropey::Rope` plus the single selection it owns.
#[derive(Clone)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
    selection: Selection,
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("name", &self.name)
            .field("lines", &self.line_count())
            .field("selection", &self.selection)
            .finish()
    }
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice. The cursor starts at the origin.
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        Ok(Self {
            rope: Rope::from_str(content),
            name: name.into(),
            selection: Selection::default(),
        })
    }

    /// Total number of lines. A trailing newline yields a final empty line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Char length of a line excluding its newline; 0 when out of range.
    pub fn line_char_len(&self, idx: usize) -> usize {
        if idx >= self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(idx);
        let n = line.len_chars();
        if n > 0 && line.char(n - 1) == '\n' {
            n - 1
        } else {
            n
        }
    }

    /// Whole document as a `String`.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Every line without terminators.
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count())
            .filter_map(|idx| self.line(idx))
            .collect()
    }

    /// Absolute char index for `pos`, clipped to the document.
    fn char_index(&self, pos: Position) -> usize {
        if pos.line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        self.rope.line_to_char(pos.line) + pos.column.min(self.line_char_len(pos.line))
    }

    fn clip_selection(&mut self) {
        let count = self.line_count();
        let mut anchor = self.selection.anchor;
        let mut head = self.selection.head;
        anchor.clamp_to(count, |l| self.line_char_len(l));
        head.clamp_to(count, |l| self.line_char_len(l));
        self.selection = Selection::new(anchor, head);
    }

    fn check_position(&self, pos: Position) -> Result<(), TextError> {
        let last_line = self.last_line();
        if pos.line > last_line {
            return Err(TextError::LineOutOfRange {
                line: pos.line,
                last_line,
            });
        }
        let len = self.line_char_len(pos.line);
        if pos.column > len {
            return Err(TextError::ColumnOutOfRange {
                line: pos.line,
                column: pos.column,
                len,
            });
        }
        Ok(())
    }
}

impl TextBuffer for Buffer {
    fn last_line(&self) -> usize {
        // ropey always reports at least one line, even for empty text.
        self.rope.len_lines().saturating_sub(1)
    }

    fn line(&self, index: usize) -> Option<String> {
        if index >= self.rope.len_lines() {
            return None;
        }
        let mut s = self.rope.line(index).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        Some(s)
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) -> Result<(), TextError> {
        self.check_position(selection.anchor)?;
        self.check_position(selection.head)?;
        self.selection = selection;
        Ok(())
    }

    fn replace_range(
        &mut self,
        text: &str,
        from: Position,
        to: Position,
    ) -> Result<(), TextError> {
        let start = self.char_index(from);
        let end = self.char_index(to);
        if start > end {
            return Err(TextError::InvertedRange { from, to });
        }
        self.rope.remove(start..end);
        self.rope.insert(start, text);
        self.clip_selection();
        trace!(
            target: "text.buffer",
            buffer = self.name.as_str(),
            start,
            end,
            inserted_chars = text.chars().count(),
            lines = self.line_count(),
            "replace_range"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn create_buffer_and_read_line() {
        let b = Buffer::from_str("test", "hello\nworld").unwrap();
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.last_line(), 1);
        assert_eq!(b.line(0).as_deref(), Some("hello"));
        assert_eq!(b.line(1).as_deref(), Some("world"));
        assert_eq!(b.line(2), None);
    }

    #[test]
    fn trailing_newline_yields_empty_last_line() {
        let b = Buffer::from_str("t", "a\nb\n").unwrap();
        assert_eq!(b.lines(), vec!["a", "b", ""]);
        assert_eq!(b.line_char_len(2), 0);
    }

    #[test]
    fn carriage_return_stays_in_line_content() {
        let b = Buffer::from_str("t", "a\r\nb").unwrap();
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line(0).as_deref(), Some("a\r"));
    }

    #[test]
    fn replace_whole_lines() {
        let mut b = Buffer::from_str("t", "a\nb\nc").unwrap();
        b.replace_range("x\ny\n", Position::new(0, 0), Position::new(2, 0))
            .unwrap();
        assert_eq!(b.text(), "x\ny\nc");
    }

    #[test]
    fn replace_clips_end_past_document() {
        let mut b = Buffer::from_str("t", "a\nb").unwrap();
        b.replace_range("b\na", Position::new(0, 0), Position::new(2, 0))
            .unwrap();
        assert_eq!(b.text(), "b\na");
        assert_eq!(b.line_count(), 2);
    }

    #[test]
    fn replace_counts_columns_in_chars() {
        let mut b = Buffer::from_str("t", "héllo\nwörld").unwrap();
        b.replace_range("E", Position::new(0, 1), Position::new(0, 2))
            .unwrap();
        assert_eq!(b.line(0).as_deref(), Some("hEllo"));
        assert_eq!(b.line_char_len(1), 5);
    }

    #[test]
    fn inverted_range_rejected() {
        let mut b = Buffer::from_str("t", "a\nb").unwrap();
        let err = b
            .replace_range("", Position::new(1, 0), Position::new(0, 0))
            .unwrap_err();
        assert!(matches!(err, TextError::InvertedRange { .. }));
        assert_eq!(b.text(), "a\nb");
    }

    #[test]
    fn set_selection_validates_positions() {
        let mut b = Buffer::from_str("t", "ab\nc").unwrap();
        let ok = Selection::new(Position::new(1, 1), Position::new(0, 2));
        b.set_selection(ok).unwrap();
        assert_eq!(b.selection(), ok);
        assert_eq!(b.cursor_start(), Position::new(0, 2));
        assert_eq!(b.cursor_end(), Position::new(1, 1));

        let past_line = Selection::collapsed(Position::new(2, 0));
        assert_eq!(
            b.set_selection(past_line),
            Err(TextError::LineOutOfRange {
                line: 2,
                last_line: 1
            })
        );
        let past_col = Selection::collapsed(Position::new(1, 3));
        assert!(matches!(
            b.set_selection(past_col),
            Err(TextError::ColumnOutOfRange { len: 1, .. })
        ));
        assert_eq!(b.selection(), ok);
    }

    #[test]
    fn selection_clipped_after_shrinking_replace() {
        let mut b = Buffer::from_str("t", "abc\ndef").unwrap();
        b.set_selection(Selection::collapsed(Position::new(1, 3)))
            .unwrap();
        b.replace_range("", Position::new(0, 3), Position::new(2, 0))
            .unwrap();
        assert_eq!(b.text(), "abc");
        assert_eq!(b.selection(), Selection::collapsed(Position::new(0, 3)));
    }
}
