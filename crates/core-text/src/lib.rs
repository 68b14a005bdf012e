//! Text primitives shared by the line mover and its hosts.
//!
//! * [`Position`] / [`Selection`]: line + column addressing with raw anchor/head order.
//! * [`TextBuffer`]: the capability a host buffer must provide for line moves.
//! * [`Buffer`]: rope-backed implementation used by the bundled host and tests.

use std::cmp::Ordering;
use thiserror::Error;

pub mod buffer;
pub mod line_ending;

pub use buffer::Buffer;
pub use line_ending::{LineEnding, NormalizedText, normalize_line_endings};

/// A position inside a buffer expressed as (line index, char column within that line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub const fn origin() -> Self {
        Self { line: 0, column: 0 }
    }

    /// Shift the line by `delta`, keeping the column. Saturates at line 0.
    pub fn offset_lines(self, delta: isize) -> Self {
        Self {
            line: self.line.saturating_add_signed(delta),
            column: self.column,
        }
    }

    /// Clamp into a document of `line_count` lines using `line_len_fn` for per-line lengths.
    pub fn clamp_to<F>(&mut self, line_count: usize, mut line_len_fn: F)
    where
        F: FnMut(usize) -> usize,
    {
        if line_count == 0 {
            *self = Self::origin();
            return;
        }
        if self.line >= line_count {
            self.line = line_count - 1;
        }
        let max_len = line_len_fn(self.line);
        if self.column > max_len {
            self.column = max_len;
        }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then(self.column.cmp(&other.column))
    }
}

/// Anchor/head pair. The anchor is where the selection was started, the head is where
/// it currently ends; a backward selection has its head before its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Selection {
    pub anchor: Position,
    pub head: Position,
}

impl Selection {
    pub const fn new(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    /// Plain cursor (anchor == head).
    pub const fn collapsed(pos: Position) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn is_backward(&self) -> bool {
        self.head < self.anchor
    }

    /// Document-ordered start.
    pub fn start(&self) -> Position {
        self.anchor.min(self.head)
    }

    /// Document-ordered end.
    pub fn end(&self) -> Position {
        self.anchor.max(self.head)
    }

    /// Both endpoints moved by `delta` lines; columns and anchor/head roles unchanged.
    pub fn shifted(&self, delta: isize) -> Self {
        Self {
            anchor: self.anchor.offset_lines(delta),
            head: self.head.offset_lines(delta),
        }
    }
}

/// Failures a buffer reports when a caller hands it malformed positions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("line {line} is past the last line {last_line}")]
    LineOutOfRange { line: usize, last_line: usize },
    #[error("column {column} is past the end of line {line} (length {len})")]
    ColumnOutOfRange {
        line: usize,
        column: usize,
        len: usize,
    },
    #[error("range start {from:?} is after range end {to:?}")]
    InvertedRange { from: Position, to: Position },
}

/// Line-addressed editing capability required by the line mover.
///
/// Implementors own the document and its selection; callers never cache content across
/// calls. `cursor_start` / `cursor_end` must be document ordered regardless of the
/// direction the selection was drawn in.
pub trait TextBuffer {
    fn first_line(&self) -> usize {
        0
    }
    fn last_line(&self) -> usize;
    /// Line content without its terminator, `None` when out of range.
    fn line(&self, index: usize) -> Option<String>;
    /// Raw selection (anchor/head as drawn).
    fn selection(&self) -> Selection;
    fn cursor_start(&self) -> Position {
        self.selection().start()
    }
    fn cursor_end(&self) -> Position {
        self.selection().end()
    }
    fn set_selection(&mut self, selection: Selection) -> Result<(), TextError>;
    /// Replace the text in `[from, to)`. Positions past the document end are clipped to it.
    fn replace_range(&mut self, text: &str, from: Position, to: Position)
    -> Result<(), TextError>;
    fn terminator(&self) -> &str {
        "\n"
    }
}

impl<T: TextBuffer + ?Sized> TextBuffer for &mut T {
    fn first_line(&self) -> usize {
        (**self).first_line()
    }
    fn last_line(&self) -> usize {
        (**self).last_line()
    }
    fn line(&self, index: usize) -> Option<String> {
        (**self).line(index)
    }
    fn selection(&self) -> Selection {
        (**self).selection()
    }
    fn cursor_start(&self) -> Position {
        (**self).cursor_start()
    }
    fn cursor_end(&self) -> Position {
        (**self).cursor_end()
    }
    fn set_selection(&mut self, selection: Selection) -> Result<(), TextError> {
        (**self).set_selection(selection)
    }
    fn replace_range(
        &mut self,
        text: &str,
        from: Position,
        to: Position,
    ) -> Result<(), TextError> {
        (**self).replace_range(text, from, to)
    }
    fn terminator(&self) -> &str {
        (**self).terminator()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_orders_by_line_then_column() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(2, 1) < Position::new(2, 3));
        assert_eq!(Position::new(4, 4).cmp(&Position::new(4, 4)), Ordering::Equal);
    }

    #[test]
    fn backward_selection_orders_start_and_end() {
        let sel = Selection::new(Position::new(3, 2), Position::new(1, 5));
        assert!(sel.is_backward());
        assert_eq!(sel.start(), Position::new(1, 5));
        assert_eq!(sel.end(), Position::new(3, 2));
    }

    #[test]
    fn shifted_keeps_roles_and_columns() {
        let sel = Selection::new(Position::new(3, 2), Position::new(1, 5));
        let up = sel.shifted(-1);
        assert_eq!(up.anchor, Position::new(2, 2));
        assert_eq!(up.head, Position::new(0, 5));
        assert!(up.is_backward());
        assert_eq!(up.shifted(1), sel);
    }

    #[test]
    fn clamp_to_pulls_position_inside_document() {
        let lens = [3usize, 1];
        let mut p = Position::new(7, 9);
        p.clamp_to(lens.len(), |l| lens[l]);
        assert_eq!(p, Position::new(1, 1));
        let mut q = Position::new(0, 2);
        q.clamp_to(lens.len(), |l| lens[l]);
        assert_eq!(q, Position::new(0, 2));
    }
}
