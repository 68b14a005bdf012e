//! Block move algorithm over any [`TextBuffer`].
//!
//! A move swaps the selected block (every line touched by the selection, or the cursor
//! line) with its one neighbour above or below using a single `replace_range`, then
//! re-applies the pre-move selection shifted by one line. Content is always read fresh
//! from the buffer; nothing is cached between calls.
//!
//! Bottom edge: the replaced range ends at `(dest + 1, 0)`, which is past the document
//! when `dest` is the last line. The composed text then carries one terminator too many,
//! so it is stripped before the replace or the document would grow an empty line.

use core_text::{Position, Selection, TextBuffer, TextError};
use tracing::{debug, trace};

use crate::{MoveDirection, MoveError};

/// Move the selected block one line up. `Ok(false)` when already at the top.
pub fn move_lines_up<B: TextBuffer + ?Sized>(buffer: &mut B) -> Result<bool, MoveError> {
    move_lines(buffer, MoveDirection::Up)
}

/// Move the selected block one line down. `Ok(false)` when already at the bottom.
pub fn move_lines_down<B: TextBuffer + ?Sized>(buffer: &mut B) -> Result<bool, MoveError> {
    move_lines(buffer, MoveDirection::Down)
}

pub fn move_lines<B: TextBuffer + ?Sized>(
    buffer: &mut B,
    direction: MoveDirection,
) -> Result<bool, MoveError> {
    let mut ops = LineOps { buffer };
    let (first, last) = ops.selected_span()?;
    let terminator = ops.buffer.terminator().to_string();
    let selection = ops.buffer.selection();

    let (src, dest, content) = match direction {
        MoveDirection::Up => {
            if first <= ops.buffer.first_line() {
                trace!(target: "actions.line_mover", first, "move_up_at_top");
                return Ok(false);
            }
            let above = first - 1;
            let content_above = ops.line_content(above);
            let block = ops.selected_lines_content(first, last);
            (above, last, format!("{block}{content_above}{terminator}"))
        }
        MoveDirection::Down => {
            if last >= ops.buffer.last_line() {
                trace!(target: "actions.line_mover", last, "move_down_at_bottom");
                return Ok(false);
            }
            let below = last + 1;
            let content_below = ops.line_content(below);
            let block = ops.selected_lines_content(first, last);
            (first, below, format!("{content_below}{terminator}{block}"))
        }
    };

    ops.replace_lines(src, dest, content)?;
    ops.update_cursor(selection, direction)?;
    debug!(
        target: "actions.line_mover",
        direction = direction.as_str(),
        first,
        last,
        backward = selection.is_backward(),
        "lines_moved"
    );
    Ok(true)
}

struct LineOps<'a, B: TextBuffer + ?Sized> {
    buffer: &'a mut B,
}

impl<B: TextBuffer + ?Sized> LineOps<'_, B> {
    fn first_selected_line(&self) -> usize {
        self.buffer.cursor_start().line
    }

    fn last_selected_line(&self) -> usize {
        self.buffer.cursor_end().line
    }

    fn selected_span(&self) -> Result<(usize, usize), MoveError> {
        let first = self.first_selected_line();
        let last = self.last_selected_line();
        if first > last {
            return Err(MoveError::InvertedSelection { first, last });
        }
        Ok((first, last))
    }

    /// Line text without terminator, empty outside the document. Only used for the
    /// block itself and its one neighbour.
    fn line_content(&self, index: usize) -> String {
        if index < self.buffer.first_line() || index > self.buffer.last_line() {
            return String::new();
        }
        self.buffer.line(index).unwrap_or_default()
    }

    /// Block text with a terminator after every line, the last one included.
    fn selected_lines_content(&self, first: usize, last: usize) -> String {
        let terminator = self.buffer.terminator();
        let mut content = String::new();
        for index in first..=last {
            content.push_str(&self.line_content(index));
            content.push_str(terminator);
        }
        content
    }

    /// Replace lines `src..=dest` with terminator-delimited `content`.
    fn replace_lines(
        &mut self,
        src: usize,
        dest: usize,
        mut content: String,
    ) -> Result<(), TextError> {
        if dest == self.buffer.last_line() {
            let terminator = self.buffer.terminator();
            if content.ends_with(terminator) {
                content.truncate(content.len() - terminator.len());
            }
        }
        self.buffer
            .replace_range(&content, Position::new(src, 0), Position::new(dest + 1, 0))
    }

    /// Re-apply the raw pre-move selection shifted with the block.
    fn update_cursor(
        &mut self,
        selection: Selection,
        direction: MoveDirection,
    ) -> Result<(), TextError> {
        self.buffer.set_selection(selection.shifted(direction.delta()))
    }
}
