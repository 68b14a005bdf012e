//! Line move actions.
//!
//! [`moves`] holds the buffer-level algorithm (swap the selected block with the line
//! above or below, then re-anchor the selection). [`LineMover`] binds that algorithm to
//! one shared buffer and exposes it as the `line-mover:up` / `line-mover:down` commands.

use core_text::TextError;
use thiserror::Error;

pub mod line_mover;
pub mod moves;

pub use line_mover::{LineMover, SharedBuffer};
pub use moves::{move_lines, move_lines_down, move_lines_up};

/// Command namespace shared by every command this crate registers.
pub const NAMESPACE: &str = "line-mover";
pub const MOVE_UP_COMMAND: &str = "line-mover:up";
pub const MOVE_DOWN_COMMAND: &str = "line-mover:down";

/// Vertical direction of a block move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    /// Line delta applied to the selection after the move.
    pub const fn delta(self) -> isize {
        match self {
            MoveDirection::Up => -1,
            MoveDirection::Down => 1,
        }
    }

    /// Fully qualified command name bound to this direction.
    pub const fn command(self) -> &'static str {
        match self {
            MoveDirection::Up => MOVE_UP_COMMAND,
            MoveDirection::Down => MOVE_DOWN_COMMAND,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            MoveDirection::Up => "up",
            MoveDirection::Down => "down",
        }
    }

    /// Parse the short command name (`up` / `down`) or its namespaced form.
    pub fn from_command(name: &str) -> Option<Self> {
        let short = name
            .strip_prefix(NAMESPACE)
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(name);
        match short {
            "up" => Some(MoveDirection::Up),
            "down" => Some(MoveDirection::Down),
            _ => None,
        }
    }
}

/// Why a move could not complete. Boundary moves are not errors; they report `Ok(false)`.
#[derive(Debug, Error)]
pub enum MoveError {
    /// The buffer rejected a replace or selection call.
    #[error(transparent)]
    Buffer(#[from] TextError),
    #[error("buffer lock poisoned by a panicking writer")]
    BufferPoisoned,
    /// The buffer broke its ordering contract for `cursor_start` / `cursor_end`.
    #[error("buffer reported selection start line {first} after end line {last}")]
    InvertedSelection { first: usize, last: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::command_id;

    #[test]
    fn command_names_are_namespaced() {
        assert_eq!(MoveDirection::Up.command(), command_id(NAMESPACE, "up"));
        assert_eq!(
            MoveDirection::Down.command(),
            command_id(NAMESPACE, "down")
        );
    }

    #[test]
    fn from_command_accepts_short_and_full_names() {
        assert_eq!(MoveDirection::from_command("up"), Some(MoveDirection::Up));
        assert_eq!(
            MoveDirection::from_command("line-mover:down"),
            Some(MoveDirection::Down)
        );
        assert_eq!(MoveDirection::from_command("other:up"), None);
        assert_eq!(MoveDirection::from_command("sideways"), None);
    }
}
