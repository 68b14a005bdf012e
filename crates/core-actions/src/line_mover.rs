//! `LineMover`: the move algorithm bound to one buffer and exposed as commands.

use std::sync::{Arc, Mutex};

use core_events::{CommandRegistry, CommandTarget, CompositeDisposable, Disposable};
use core_text::TextBuffer;
use tracing::info;

use crate::{MoveDirection, MoveError, moves};

/// Buffer handle shared between the host and the mover. The lock is held for the whole
/// read → replace → reselect sequence of a move.
pub type SharedBuffer<B> = Arc<Mutex<B>>;

/// Attachment of the line move commands to one buffer.
///
/// Holds only the buffer reference and its command subscriptions. Disposing (or
/// dropping) releases both commands; the buffer itself is left untouched.
pub struct LineMover<B> {
    buffer: SharedBuffer<B>,
    target: CommandTarget,
    subscriptions: CompositeDisposable,
}

impl<B: TextBuffer + Send + 'static> LineMover<B> {
    /// Bind `line-mover:up` and `line-mover:down` on `target` to moves over `buffer`.
    pub fn attach(
        buffer: SharedBuffer<B>,
        target: CommandTarget,
        registry: &CommandRegistry,
    ) -> Self {
        let mut subscriptions = CompositeDisposable::new();
        for direction in [MoveDirection::Up, MoveDirection::Down] {
            let buffer = buffer.clone();
            subscriptions.add(registry.register(target, direction.command(), move || {
                move_locked(&buffer, direction)?;
                Ok(())
            }));
        }
        info!(target: "actions.line_mover", cmd_target = %target, "attached");
        Self {
            buffer,
            target,
            subscriptions,
        }
    }

    pub fn move_lines_up(&self) -> Result<bool, MoveError> {
        move_locked(&self.buffer, MoveDirection::Up)
    }

    pub fn move_lines_down(&self) -> Result<bool, MoveError> {
        move_locked(&self.buffer, MoveDirection::Down)
    }
}

impl<B> LineMover<B> {
    pub fn target(&self) -> CommandTarget {
        self.target
    }
}

fn move_locked<B: TextBuffer>(
    buffer: &Mutex<B>,
    direction: MoveDirection,
) -> Result<bool, MoveError> {
    let mut guard = buffer.lock().map_err(|_| MoveError::BufferPoisoned)?;
    moves::move_lines(&mut *guard, direction)
}

impl<B> Disposable for LineMover<B> {
    fn dispose(&mut self) {
        if self.subscriptions.is_disposed() {
            return;
        }
        self.subscriptions.dispose();
        info!(target: "actions.line_mover", cmd_target = %self.target, "detached");
    }

    fn is_disposed(&self) -> bool {
        self.subscriptions.is_disposed()
    }
}

impl<B> Drop for LineMover<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}
