//! Core event types, command registry and release handles.

use std::sync::atomic::AtomicU64;
use tokio::sync::mpsc::{self, Receiver, Sender};

pub mod commands;
pub mod disposable;

pub use commands::{CommandCallback, CommandRegistry, CommandTarget, command_id};
pub use disposable::{CompositeDisposable, Disposable, Subscription};

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// The host loop consumes a bounded mpsc channel. Producers (CLI script, future keybinding sources)
// use `send().await` and park when the loop falls behind; commands are never dropped. A single
// consumer runs each command to completion before receiving the next event, which is what keeps
// buffer mutations serialized.
// -------------------------------------------------------------------------------------------------
pub const EVENT_CHANNEL_CAP: usize = 1024;

// Telemetry: relaxed counters, inspected by tests and logged at shutdown.
pub static COMMANDS_DISPATCHED: AtomicU64 = AtomicU64::new(0); // handler invocations
pub static COMMANDS_UNHANDLED: AtomicU64 = AtomicU64::new(0); // dispatches with no bound handler

/// Top-level event enum consumed by the host loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Command(CommandEvent),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEvent {
    /// Run the command bound to `name` on `target`.
    Invoke { target: CommandTarget, name: String },
}

impl Event {
    pub fn invoke(target: CommandTarget, name: impl Into<String>) -> Self {
        Event::Command(CommandEvent::Invoke {
            target,
            name: name.into(),
        })
    }
}

/// Create the bounded host event channel.
pub fn event_channel() -> (Sender<Event>, Receiver<Event>) {
    mpsc::channel(EVENT_CHANNEL_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_preserves_command_order() {
        let (tx, mut rx) = event_channel();
        let target = CommandTarget(7);
        tx.send(Event::invoke(target, "ns:up")).await.unwrap();
        tx.send(Event::invoke(target, "ns:down")).await.unwrap();
        tx.send(Event::Shutdown).await.unwrap();
        drop(tx);

        let mut seen = Vec::new();
        while let Some(ev) = rx.recv().await {
            seen.push(ev);
        }
        assert_eq!(
            seen,
            vec![
                Event::invoke(target, "ns:up"),
                Event::invoke(target, "ns:down"),
                Event::Shutdown,
            ]
        );
    }
}
