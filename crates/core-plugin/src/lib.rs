//! Package lifecycle for the line mover.
//!
//! A host exposes open editors through [`EditorHost`]; [`LineMoverPackage`] attaches a
//! [`LineMover`] to the active editor on activation and follows later editor loads and
//! closes. The package owns the live mover explicitly (no global editor slot):
//!
//! - activation attaches to the active editor, if any, and subscribes to editor loads
//!   and closes;
//! - a load disposes the previous mover before attaching the new one, so at most one
//!   mover is live per package;
//! - closing the attached editor disposes its mover;
//! - deactivation releases the subscriptions and the mover. It is idempotent and also
//!   runs on drop.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use core_actions::LineMover;
use core_events::{CommandRegistry, CommandTarget, CompositeDisposable, Disposable};
use core_text::TextBuffer;
use tracing::info;

pub mod host;

pub use host::{EditorCloseCallback, EditorHandle, EditorHost, EditorLoadCallback, LocalHost};

type MoverSlot<B> = Arc<Mutex<Option<LineMover<B>>>>;

fn lock_slot<B>(slot: &Mutex<Option<LineMover<B>>>) -> MutexGuard<'_, Option<LineMover<B>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Activated line mover package bound to one host.
pub struct LineMoverPackage<B> {
    subscriptions: CompositeDisposable,
    mover: MoverSlot<B>,
}

impl<B: TextBuffer + Send + 'static> LineMoverPackage<B> {
    pub fn activate<H: EditorHost<B> + ?Sized>(host: &H) -> Self {
        let slot: MoverSlot<B> = Arc::new(Mutex::new(None));
        let registry = host.commands();

        if let Some(editor) = host.active_editor() {
            attach(&slot, editor, &registry);
        }

        let mut subscriptions = CompositeDisposable::new();
        let load_slot = slot.clone();
        subscriptions.add(host.on_editor_load(Box::new(move |editor: EditorHandle<B>| {
            attach(&load_slot, editor, &registry);
        })));
        let close_slot = slot.clone();
        subscriptions.add(host.on_editor_close(Box::new(move |target: CommandTarget| {
            let mut guard = lock_slot(&close_slot);
            if guard.as_ref().map(LineMover::target) == Some(target)
                && let Some(mut mover) = guard.take()
            {
                mover.dispose();
            }
        })));

        info!(
            target: "plugin",
            host = host.name(),
            attached = lock_slot(&slot).is_some(),
            "line_mover_activated"
        );
        Self {
            subscriptions,
            mover: slot,
        }
    }
}

impl<B> LineMoverPackage<B> {
    /// Target of the currently attached editor.
    pub fn attached_target(&self) -> Option<CommandTarget> {
        lock_slot(&self.mover).as_ref().map(LineMover::target)
    }

    pub fn is_active(&self) -> bool {
        !self.subscriptions.is_disposed()
    }

    pub fn deactivate(&mut self) {
        if self.subscriptions.is_disposed() {
            return;
        }
        self.subscriptions.dispose();
        if let Some(mut mover) = lock_slot(&self.mover).take() {
            mover.dispose();
        }
        info!(target: "plugin", "line_mover_deactivated");
    }
}

fn attach<B: TextBuffer + Send + 'static>(
    slot: &Mutex<Option<LineMover<B>>>,
    editor: EditorHandle<B>,
    registry: &CommandRegistry,
) {
    let mut guard = lock_slot(slot);
    if let Some(mut previous) = guard.take() {
        previous.dispose();
    }
    *guard = Some(LineMover::attach(editor.buffer, editor.target, registry));
}

impl<B> Disposable for LineMoverPackage<B> {
    fn dispose(&mut self) {
        self.deactivate();
    }

    fn is_disposed(&self) -> bool {
        !self.is_active()
    }
}

impl<B> Drop for LineMoverPackage<B> {
    fn drop(&mut self) {
        self.deactivate();
    }
}
