//! Host side of the package contract.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use core_actions::SharedBuffer;
use core_events::{CommandRegistry, CommandTarget, Subscription};
use tracing::info;

/// An open editor as seen by packages: its command target and its buffer.
pub struct EditorHandle<B> {
    pub target: CommandTarget,
    pub buffer: SharedBuffer<B>,
}

impl<B> Clone for EditorHandle<B> {
    fn clone(&self) -> Self {
        Self {
            target: self.target,
            buffer: self.buffer.clone(),
        }
    }
}

impl<B> std::fmt::Debug for EditorHandle<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorHandle")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

pub type EditorLoadCallback<B> = Box<dyn Fn(EditorHandle<B>) + Send + Sync>;
pub type EditorCloseCallback = Box<dyn Fn(CommandTarget) + Send + Sync>;

/// What a host application offers to packages.
pub trait EditorHost<B> {
    /// Stable human-readable host identifier (for logs / diagnostics).
    fn name(&self) -> &'static str;
    fn commands(&self) -> CommandRegistry;
    fn active_editor(&self) -> Option<EditorHandle<B>>;
    /// Called with every editor opened after subscription.
    fn on_editor_load(&self, callback: EditorLoadCallback<B>) -> Subscription;
    /// Called with the target of every editor closed after subscription.
    fn on_editor_close(&self, callback: EditorCloseCallback) -> Subscription;
}

struct Listeners<T: ?Sized> {
    next_id: u64,
    entries: Vec<(u64, Arc<T>)>,
}

impl<T: ?Sized> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T: ?Sized> Listeners<T> {
    fn push(&mut self, listener: Arc<T>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    fn snapshot(&self) -> Vec<Arc<T>> {
        self.entries.iter().map(|(_, l)| l.clone()).collect()
    }
}

struct HostState<B> {
    next_target: u64,
    active: Option<EditorHandle<B>>,
    load: Listeners<dyn Fn(EditorHandle<B>) + Send + Sync>,
    close: Listeners<dyn Fn(CommandTarget) + Send + Sync>,
}

/// In-process host: owns the command registry and the active editor slot.
pub struct LocalHost<B> {
    state: Arc<Mutex<HostState<B>>>,
    registry: CommandRegistry,
}

impl<B> Clone for LocalHost<B> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            registry: self.registry.clone(),
        }
    }
}

fn lock_state<B>(state: &Mutex<HostState<B>>) -> MutexGuard<'_, HostState<B>> {
    // Listeners run outside the lock; a poisoned slot is still consistent.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<B: Send + 'static> Default for LocalHost<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Send + 'static> LocalHost<B> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HostState {
                next_target: 1,
                active: None,
                load: Listeners::default(),
                close: Listeners::default(),
            })),
            registry: CommandRegistry::new(),
        }
    }

    /// Open `buffer` as the active editor and notify load listeners.
    pub fn open(&self, name: &str, buffer: B) -> EditorHandle<B> {
        let (handle, listeners) = {
            let mut state = lock_state(&self.state);
            let target = CommandTarget(state.next_target);
            state.next_target += 1;
            let handle = EditorHandle {
                target,
                buffer: Arc::new(Mutex::new(buffer)),
            };
            state.active = Some(handle.clone());
            (handle, state.load.snapshot())
        };
        info!(
            target: "plugin.host",
            editor = name,
            cmd_target = %handle.target,
            "editor_opened"
        );
        for listener in listeners {
            listener(handle.clone());
        }
        handle
    }

    /// Close the editor bound to `target`, notifying close listeners. Returns false when
    /// no such editor is active.
    pub fn close(&self, target: CommandTarget) -> bool {
        let listeners = {
            let mut state = lock_state(&self.state);
            if state.active.as_ref().map(|e| e.target) != Some(target) {
                return false;
            }
            state.active = None;
            state.close.snapshot()
        };
        info!(target: "plugin.host", cmd_target = %target, "editor_closed");
        for listener in listeners {
            listener(target);
        }
        true
    }

    fn release<F>(&self, remove: F) -> Subscription
    where
        F: FnOnce(&mut HostState<B>) + Send + 'static,
    {
        let weak: Weak<Mutex<HostState<B>>> = Arc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                remove(&mut lock_state(&state));
            }
        })
    }
}

impl<B: Send + 'static> EditorHost<B> for LocalHost<B> {
    fn name(&self) -> &'static str {
        "local-host"
    }

    fn commands(&self) -> CommandRegistry {
        self.registry.clone()
    }

    fn active_editor(&self) -> Option<EditorHandle<B>> {
        lock_state(&self.state).active.clone()
    }

    fn on_editor_load(&self, callback: EditorLoadCallback<B>) -> Subscription {
        let id = lock_state(&self.state).load.push(Arc::from(callback));
        self.release(move |state| state.load.entries.retain(|(i, _)| *i != id))
    }

    fn on_editor_close(&self, callback: EditorCloseCallback) -> Subscription {
        let id = lock_state(&self.state).close.push(Arc::from(callback));
        self.release(move |state| state.close.entries.retain(|(i, _)| *i != id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::Disposable;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn open_sets_active_and_notifies() {
        let host: LocalHost<String> = LocalHost::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let mut sub = host.on_editor_load(Box::new(move |_: EditorHandle<String>| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let first = host.open("one", "a".to_string());
        let second = host.open("two", "b".to_string());
        assert_ne!(first.target, second.target);
        assert_eq!(host.active_editor().map(|e| e.target), Some(second.target));
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        sub.dispose();
        host.open("three", "c".to_string());
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn close_only_matches_active_editor() {
        let host: LocalHost<String> = LocalHost::new();
        let closed = Arc::new(Mutex::new(Vec::new()));
        let sink = closed.clone();
        let _sub = host.on_editor_close(Box::new(move |t: CommandTarget| {
            sink.lock().unwrap().push(t)
        }));
        let first = host.open("one", String::new());
        let second = host.open("two", String::new());
        assert!(!host.close(first.target));
        assert!(host.close(second.target));
        assert!(host.active_editor().is_none());
        assert_eq!(*closed.lock().unwrap(), vec![second.target]);
    }
}
