//! Named command registry.
//!
//! Hosts bind keybindings / palette entries to namespaced command names
//! (`namespace:command`). Components register zero-argument callbacks against a
//! [`CommandTarget`] (one per attached buffer) and keep the returned
//! [`Subscription`] until they detach. Dispatch runs handlers outside the
//! registry lock so a handler may register or dispose commands itself.

use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use anyhow::Result;
use tracing::{debug, trace};

use crate::{COMMANDS_DISPATCHED, COMMANDS_UNHANDLED, Subscription};

/// Identifies the editor surface a command is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandTarget(pub u64);

impl fmt::Display for CommandTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

/// Build a namespaced command identifier (`line-mover` + `up` -> `line-mover:up`).
pub fn command_id(namespace: &str, command: &str) -> String {
    format!("{namespace}:{command}")
}

pub type CommandCallback = Arc<dyn Fn() -> Result<()> + Send + Sync>;

struct Handler {
    id: u64,
    target: CommandTarget,
    name: String,
    callback: CommandCallback,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    handlers: Vec<Handler>,
}

/// Shared, cloneable handle onto the host's command table.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

fn lock_inner(inner: &Mutex<RegistryInner>) -> MutexGuard<'_, RegistryInner> {
    // Handlers never run under the lock, so a poisoned table is still consistent.
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` on `target` to `callback`. The binding lives until the returned
    /// subscription is disposed.
    pub fn register<F>(
        &self,
        target: CommandTarget,
        name: impl Into<String>,
        callback: F,
    ) -> Subscription
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        let id = {
            let mut inner = lock_inner(&self.inner);
            let id = inner.next_id;
            inner.next_id += 1;
            inner.handlers.push(Handler {
                id,
                target,
                name: name.clone(),
                callback: Arc::new(callback),
            });
            id
        };
        debug!(
            target: "events.commands",
            cmd_target = %target,
            command = name.as_str(),
            id,
            "command_registered"
        );

        let weak: Weak<Mutex<RegistryInner>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            // Registry may already be gone during host teardown.
            if let Some(inner) = weak.upgrade() {
                lock_inner(&inner).handlers.retain(|h| h.id != id);
                debug!(
                    target: "events.commands",
                    cmd_target = %target,
                    command = name.as_str(),
                    id,
                    "command_released"
                );
            }
        })
    }

    /// Run every live handler bound to `name` on `target`, in registration order.
    /// Returns `Ok(false)` when nothing is bound. The first handler error is returned as is.
    pub fn dispatch(&self, target: CommandTarget, name: &str) -> Result<bool> {
        let callbacks: Vec<CommandCallback> = lock_inner(&self.inner)
            .handlers
            .iter()
            .filter(|h| h.target == target && h.name == name)
            .map(|h| h.callback.clone())
            .collect();
        if callbacks.is_empty() {
            COMMANDS_UNHANDLED.fetch_add(1, Ordering::Relaxed);
            debug!(target: "events.commands", cmd_target = %target, command = name, "command_unhandled");
            return Ok(false);
        }
        for callback in callbacks {
            trace!(target: "events.commands", cmd_target = %target, command = name, "command_dispatch");
            COMMANDS_DISPATCHED.fetch_add(1, Ordering::Relaxed);
            callback()?;
        }
        Ok(true)
    }

    /// Names bound on `target`, sorted and deduplicated.
    pub fn commands_for(&self, target: CommandTarget) -> Vec<String> {
        let mut names: Vec<String> = lock_inner(&self.inner)
            .handlers
            .iter()
            .filter(|h| h.target == target)
            .map(|h| h.name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Number of live bindings across all targets.
    pub fn len(&self) -> usize {
        lock_inner(&self.inner).handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
