//! Release handles for anything a component registers with its host.

/// Something that holds a host resource until released. `dispose` must be idempotent.
pub trait Disposable {
    fn dispose(&mut self);
    fn is_disposed(&self) -> bool;
}

impl<T: Disposable + ?Sized> Disposable for Box<T> {
    fn dispose(&mut self) {
        (**self).dispose()
    }
    fn is_disposed(&self) -> bool {
        (**self).is_disposed()
    }
}

/// Handle returned by registrations. Runs its release closure once on dispose.
///
/// Dropping a `Subscription` without disposing it leaves the registration in place;
/// owners that want RAII teardown dispose from their own `Drop`.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl Disposable for Subscription {
    fn dispose(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
    fn is_disposed(&self) -> bool {
        self.release.is_none()
    }
}

/// Owns a group of disposables and releases them together.
#[derive(Default)]
pub struct CompositeDisposable {
    items: Vec<Box<dyn Disposable + Send>>,
    disposed: bool,
}

impl CompositeDisposable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `item`. Adding to an already disposed composite releases the item
    /// immediately.
    pub fn add<D: Disposable + Send + 'static>(&mut self, mut item: D) {
        if self.disposed {
            item.dispose();
            return;
        }
        self.items.push(Box::new(item));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Disposable for CompositeDisposable {
    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        for mut item in self.items.drain(..) {
            item.dispose();
        }
    }
    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(counter: &Arc<AtomicUsize>) -> Subscription {
        let c = counter.clone();
        Subscription::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn subscription_releases_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut sub = counting(&hits);
        assert!(!sub.is_disposed());
        sub.dispose();
        sub.dispose();
        assert!(sub.is_disposed());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn composite_disposes_all_members_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut group = CompositeDisposable::new();
        group.add(counting(&hits));
        group.add(counting(&hits));
        assert_eq!(group.len(), 2);
        group.dispose();
        group.dispose();
        assert!(group.is_empty());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn add_after_dispose_releases_immediately() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut group = CompositeDisposable::new();
        group.dispose();
        group.add(counting(&hits));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(group.is_empty());
    }
}
