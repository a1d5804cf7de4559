use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};

type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Shared<T> {
    state: RwLock<T>,
    // Held from the write through notification so commits are observed in order.
    commit: Mutex<()>,
    subscribers: RwLock<Vec<(usize, Subscriber<T>)>>,
    next_id: AtomicUsize,
}

impl<T> Shared<T> {
    fn read(&self) -> RwLockReadGuard<'_, T> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_commit(&self) -> MutexGuard<'_, ()> {
        self.commit.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscribe(&self, callback: Subscriber<T>) -> usize {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, callback));
        id
    }

    fn unsubscribe(&self, id: usize) {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(subscriber_id, _)| *subscriber_id != id);
    }

    /// Notify all subscribers of a state change.
    fn notify(&self) {
        // Clone the list so a callback may subscribe or drop a guard.
        let subscribers: Vec<Subscriber<T>> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, subscriber)| Arc::clone(subscriber))
            .collect();
        let state = self.read();
        for subscriber in &subscribers {
            subscriber(&*state);
        }
    }
}

/// Owned mutable state that notifies subscribers after every change.
///
/// Cloning a `Reactive` yields another handle to the same state.
pub struct Reactive<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Reactive<T> {
    /// Create a new reactive cell with the given initial state.
    pub fn new(initial: T) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(initial),
                commit: Mutex::new(()),
                subscribers: RwLock::new(Vec::new()),
                next_id: AtomicUsize::new(0),
            }),
        }
    }

    /// Update the state using a function.
    ///
    /// The whole closure runs under one write lock, so readers never observe
    /// a half-applied change. Subscribers run after the write lock is released
    /// but before any other update can commit, so every subscriber sees every
    /// commit, in commit order. Neither `f` nor a subscriber may update the
    /// same cell.
    pub fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let _commit = self.shared.begin_commit();
        let result = {
            let mut state = self.shared.write();
            f(&mut *state)
        };
        self.shared.notify();
        result
    }

    /// Replace the state wholesale.
    pub fn set(&self, new_state: T) {
        self.update(|state| *state = new_state);
    }

    /// Read state without cloning.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&*self.shared.read())
    }

    /// Subscribe to state changes.
    ///
    /// The callback runs after every update until the returned guard is dropped.
    /// It receives the new state and must not go back through another handle
    /// to the same cell.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        T: Send + Sync + 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        subscribe(&self.shared, callback)
    }

    /// A live view of this state that cannot write to it.
    pub fn read_only(&self) -> ReadOnly<T> {
        ReadOnly {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Clone for Reactive<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// A live, read-only projection of a [`Reactive`] cell.
///
/// Reads always see the latest state. There is no way to write through it:
///
/// ```compile_fail
/// use quill::Reactive;
///
/// let cell = Reactive::new(0);
/// let view = cell.read_only();
/// view.read(|value| *value = 1);
/// ```
///
/// ```compile_fail
/// use quill::Reactive;
///
/// let cell = Reactive::new(0);
/// cell.read_only().update(|value| *value = 1);
/// ```
pub struct ReadOnly<T> {
    shared: Arc<Shared<T>>,
}

impl<T> ReadOnly<T> {
    /// Read the current state without cloning.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&*self.shared.read())
    }

    /// Subscribe to changes of the underlying state.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        T: Send + Sync + 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        subscribe(&self.shared, callback)
    }
}

impl<T: Clone> ReadOnly<T> {
    /// A frozen point-in-time copy of the state.
    pub fn snapshot(&self) -> T {
        self.shared.read().clone()
    }
}

impl<T> Clone for ReadOnly<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

fn subscribe<T, F>(shared: &Arc<Shared<T>>, callback: F) -> Subscription
where
    T: Send + Sync + 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    let id = shared.subscribe(Arc::new(callback));
    let weak: Weak<Shared<T>> = Arc::downgrade(shared);
    Subscription {
        unsubscribe: Some(Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.unsubscribe(id);
            }
        })),
    }
}

/// RAII guard for a subscriber; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Keep the subscriber registered for as long as the state lives.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct AppState {
        count: usize,
        name: String,
    }

    fn state() -> Reactive<AppState> {
        Reactive::new(AppState {
            count: 0,
            name: "test".to_string(),
        })
    }

    #[test]
    fn update_returns_closure_result() {
        let reactive = state();

        let previous = reactive.update(|state| {
            let previous = state.count;
            state.count += 10;
            previous
        });

        assert_eq!(previous, 0);
        assert_eq!(reactive.read(|state| state.count), 10);
    }

    #[test]
    fn read_only_view_is_live() {
        let reactive = state();
        let view = reactive.read_only();
        let frozen = view.snapshot();

        reactive.set(AppState {
            count: 42,
            name: "updated".to_string(),
        });

        assert_eq!(view.read(|state| state.count), 42);
        assert_eq!(view.snapshot().name, "updated");
        assert_eq!(frozen.count, 0);
    }

    #[test]
    fn subscribers_run_until_guard_dropped() {
        let reactive = state();
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let guard = reactive.subscribe(move |_state| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        reactive.update(|state| state.count += 1);
        reactive.update(|state| state.count += 1);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);

        drop(guard);
        reactive.update(|state| state.count += 1);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn detached_subscription_stays_registered() {
        let reactive = state();
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        reactive
            .read_only()
            .subscribe(move |_state| {
                call_count_clone.fetch_add(1, Ordering::SeqCst);
            })
            .detach();

        reactive.update(|state| state.count += 1);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscribers_see_committed_state() {
        let reactive = state();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();

        let _guard = reactive.subscribe(move |state| {
            seen_clone.store(state.count, Ordering::SeqCst);
        });

        reactive.update(|state| state.count = 7);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn concurrent_updates_notify_in_commit_order() {
        const THREADS: usize = 8;
        const UPDATES: usize = 50;

        let reactive = state();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let _guard = reactive.subscribe(move |state| {
            seen_clone.lock().unwrap().push(state.count);
        });

        std::thread::scope(|scope| {
            for _ in 0..THREADS {
                scope.spawn(|| {
                    for _ in 0..UPDATES {
                        reactive.update(|state| state.count += 1);
                    }
                });
            }
        });

        let seen = seen.lock().unwrap();
        let expected: Vec<usize> = (1..=THREADS * UPDATES).collect();
        assert_eq!(*seen, expected);
    }
}
