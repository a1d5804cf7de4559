use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use thiserror::Error;

type Slot = (TypeId, &'static str);

/// Typed token a value is provided and injected under.
///
/// A slot is identified by both the name and the value type, so a library
/// reusing the same name for another type cannot shadow it.
pub struct InjectionKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> InjectionKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: 'static> InjectionKey<T> {
    fn slot(&self) -> Slot {
        (TypeId::of::<T>(), self.name)
    }
}

impl<T> Clone for InjectionKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for InjectionKey<T> {}

impl<T> fmt::Debug for InjectionKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InjectionKey").field(&self.name).finish()
    }
}

/// A value was injected before anything provided it.
///
/// This is a setup-order bug, not something to recover from at runtime.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("nothing was provided for `{key}`; install it on the app before injecting it")]
pub struct MissingProviderError {
    key: &'static str,
}

impl MissingProviderError {
    pub fn new(key: &'static str) -> Self {
        Self { key }
    }

    /// Name of the key that had no provider.
    pub fn key(&self) -> &'static str {
        self.key
    }
}

/// Something that registers itself on an [`App`].
pub trait Plugin {
    fn install(&self, app: &App);
}

/// Per-application registry of shared values.
///
/// Supports both a process-wide app (default) and scoped apps for isolation.
/// Lookups through [`inject`] resolve against the innermost mounted app.
pub struct App {
    provides: RwLock<HashMap<Slot, Arc<dyn Any + Send + Sync>>>,
}

// Thread-local stack for mounted apps
thread_local! {
    static APP_STACK: RefCell<Vec<Arc<App>>> = const { RefCell::new(Vec::new()) };
}

impl App {
    /// Create an empty, unmounted app.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            provides: RwLock::new(HashMap::new()),
        })
    }

    /// Get or create the process-wide app.
    ///
    /// This is used when no scoped app is mounted.
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<App>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(Self::new))
    }

    /// The innermost mounted app, or the global one if none is mounted.
    pub fn current() -> Arc<Self> {
        APP_STACK.with(|stack| stack.borrow().last().cloned().unwrap_or_else(Self::global))
    }

    /// Run a function with a fresh, empty app mounted.
    ///
    /// Everything provided inside is dropped when the function returns.
    pub fn scope<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        Self::mount(Self::new(), f)
    }

    /// Run a function with `app` as the current app.
    ///
    /// The app is pushed onto the thread-local stack for the duration of the
    /// call and popped even if the function panics.
    pub fn mount<F, R>(app: Arc<Self>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        APP_STACK.with(|stack| stack.borrow_mut().push(app));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

        APP_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });

        match result {
            Ok(r) => r,
            Err(e) => std::panic::resume_unwind(e),
        }
    }

    /// Install a plugin on this app.
    pub fn use_plugin<P: Plugin + ?Sized>(&self, plugin: &P) -> &Self {
        plugin.install(self);
        self
    }

    /// Provide a value under `key`, replacing any previous one.
    pub fn provide<T>(&self, key: &InjectionKey<T>, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.provides
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.slot(), Arc::new(value));
    }

    /// Look up the value provided under `key`.
    pub fn inject<T>(&self, key: &InjectionKey<T>) -> Option<T>
    where
        T: Clone + 'static,
    {
        self.provides
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key.slot())
            .and_then(|value| (**value).downcast_ref::<T>())
            .cloned()
    }

    pub fn contains<T: 'static>(&self, key: &InjectionKey<T>) -> bool {
        self.provides
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key.slot())
    }

    /// Remove the value provided under `key`. Returns whether one was present.
    pub fn remove<T: 'static>(&self, key: &InjectionKey<T>) -> bool {
        self.provides
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key.slot())
            .is_some()
    }

    /// Drop everything provided on this app.
    pub fn clear(&self) {
        self.provides
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let provides = self.provides.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("App")
            .field("provides", &provides.keys().map(|(_, name)| *name).collect::<Vec<_>>())
            .finish()
    }
}

/// Look up `key` in the current app.
pub fn inject<T>(key: &InjectionKey<T>) -> Option<T>
where
    T: Clone + 'static,
{
    App::current().inject(key)
}

/// Look up `key` in the current app, failing if nothing provided it.
///
/// # Errors
///
/// Returns [`MissingProviderError`] if no value was provided under `key`.
pub fn require<T>(key: &InjectionKey<T>) -> Result<T, MissingProviderError>
where
    T: Clone + 'static,
{
    inject(key).ok_or_else(|| MissingProviderError::new(key.name()))
}
