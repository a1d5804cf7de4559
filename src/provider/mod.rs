//! Ambient lookup of shared values.
//!
//! An [`App`] is a registry of values keyed by [`InjectionKey`]. Code that
//! sets the application up provides values (usually by installing a
//! [`Plugin`]); code running while that app is mounted injects them without
//! threading handles through every call.

mod registry;

pub use registry::{inject, require, App, InjectionKey, MissingProviderError, Plugin};

use crate::store::{BlogStore, STORE_KEY};

/// The store installed on the current app.
///
/// # Errors
///
/// Returns [`MissingProviderError`] if no store was installed, which means
/// setup ran in the wrong order.
pub fn use_store() -> Result<BlogStore, MissingProviderError> {
    require(&STORE_KEY)
}
