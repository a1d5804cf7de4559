//! # Quill
//!
//! A reactive, normalized client-side store for a blog API.
//!
//! The store keeps posts and authors as normalized collections (an ordered id
//! list plus an id-to-entity map), writes to them only after the remote API
//! accepted a change, and hands the UI a live read-only view of the result.
//!
//! ## Building blocks
//!
//! - [`BlogStore`] - owns the state and performs create/fetch operations
//! - [`ReadOnly`] - live projection returned by [`BlogStore::get_state`]
//! - [`RemoteDataService`] - the API seam, with HTTP and in-memory implementations
//! - [`App`] - ambient registry the store is installed on and looked up from
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use quill::{App, BlogStore, InMemoryDataService};
//!
//! let store = BlogStore::seeded(Arc::new(InMemoryDataService::new()));
//! let app = App::new();
//! app.use_plugin(&store);
//!
//! App::mount(app, || {
//!     let store = quill::use_store().expect("store installed");
//!     assert_eq!(store.get_state().read(|state| state.posts().len()), 3);
//! });
//! ```

pub mod collection;
pub mod config;
pub mod error;
pub mod mocks;
pub mod model;
pub mod provider;
pub mod reactive;
pub mod remote;
pub mod store;

// Re-export main types for convenience
pub use collection::{AuthorCollection, EntityCollection, PostCollection, State};
pub use config::{ConfigError, FetchPolicy, RemoteConfig, StoreConfig};
pub use error::{Error, Result};
pub use model::{Author, Entity, Post, User};
pub use provider::{use_store, App, InjectionKey, MissingProviderError, Plugin};
pub use reactive::{Reactive, ReadOnly, Subscription};
pub use remote::{HttpDataService, InMemoryDataService, RemoteDataService, RemoteError};
pub use store::{BlogStore, STORE_KEY};
