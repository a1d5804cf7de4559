//! The blog store.
//!
//! [`BlogStore`] owns the normalized state, hands out read-only views of it,
//! and is the only thing that writes to it.

mod store;

pub use store::{BlogStore, STORE_KEY};
