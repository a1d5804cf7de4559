//! Normalized entity collections and the aggregate store state.

mod collection;

pub use collection::{AuthorCollection, EntityCollection, PostCollection, State};
