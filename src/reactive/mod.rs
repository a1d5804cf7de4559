//! Reactive state containers.
//!
//! A [`Reactive`] cell owns mutable state and notifies subscribers after each
//! update. [`ReadOnly`] is a live projection of the same state that only
//! exposes reads, so the owner stays the single writer.

mod reactive;

pub use reactive::{Reactive, ReadOnly, Subscription};
