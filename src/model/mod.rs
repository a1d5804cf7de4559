//! Entities held by the store.
//!
//! Every entity carries a string identifier assigned by the remote service;
//! the [`Entity`] trait is what the normalized collections key on.

mod entity;

pub use entity::{Author, Entity, Post, User};
