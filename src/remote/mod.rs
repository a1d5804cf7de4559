//! The remote data service the store synchronizes with.
//!
//! [`HttpDataService`] talks JSON to the blog API; [`InMemoryDataService`]
//! plays the server's part in process, which is what demos and tests use.

mod error;
mod http;
mod memory;

pub use error::RemoteError;
pub use http::HttpDataService;
pub use memory::InMemoryDataService;

use crate::model::{Author, Post, User};
use async_trait::async_trait;

/// Create and fetch calls against the blog API.
///
/// Implementations assign ids to created entities and strip credentials from
/// created users.
#[async_trait]
pub trait RemoteDataService: Send + Sync {
    /// `POST /posts`: create a post from a draft.
    async fn create_post(&self, draft: &Post) -> Result<Post, RemoteError>;

    /// `POST /users`: sign up a user, returning it without its password.
    async fn create_user(&self, draft: &User) -> Result<Author, RemoteError>;

    /// `GET /posts`: every post the service knows about.
    async fn fetch_posts(&self) -> Result<Vec<Post>, RemoteError>;
}
