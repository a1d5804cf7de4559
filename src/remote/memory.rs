//! In-process stand-in for the blog API.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument};

use super::{RemoteDataService, RemoteError};
use crate::model::{Author, Post, User};

#[derive(Debug, Default)]
struct Backend {
    posts: Vec<Post>,
    users: Vec<User>,
    next_id: u64,
    outage: Option<String>,
}

impl Backend {
    fn check_available(&self) -> Result<(), RemoteError> {
        match &self.outage {
            Some(reason) => Err(RemoteError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn assign_id(&mut self, prefix: char) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }
}

/// A [`RemoteDataService`] that keeps everything in memory.
///
/// Ids are assigned from one counter, prefixed `p` for posts and `u` for
/// users. Stored users keep their password; only the [`Author`] projection
/// is returned.
#[derive(Debug, Default)]
pub struct InMemoryDataService {
    backend: Mutex<Backend>,
}

impl InMemoryDataService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with posts already on the server.
    ///
    /// Id assignment continues after the number of seeded posts.
    pub fn with_posts<I>(posts: I) -> Self
    where
        I: IntoIterator<Item = Post>,
    {
        let posts: Vec<Post> = posts.into_iter().collect();
        Self {
            backend: Mutex::new(Backend {
                next_id: posts.len() as u64,
                posts,
                ..Backend::default()
            }),
        }
    }

    /// Make every call fail with [`RemoteError::Unavailable`] until
    /// [`restore`](Self::restore) is called.
    pub fn fail_with(&self, reason: impl Into<String>) {
        self.backend().outage = Some(reason.into());
    }

    pub fn restore(&self) {
        self.backend().outage = None;
    }

    /// Posts currently stored on the "server".
    pub fn posts(&self) -> Vec<Post> {
        self.backend().posts.clone()
    }

    /// Number of users signed up so far.
    pub fn user_count(&self) -> usize {
        self.backend().users.len()
    }

    fn backend(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RemoteDataService for InMemoryDataService {
    #[instrument(skip_all, fields(title = %draft.title))]
    async fn create_post(&self, draft: &Post) -> Result<Post, RemoteError> {
        let mut backend = self.backend();
        backend.check_available()?;

        let mut post = draft.clone();
        post.id = backend.assign_id('p');
        backend.posts.push(post.clone());
        debug!(id = %post.id, "post stored");
        Ok(post)
    }

    #[instrument(skip_all, fields(username = %draft.username))]
    async fn create_user(&self, draft: &User) -> Result<Author, RemoteError> {
        let mut backend = self.backend();
        backend.check_available()?;

        let mut user = draft.clone();
        user.id = backend.assign_id('u');
        backend.users.push(user.clone());
        debug!(id = %user.id, "user stored");
        Ok(Author::from(user))
    }

    #[instrument(skip_all)]
    async fn fetch_posts(&self) -> Result<Vec<Post>, RemoteError> {
        let backend = self.backend();
        backend.check_available()?;
        Ok(backend.posts.clone())
    }
}
