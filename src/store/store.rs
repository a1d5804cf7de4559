use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::collection::{PostCollection, State};
use crate::config::{FetchPolicy, StoreConfig};
use crate::model::{Author, Post, User};
use crate::provider::{App, InjectionKey, Plugin};
use crate::reactive::{Reactive, ReadOnly, Subscription};
use crate::remote::{HttpDataService, RemoteDataService, RemoteError};

/// Key the store is provided under.
pub const STORE_KEY: InjectionKey<BlogStore> = InjectionKey::new("quill::store");

/// Normalized post and author state kept in sync with the blog API.
///
/// Every operation calls the remote service first and only then merges the
/// result into local state, in a single update. A failed call leaves state
/// untouched. Clones share the same state.
#[derive(Clone)]
pub struct BlogStore {
    state: Reactive<State>,
    remote: Arc<dyn RemoteDataService>,
    fetch_policy: FetchPolicy,
}

impl BlogStore {
    /// Create a store with the given initial state.
    pub fn new(initial: State, remote: Arc<dyn RemoteDataService>) -> Self {
        Self {
            state: Reactive::new(initial),
            remote,
            fetch_policy: FetchPolicy::default(),
        }
    }

    /// Create a store starting from the mock posts.
    pub fn seeded(remote: Arc<dyn RemoteDataService>) -> Self {
        Self::new(State::seeded(), remote)
    }

    /// Create a store talking to the configured HTTP API.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn from_config(config: &StoreConfig) -> Result<Self, RemoteError> {
        let remote = Arc::new(HttpDataService::new(&config.remote)?);
        let initial = if config.seed_posts {
            State::seeded()
        } else {
            State::default()
        };
        Ok(Self::new(initial, remote).with_fetch_policy(config.fetch_policy))
    }

    #[must_use]
    pub fn with_fetch_policy(mut self, fetch_policy: FetchPolicy) -> Self {
        self.fetch_policy = fetch_policy;
        self
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        self.fetch_policy
    }

    /// Register this store on `app` under [`STORE_KEY`].
    pub fn install(&self, app: &App) {
        app.provide(&STORE_KEY, self.clone());
    }

    /// A live, read-only view of the state.
    pub fn get_state(&self) -> ReadOnly<State> {
        self.state.read_only()
    }

    /// Run `callback` after every committed change.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&State) + Send + Sync + 'static,
    {
        self.state.subscribe(callback)
    }

    /// The author created most recently in this session.
    pub fn current_user(&self) -> Option<Author> {
        self.state
            .read(|state| state.authors.current_user().cloned())
    }

    /// Create a post remotely and append the returned post.
    ///
    /// # Errors
    ///
    /// Returns the remote error unchanged; local state is not touched.
    #[instrument(skip_all, fields(title = %draft.title))]
    pub async fn create_post(&self, draft: &Post) -> Result<(), RemoteError> {
        let post = self.remote.create_post(draft).await?;
        let id = post.id.clone();
        self.state.update(|state| state.posts.insert(post));
        debug!(%id, "post added");
        Ok(())
    }

    /// Sign a user up remotely and make the returned author the current user.
    ///
    /// # Errors
    ///
    /// Returns the remote error unchanged; local state, including the current
    /// user, is not touched.
    #[instrument(skip_all, fields(username = %draft.username))]
    pub async fn create_user(&self, draft: &User) -> Result<(), RemoteError> {
        let author = self.remote.create_user(draft).await?;
        let id = author.id.clone();
        self.state.update(|state| state.authors.insert_current(author));
        debug!(%id, "current user set");
        Ok(())
    }

    /// Fetch every post and apply it according to the fetch policy.
    ///
    /// # Errors
    ///
    /// Returns the remote error unchanged; local state is not touched.
    #[instrument(skip_all, fields(policy = ?self.fetch_policy))]
    pub async fn fetch_posts(&self) -> Result<(), RemoteError> {
        let posts = self.remote.fetch_posts().await?;
        let count = posts.len();
        self.state.update(|state| match self.fetch_policy {
            FetchPolicy::Replace => state.posts = PostCollection::from_entities(posts, true),
            FetchPolicy::MergeById => {
                state.posts.merge(posts);
                state.posts.mark_loaded();
            }
        });
        debug!(count, "posts loaded");
        Ok(())
    }

    /// Fetch posts unless a full fetch already happened.
    ///
    /// Returns whether a fetch was made.
    ///
    /// # Errors
    ///
    /// Returns the remote error unchanged; local state is not touched.
    pub async fn ensure_posts_loaded(&self) -> Result<bool, RemoteError> {
        if self.state.read(|state| state.posts.is_loaded()) {
            return Ok(false);
        }
        self.fetch_posts().await?;
        Ok(true)
    }
}

impl Plugin for BlogStore {
    fn install(&self, app: &App) {
        BlogStore::install(self, app);
    }
}

impl fmt::Debug for BlogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.state.read(|state| {
            f.debug_struct("BlogStore")
                .field("posts", &state.posts.len())
                .field("authors", &state.authors.len())
                .field("fetch_policy", &self.fetch_policy)
                .finish_non_exhaustive()
        })
    }
}
