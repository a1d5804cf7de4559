//! JSON-over-HTTP client for the blog API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::{RemoteDataService, RemoteError};
use crate::config::RemoteConfig;
use crate::model::{Author, Entity, Post, User};

/// [`RemoteDataService`] backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpDataService {
    client: Client,
    base_url: Url,
}

impl HttpDataService {
    /// Build a client for the configured API.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|source| RemoteError::Request {
                url: config.base_url().to_string(),
                source,
            })?;

        Ok(Self {
            client,
            base_url: config.base_url().clone(),
        })
    }

    /// Base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        Ok(self.base_url.join(path)?)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        url: Url,
        request: RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = request.send().await.map_err(|source| RemoteError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(%url, error = %e, "could not read error response body");
                    String::new()
                }
            };
            warn!(%url, %status, "blog API returned an error status");
            return Err(RemoteError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|source| RemoteError::Request {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_slice(&bytes).map_err(|e| RemoteError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Reject entities the server returned without an id.
fn require_id<E: Entity>(url: &Url, entity: E) -> Result<E, RemoteError> {
    if entity.id().is_empty() {
        return Err(RemoteError::Decode {
            url: url.to_string(),
            message: "entity has no id".to_string(),
        });
    }
    Ok(entity)
}

#[async_trait]
impl RemoteDataService for HttpDataService {
    #[instrument(skip_all, fields(title = %draft.title))]
    async fn create_post(&self, draft: &Post) -> Result<Post, RemoteError> {
        let url = self.endpoint("posts")?;
        let request = self.client.post(url.clone()).json(draft);
        let post: Post = self.send(url.clone(), request).await?;
        debug!(id = %post.id, "post created");
        require_id(&url, post)
    }

    #[instrument(skip_all, fields(username = %draft.username))]
    async fn create_user(&self, draft: &User) -> Result<Author, RemoteError> {
        let url = self.endpoint("users")?;
        let request = self.client.post(url.clone()).json(draft);
        let author: Author = self.send(url.clone(), request).await?;
        debug!(id = %author.id, "user created");
        require_id(&url, author)
    }

    #[instrument(skip_all)]
    async fn fetch_posts(&self) -> Result<Vec<Post>, RemoteError> {
        let url = self.endpoint("posts")?;
        let request = self.client.get(url.clone());
        let posts: Vec<Post> = self.send(url.clone(), request).await?;
        debug!(count = posts.len(), "posts fetched");
        posts
            .into_iter()
            .map(|post| require_id(&url, post))
            .collect()
    }
}
