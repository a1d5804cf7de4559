use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Anything that can live in a normalized collection.
pub trait Entity {
    /// The identifier the collection indexes this entity by.
    fn id(&self) -> &str;
}

/// A blog post.
///
/// A post built with [`Post::draft`] has an empty id; the remote service
/// assigns one when the draft is created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
}

impl Post {
    /// Create a draft post with no id, stamped with the current time.
    pub fn draft(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            body: body.into(),
            author_id: None,
            created: Utc::now(),
        }
    }

    /// Attribute the post to an author.
    #[must_use]
    pub fn by(mut self, author_id: impl Into<String>) -> Self {
        self.author_id = Some(author_id.into());
        self
    }
}

impl Entity for Post {
    fn id(&self) -> &str {
        &self.id
    }
}

/// An account record, as sent when signing up.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub username: String,
    pub password: String,
}

impl User {
    /// Create a sign-up draft with no id.
    pub fn draft(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A [`User`] without credentials.
///
/// Deserializing an author from a payload that still carries a `password`
/// field drops it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub username: String,
}

impl From<User> for Author {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

impl Entity for Author {
    fn id(&self) -> &str {
        &self.id
    }
}
