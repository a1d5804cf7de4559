//! Seed posts the store starts with before the first fetch.

use crate::model::Post;
use chrono::{Duration, Utc};

fn seed(id: &str, title: &str, age: Duration) -> Post {
    Post {
        id: id.to_string(),
        title: title.to_string(),
        body: format!("Content of the post: {title}"),
        author_id: None,
        created: Utc::now() - age,
    }
}

/// A post created just now.
pub fn today() -> Post {
    seed("1", "Today", Duration::zero())
}

/// A post created earlier this week.
pub fn this_week() -> Post {
    seed("2", "This Week", Duration::days(2))
}

/// A post created earlier this month.
pub fn this_month() -> Post {
    seed("3", "This Month", Duration::weeks(2))
}

/// The three mock posts, newest first.
pub fn seed_posts() -> [Post; 3] {
    [today(), this_week(), this_month()]
}
