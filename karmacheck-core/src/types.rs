use chrono::{DateTime, Utc};

/// A single feed entry. Immutable once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub author: String,
    pub title: String,
    pub subreddit: String,
    /// Absolute URL of the post's comment page.
    pub permalink: String,
    pub created_utc: DateTime<Utc>,
}

impl Post {
    /// Identifier used for deduplication. Titles collide, permalinks don't.
    pub fn dedup_key(&self) -> &str {
        &self.permalink
    }
}

/// What a tracker does when its feed comes back without any posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyFeedPolicy {
    /// Treat it as an empty batch and poll again next cycle.
    #[default]
    Ignore,
    /// Treat it as a dead feed and stop the tracker.
    Fatal,
}

/// The binary was started without any arguments.
pub const EXIT_NO_ARGS: i32 = 1;
/// Missing or invalid subreddit list, or an unusable config file.
pub const EXIT_INVALID_CONFIG: i32 = 2;
/// The supervisor found a tracker that stopped running.
pub const EXIT_DEAD_TRACKER: i32 = 3;
