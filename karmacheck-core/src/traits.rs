//! Collaborator seams used by the tracker loop.
//!
//! Concrete network-backed implementations live in `reddit-client` and
//! `repost-lookup`; tests substitute in-memory fakes.

use async_trait::async_trait;

use crate::{CoreError, LookupError, Post};

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Most recent posts of `subreddit`, newest first, at most `limit` of them.
    async fn fetch_latest(&self, subreddit: &str, limit: usize) -> Result<Vec<Post>, CoreError>;
}

#[async_trait]
pub trait RepostLookup: Send + Sync {
    /// Look up similar posts for a Reddit permalink and return the response text.
    async fn lookup(&self, permalink: &str) -> Result<String, LookupError>;
}

pub trait ReportSink: Send + Sync {
    fn report(&self, post: &Post, response: &str);
}
