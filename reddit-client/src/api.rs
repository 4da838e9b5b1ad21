use async_trait::async_trait;
use chrono::{DateTime, Utc};
use karmacheck_core::{CoreError, FeedError, FeedSource, Post};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const REDDIT_BASE_URL: &str = "https://www.reddit.com";

#[derive(Debug, Clone, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    pub author: String,
    pub subreddit: String,
    pub permalink: String,
    pub created_utc: f64,
}

#[derive(Debug, Clone)]
pub struct RedditFeedClient {
    http_client: Client,
    base_url: String,
}

impl RedditFeedClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: REDDIT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different origin; used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn listing_url(&self, subreddit: &str) -> String {
        format!("{}/r/{}/new.json", self.base_url, subreddit)
    }

    async fn get_new_posts(
        &self,
        subreddit: &str,
        limit: usize,
    ) -> Result<RedditListing<RedditPostData>, FeedError> {
        let url = self.listing_url(subreddit);
        let limit_str = limit.to_string();

        debug!("Polling r/{}: GET {}", subreddit, url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("limit", limit_str.as_str()), ("raw_json", "1")])
            .send()
            .await
            .map_err(|e| {
                error!("Network error for r/{}: {}", subreddit, e);
                if e.is_timeout() {
                    FeedError::RequestTimeout
                } else {
                    FeedError::Transport {
                        details: e.to_string(),
                    }
                }
            })?;

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        check_status(response.status(), retry_after, subreddit)?;

        let body = response.text().await.map_err(|e| FeedError::Transport {
            details: e.to_string(),
        })?;
        parse_listing(&body, subreddit)
    }
}

/// Map a non-success HTTP status onto the feed error taxonomy.
pub fn check_status(
    status: StatusCode,
    retry_after: Option<u64>,
    subreddit: &str,
) -> Result<(), FeedError> {
    if status.is_success() {
        return Ok(());
    }
    error!("Request for r/{} failed with status: {}", subreddit, status);

    match status.as_u16() {
        429 => {
            let retry_after = retry_after.unwrap_or(60);
            warn!("Rate limited, retry after {} seconds", retry_after);
            Err(FeedError::RateLimitExceeded { retry_after })
        }
        403 => Err(FeedError::Forbidden {
            resource: format!("r/{}", subreddit),
        }),
        404 => Err(FeedError::SubredditNotFound {
            subreddit: subreddit.to_string(),
        }),
        code if status.is_server_error() => Err(FeedError::ServerError { status_code: code }),
        code => Err(FeedError::InvalidResponse {
            details: format!("unexpected status {}", code),
        }),
    }
}

/// Parse a `/new.json` listing body. Reddit answers unknown subreddits with a
/// search redirect or an empty listing rather than always 404ing, so a body
/// that is not a listing is an invalid response.
pub fn parse_listing(
    body: &str,
    subreddit: &str,
) -> Result<RedditListing<RedditPostData>, FeedError> {
    serde_json::from_str(body).map_err(|e| {
        error!("Failed to parse listing for r/{}: {}", subreddit, e);
        FeedError::InvalidResponse {
            details: format!("Failed to parse posts for r/{}", subreddit),
        }
    })
}

#[async_trait]
impl FeedSource for RedditFeedClient {
    async fn fetch_latest(&self, subreddit: &str, limit: usize) -> Result<Vec<Post>, CoreError> {
        let listing = self.get_new_posts(subreddit, limit).await?;

        let posts: Vec<Post> = listing
            .data
            .children
            .into_iter()
            .filter(|child| child.kind == "t3")
            .map(|child| child.data.into_post(&self.base_url))
            .take(limit)
            .collect();

        info!("Retrieved {} posts from r/{}", posts.len(), subreddit);
        Ok(posts)
    }
}

impl RedditPostData {
    /// Convert to a [`Post`], making the permalink absolute against `base_url`.
    pub fn into_post(self, base_url: &str) -> Post {
        let permalink = if self.permalink.starts_with("http") {
            self.permalink
        } else {
            format!("{}{}", base_url, self.permalink)
        };

        Post {
            id: self.id,
            author: self.author,
            title: self.title,
            subreddit: self.subreddit,
            permalink,
            created_utc: DateTime::<Utc>::from_timestamp(self.created_utc as i64, 0)
                .unwrap_or_default(),
        }
    }
}

impl From<RedditPostData> for Post {
    fn from(post_data: RedditPostData) -> Self {
        post_data.into_post(REDDIT_BASE_URL)
    }
}
