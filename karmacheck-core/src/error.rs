use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Failures while polling a subreddit feed. Every variant is fatal to the
/// tracker that hit it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    #[error("Subreddit not found: {subreddit}")]
    SubredditNotFound { subreddit: String },

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid feed response: {details}")]
    InvalidResponse { details: String },

    #[error("The subreddit r/{subreddit} does not appear to have any posts")]
    EmptySubreddit { subreddit: String },

    #[error("Transport failure: {details}")]
    Transport { details: String },
}

/// Outcome of a repost lookup that did not produce a usable response.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("KarmaDecay could not locate any media in the post")]
    NoMediaFound,

    #[error("KarmaDecay could not find any similar posts")]
    NoSimilarPosts,

    #[error("Malformed URL: {url}")]
    MalformedUrl { url: String },

    /// KarmaDecay answered, but with an HTTP error status.
    #[error("KarmaDecay answered with HTTP status {status}")]
    ServiceError { status: u16 },

    #[error("Lookup request timed out")]
    Timeout,

    #[error("Lookup transport failure: {details}")]
    Transport { details: String },
}

impl LookupError {
    /// Expected "nothing to report" outcomes of a normal check.
    pub fn is_content_miss(&self) -> bool {
        matches!(self, LookupError::NoMediaFound | LookupError::NoSimilarPosts)
    }

    /// The service could not be reached at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, LookupError::Timeout | LookupError::Transport { .. })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No subreddit specified")]
    NoSubreddit,

    #[error("Invalid subreddit: {name}")]
    InvalidSubreddit { name: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
