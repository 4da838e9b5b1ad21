use crate::error::*;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Feed(e) => {
                error!("Feed error details: {:?}", e);
            }
            CoreError::Lookup(e) => {
                error!("Lookup error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            CoreError::Network(_) => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Feed(e) => e.user_friendly_message(),
            CoreError::Lookup(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::Feed(_) => "FEED".to_string(),
            CoreError::Lookup(_) => "LOOKUP".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
        }
    }
}

impl ErrorExt for FeedError {
    fn log_error(&self) -> &Self {
        error!("FeedError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("FeedError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            FeedError::SubredditNotFound { subreddit } => {
                format!("Subreddit '{}' not found or is private.", subreddit)
            }
            FeedError::Forbidden { resource } => format!(
                "Access denied to {}. The subreddit may be quarantined or banned.",
                resource
            ),
            FeedError::RateLimitExceeded { retry_after } => format!(
                "Too many requests to Reddit. Wait {} seconds before trying again.",
                retry_after
            ),
            FeedError::RequestTimeout => "Request to Reddit timed out.".to_string(),
            FeedError::EmptySubreddit { subreddit } => {
                format!("Subreddit '{}' returned no posts.", subreddit)
            }
            _ => "Reddit feed error occurred.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            FeedError::SubredditNotFound { .. } => "FEED_SUBREDDIT_NOT_FOUND".to_string(),
            FeedError::Forbidden { .. } => "FEED_FORBIDDEN".to_string(),
            FeedError::RateLimitExceeded { .. } => "FEED_RATE_LIMIT".to_string(),
            FeedError::ServerError { .. } => "FEED_SERVER_ERROR".to_string(),
            FeedError::RequestTimeout => "FEED_TIMEOUT".to_string(),
            FeedError::InvalidResponse { .. } => "FEED_INVALID_RESPONSE".to_string(),
            FeedError::EmptySubreddit { .. } => "FEED_EMPTY_SUBREDDIT".to_string(),
            FeedError::Transport { .. } => "FEED_TRANSPORT".to_string(),
        }
    }
}

impl ErrorExt for LookupError {
    fn log_error(&self) -> &Self {
        error!("LookupError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("LookupError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            LookupError::NoMediaFound => "The post has no media to compare.".to_string(),
            LookupError::NoSimilarPosts => "No similar posts were found.".to_string(),
            LookupError::MalformedUrl { url } => {
                format!("'{}' is not a Reddit permalink.", url)
            }
            LookupError::ServiceError { status } => {
                format!("KarmaDecay could not check the post (HTTP {}).", status)
            }
            LookupError::Timeout => "KarmaDecay took too long to respond.".to_string(),
            LookupError::Transport { .. } => "KarmaDecay could not be reached.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            LookupError::NoMediaFound => "LOOKUP_NO_MEDIA".to_string(),
            LookupError::NoSimilarPosts => "LOOKUP_NO_SIMILAR_POSTS".to_string(),
            LookupError::MalformedUrl { .. } => "LOOKUP_MALFORMED_URL".to_string(),
            LookupError::ServiceError { .. } => "LOOKUP_SERVICE_ERROR".to_string(),
            LookupError::Timeout => "LOOKUP_TIMEOUT".to_string(),
            LookupError::Transport { .. } => "LOOKUP_TRANSPORT".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::NoSubreddit => {
                "No subreddit specified. Pass a comma separated list with -s.".to_string()
            }
            ConfigError::InvalidSubreddit { name } => {
                format!("'{}' is not a valid subreddit name.", name)
            }
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            _ => "Configuration error occurred. Please check your settings.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::NoSubreddit => "CONFIG_NO_SUBREDDIT".to_string(),
            ConfigError::InvalidSubreddit { .. } => "CONFIG_INVALID_SUBREDDIT".to_string(),
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::ValidationFailed { .. } => "CONFIG_VALIDATION_FAILED".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

/// Logs an error together with its code and the message shown to operators.
#[derive(Debug, Default)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        info!("Error code: {}", error.error_code());
        info!("User message: {}", error.user_friendly_message());
    }
}
