use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::{ConfigError, EmptyFeedPolicy};

pub const DEFAULT_FEED_LIMIT: usize = 10;
pub const DEFAULT_SEEN_CAPACITY: usize = 100;
pub const DEFAULT_CONFIDENCE_THRESHOLD: usize = 2;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub subreddits: Vec<String>,
    pub verbose: bool,
    pub feed_limit: usize,
    pub seen_capacity: usize,
    pub confidence_threshold: usize,
    pub poll_interval_secs: u64,
    pub lookup_delay_secs: u64,
    pub supervisor_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub empty_feed_policy: EmptyFeedPolicy,
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            subreddits: Vec::new(),
            verbose: false,
            feed_limit: DEFAULT_FEED_LIMIT,
            seen_capacity: DEFAULT_SEEN_CAPACITY,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            poll_interval_secs: 30,
            lookup_delay_secs: 10,
            supervisor_interval_secs: 5,
            request_timeout_secs: 60,
            empty_feed_policy: EmptyFeedPolicy::Ignore,
            user_agent: format!("karmacheck/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file. When `required` is false a missing file yields defaults.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        if !path.exists() {
            if required {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            value: format!("{}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(raw)?;
        Ok(config)
    }

    /// Replace the subreddit list from a comma separated CLI argument.
    pub fn with_subreddit_arg(mut self, arg: &str) -> Result<Self, ConfigError> {
        self.subreddits = parse_subreddits(arg)?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subreddits.is_empty() {
            return Err(ConfigError::NoSubreddit);
        }
        for name in &self.subreddits {
            if !is_valid_subreddit(name) {
                return Err(ConfigError::InvalidSubreddit { name: name.clone() });
            }
        }
        for (field, value) in [
            ("feed_limit", self.feed_limit as u64),
            ("seen_capacity", self.seen_capacity as u64),
            ("confidence_threshold", self.confidence_threshold as u64),
            ("poll_interval_secs", self.poll_interval_secs),
            ("supervisor_interval_secs", self.supervisor_interval_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }
        if self.seen_capacity < self.feed_limit {
            return Err(ConfigError::ValidationFailed {
                reason: format!(
                    "seen_capacity ({}) must hold at least one full poll ({})",
                    self.seen_capacity, self.feed_limit
                ),
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn lookup_delay(&self) -> Duration {
        Duration::from_secs(self.lookup_delay_secs)
    }

    pub fn supervisor_interval(&self) -> Duration {
        Duration::from_secs(self.supervisor_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Split a comma separated list of subreddits, stripping an optional `r/` prefix.
pub fn parse_subreddits(arg: &str) -> Result<Vec<String>, ConfigError> {
    let mut subs = Vec::new();
    for part in arg.split(',') {
        let name = part.trim();
        let name = name
            .strip_prefix("/r/")
            .or_else(|| name.strip_prefix("r/"))
            .unwrap_or(name);
        if name.is_empty() {
            continue;
        }
        if !is_valid_subreddit(name) {
            return Err(ConfigError::InvalidSubreddit {
                name: name.to_string(),
            });
        }
        if !subs.iter().any(|s: &String| s.eq_ignore_ascii_case(name)) {
            subs.push(name.to_string());
        }
    }
    if subs.is_empty() {
        return Err(ConfigError::NoSubreddit);
    }
    Ok(subs)
}

fn is_valid_subreddit(name: &str) -> bool {
    static NAME: OnceLock<Regex> = OnceLock::new();
    NAME.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]{2,21}$").expect("valid subreddit regex"))
        .is_match(name)
}
