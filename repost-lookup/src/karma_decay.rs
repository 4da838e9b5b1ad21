use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use karmacheck_core::{CoreError, LookupError, RepostLookup};
use regex::Regex;
use reqwest::Client;
use tracing::{debug, error, info, warn};
use url::Url;

pub const KARMA_DECAY_BASE_URL: &str = "https://karmadecay.com";

/// Page text KarmaDecay shows when a post has no image or video.
const NO_CONTENT_MARKER: &str = "Unable to find an image";
/// KarmaDecay renders a ready-made reddit comment starting with "Anyone".
const COMMENT_PATTERN: &str = "Anyone[^<]*";
/// Present in every genuine comment; a post title can also match the pattern above.
const COMMENT_SOURCE_MARKER: &str = "[Source: karmadecay]";

fn comment_regex() -> &'static Regex {
    static COMMENT: OnceLock<Regex> = OnceLock::new();
    COMMENT.get_or_init(|| Regex::new(COMMENT_PATTERN).expect("valid comment regex"))
}

#[derive(Debug, Clone)]
pub struct KarmaDecayClient {
    http_client: Client,
    base_url: String,
}

impl KarmaDecayClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: KARMA_DECAY_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Swap the Reddit origin of `permalink` for the KarmaDecay one.
    pub fn lookup_url(&self, permalink: &str) -> Result<String, LookupError> {
        let parsed = validate_permalink(permalink)?;
        Ok(format!("{}{}", self.base_url, parsed.path()))
    }
}

/// Accept only http(s) URLs on reddit.com or one of its subdomains.
pub fn validate_permalink(permalink: &str) -> Result<Url, LookupError> {
    let malformed = || LookupError::MalformedUrl {
        url: permalink.to_string(),
    };

    let parsed = Url::parse(permalink).map_err(|_| malformed())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(malformed());
    }
    let host = parsed.host_str().ok_or_else(malformed)?;
    if host != "reddit.com" && !host.ends_with(".reddit.com") {
        return Err(malformed());
    }
    Ok(parsed)
}

/// Pull the reddit comment text out of a KarmaDecay result page.
pub fn extract_comment(page: &str) -> Result<String, LookupError> {
    if page.contains(NO_CONTENT_MARKER) {
        return Err(LookupError::NoMediaFound);
    }

    comment_regex()
        .find_iter(page)
        .map(|found| found.as_str())
        .find(|text| text.contains(COMMENT_SOURCE_MARKER))
        .map(|text| text.trim_end().to_string())
        .ok_or(LookupError::NoSimilarPosts)
}

#[async_trait]
impl RepostLookup for KarmaDecayClient {
    async fn lookup(&self, permalink: &str) -> Result<String, LookupError> {
        let url = self.lookup_url(permalink)?;
        info!("Checking KarmaDecay for: {}", url);

        // A post that really is OC can take 10-20 seconds to come back.
        let response = self.http_client.get(&url).send().await.map_err(|e| {
            error!("KarmaDecay request failed for {}: {}", url, e);
            if e.is_timeout() {
                LookupError::Timeout
            } else {
                LookupError::Transport {
                    details: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("KarmaDecay answered {} for {}", status, url);
            return Err(LookupError::ServiceError {
                status: status.as_u16(),
            });
        }

        let page = response.text().await.map_err(|e| LookupError::Transport {
            details: e.to_string(),
        })?;
        debug!("KarmaDecay returned {} bytes for {}", page.len(), url);

        extract_comment(&page)
    }
}
