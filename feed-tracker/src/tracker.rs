//! Per-subreddit tracking loop.
//!
//! A tracker moves through `Initializing -> Running -> Dead`. The first poll
//! only whitelists what is already on the feed; every later poll looks up
//! posts it has not seen before and reports confident matches. Any feed
//! failure, or a lookup service that cannot be reached at all, kills the
//! tracker for good.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use karmacheck_core::{
    AppConfig, CoreError, EmptyFeedPolicy, ErrorExt, FeedError, FeedSource, LookupError, Post,
    ReportSink, RepostLookup,
};
use repost_lookup::ConfidenceScorer;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::seen::SeenPostStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TrackerState {
    Initializing = 0,
    Running = 1,
    Dead = 2,
}

impl TrackerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => TrackerState::Initializing,
            1 => TrackerState::Running,
            _ => TrackerState::Dead,
        }
    }
}

/// Read side of a tracker's liveness, handed to the supervisor.
///
/// Only the owning tracker writes the state; `Dead` is terminal.
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    subreddit: Arc<str>,
    state: Arc<AtomicU8>,
}

impl TrackerHandle {
    pub(crate) fn new(subreddit: &str) -> Self {
        Self {
            subreddit: Arc::from(subreddit),
            state: Arc::new(AtomicU8::new(TrackerState::Initializing as u8)),
        }
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    pub fn state(&self) -> TrackerState {
        TrackerState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_alive(&self) -> bool {
        self.state() != TrackerState::Dead
    }

    /// Initializing -> Running. Never resurrects a dead tracker.
    pub(crate) fn mark_running(&self) -> bool {
        self.state
            .compare_exchange(
                TrackerState::Initializing as u8,
                TrackerState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub(crate) fn mark_dead(&self) {
        self.state.store(TrackerState::Dead as u8, Ordering::Release);
    }

    /// Guard for the task driving this tracker.
    pub(crate) fn dead_on_drop(&self) -> DeadOnDrop {
        DeadOnDrop(self.clone())
    }
}

/// Marks the tracker dead when dropped. Held by the tracker task so a panic
/// or an aborted task still shows up as a dead tracker.
pub(crate) struct DeadOnDrop(TrackerHandle);

impl Drop for DeadOnDrop {
    fn drop(&mut self) {
        if self.0.is_alive() {
            error!(
                subreddit = %self.0.subreddit(),
                "Tracker task ended without shutting down cleanly"
            );
            self.0.mark_dead();
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrackerSettings {
    pub feed_limit: usize,
    pub seen_capacity: usize,
    pub poll_interval: Duration,
    pub lookup_delay: Duration,
    pub empty_feed_policy: EmptyFeedPolicy,
    pub confidence_threshold: usize,
    pub verbose: bool,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for TrackerSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            feed_limit: config.feed_limit,
            seen_capacity: config.seen_capacity,
            poll_interval: config.poll_interval(),
            lookup_delay: config.lookup_delay(),
            empty_feed_policy: config.empty_feed_policy,
            confidence_threshold: config.confidence_threshold,
            verbose: config.verbose,
        }
    }
}

/// What happened to a single unseen post.
#[derive(Debug, Clone, PartialEq)]
pub enum PostOutcome {
    Reported { links: usize },
    BelowThreshold { links: usize },
    /// No media or no similar posts.
    NoMatch(LookupError),
    /// Permalink not recognizably from Reddit, or KarmaDecay answered with an
    /// HTTP error for this post.
    Skipped(LookupError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerStats {
    pub polls: u64,
    pub lookups: u64,
    pub reported: u64,
    pub below_threshold: u64,
    pub no_match: u64,
    pub skipped: u64,
}

pub struct SubredditTracker {
    subreddit: String,
    seen: SeenPostStore,
    handle: TrackerHandle,
    settings: TrackerSettings,
    scorer: ConfidenceScorer,
    stats: TrackerStats,
    feed: Arc<dyn FeedSource>,
    lookup: Arc<dyn RepostLookup>,
    sink: Arc<dyn ReportSink>,
}

impl std::fmt::Debug for SubredditTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubredditTracker")
            .field("subreddit", &self.subreddit)
            .field("seen", &self.seen)
            .field("handle", &self.handle)
            .field("settings", &self.settings)
            .field("scorer", &self.scorer)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl SubredditTracker {
    pub fn new(
        subreddit: impl Into<String>,
        settings: TrackerSettings,
        feed: Arc<dyn FeedSource>,
        lookup: Arc<dyn RepostLookup>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        let subreddit = subreddit.into();
        Self {
            handle: TrackerHandle::new(&subreddit),
            seen: SeenPostStore::new(settings.seen_capacity),
            scorer: ConfidenceScorer::new(settings.confidence_threshold),
            stats: TrackerStats::default(),
            subreddit,
            settings,
            feed,
            lookup,
            sink,
        }
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    pub fn handle(&self) -> TrackerHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> TrackerState {
        self.handle.state()
    }

    pub fn seen(&self) -> &SeenPostStore {
        &self.seen
    }

    pub fn stats(&self) -> &TrackerStats {
        &self.stats
    }

    /// Drive the tracker until it dies. Returns the error that killed it; the
    /// seen history is left in place.
    pub async fn run(&mut self) -> CoreError {
        if self.settings.verbose {
            debug!(subreddit = %self.subreddit, "Whitelisting pre-existing entries");
        }
        if let Err(e) = self.initialize().await {
            error!(
                "Failed to initiate tracker for sub r/{}: {}",
                self.subreddit, e
            );
            return self.die(e);
        }
        info!("Subreddit tracker started for r/{}", self.subreddit);

        loop {
            if let Err(e) = self.poll_once().await {
                error!("Error polling results from sub r/{}: {}", self.subreddit, e);
                return self.die(e);
            }
            sleep(self.settings.poll_interval).await;
        }
    }

    /// Record every post on the feed without looking any of them up.
    pub async fn initialize(&mut self) -> Result<(), CoreError> {
        let posts = self.fetch().await?;
        for post in &posts {
            self.record(post);
        }
        self.handle.mark_running();
        debug!(
            subreddit = %self.subreddit,
            whitelisted = posts.len(),
            "Initial poll recorded"
        );
        Ok(())
    }

    /// One pass over the feed: look up each unseen post, throttled by
    /// `lookup_delay` between lookups.
    pub async fn poll_once(&mut self) -> Result<(), CoreError> {
        if self.settings.verbose {
            debug!("Polling subreddit: r/{}", self.subreddit);
        }
        let posts = self.fetch().await?;

        for post in &posts {
            if self.seen.contains_post(post) {
                continue;
            }

            let outcome = self.check_post(post).await;
            // Recorded whatever the outcome so a post is never looked up twice.
            self.record(post);

            if let Err(e) = outcome {
                return Err(CoreError::Lookup(e));
            }
            sleep(self.settings.lookup_delay).await;
        }
        Ok(())
    }

    /// Look up one post and report it if the response is confident. Only a
    /// transport failure of the lookup service is returned as an error.
    pub async fn check_post(&mut self, post: &Post) -> Result<PostOutcome, LookupError> {
        info!(
            subreddit = %self.subreddit,
            permalink = %post.permalink,
            author = %post.author,
            title = %post.title,
            created = %post.created_utc,
            "Checking post"
        );
        self.stats.lookups += 1;

        let outcome = match self.lookup.lookup(&post.permalink).await {
            Ok(response) => {
                let score = self.scorer.score(&response);
                if score.confident {
                    info!("Found matches. Below is the reddit comment text.");
                    self.sink.report(post, &response);
                    self.stats.reported += 1;
                    PostOutcome::Reported { links: score.links }
                } else {
                    info!(
                        links = score.links,
                        threshold = self.scorer.threshold(),
                        "KarmaDecay response scored below the confidence threshold"
                    );
                    self.stats.below_threshold += 1;
                    PostOutcome::BelowThreshold { links: score.links }
                }
            }
            Err(e) if e.is_content_miss() => {
                info!("{}", e);
                self.stats.no_match += 1;
                PostOutcome::NoMatch(e)
            }
            Err(e) if e.is_transport() => {
                e.log_error();
                return Err(e);
            }
            Err(e) => {
                e.log_warn();
                self.stats.skipped += 1;
                PostOutcome::Skipped(e)
            }
        };
        Ok(outcome)
    }

    async fn fetch(&mut self) -> Result<Vec<Post>, CoreError> {
        let limit = self.settings.feed_limit.max(1);
        let mut posts = self.feed.fetch_latest(&self.subreddit, limit).await?;
        self.stats.polls += 1;
        posts.truncate(limit);

        if posts.is_empty() {
            match self.settings.empty_feed_policy {
                EmptyFeedPolicy::Fatal => {
                    return Err(CoreError::Feed(FeedError::EmptySubreddit {
                        subreddit: self.subreddit.clone(),
                    }));
                }
                EmptyFeedPolicy::Ignore => {
                    warn!("r/{} returned no posts", self.subreddit);
                }
            }
        }
        Ok(posts)
    }

    fn record(&mut self, post: &Post) {
        self.seen.record(post);
        if self.settings.verbose {
            debug!("Recorded Entry: {}", post.title);
        }
    }

    fn die(&self, error: CoreError) -> CoreError {
        self.handle.mark_dead();
        warn!(
            subreddit = %self.subreddit,
            code = %error.error_code(),
            stats = ?self.stats,
            "Tracker stopped"
        );
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_state_is_monotonic() {
        let handle = TrackerHandle::new("pics");
        assert_eq!(handle.state(), TrackerState::Initializing);
        assert!(handle.is_alive());

        assert!(handle.mark_running());
        assert_eq!(handle.state(), TrackerState::Running);

        handle.mark_dead();
        assert!(!handle.is_alive());
        assert!(!handle.mark_running());
        assert_eq!(handle.state(), TrackerState::Dead);
    }

    #[test]
    fn test_handle_clones_share_state() {
        let handle = TrackerHandle::new("pics");
        let observer = handle.clone();
        handle.mark_dead();
        assert_eq!(observer.state(), TrackerState::Dead);
        assert_eq!(observer.subreddit(), "pics");
    }

    #[test]
    fn test_dead_on_drop_marks_unfinished_tracker() {
        let handle = TrackerHandle::new("pics");
        handle.mark_running();

        let guard = handle.dead_on_drop();
        assert_eq!(handle.state(), TrackerState::Running);
        drop(guard);
        assert_eq!(handle.state(), TrackerState::Dead);
    }

    #[tokio::test]
    async fn test_dead_on_drop_survives_panicking_task() {
        let handle = TrackerHandle::new("pics");
        let guard = handle.dead_on_drop();

        let task = tokio::spawn(async move {
            let _guard = guard;
            panic!("collaborator blew up");
        });

        assert!(task.await.unwrap_err().is_panic());
        assert!(!handle.is_alive());
    }

    #[test]
    fn test_settings_from_config() {
        let config = AppConfig {
            lookup_delay_secs: 3,
            verbose: true,
            ..AppConfig::default()
        };
        let settings = TrackerSettings::from(&config);
        assert_eq!(settings.lookup_delay, Duration::from_secs(3));
        assert_eq!(settings.feed_limit, 10);
        assert!(settings.verbose);
    }
}
