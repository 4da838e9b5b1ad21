pub mod report;
pub mod seen;
pub mod supervisor;
pub mod tracker;

pub use report::ConsoleReportSink;
pub use seen::SeenPostStore;
pub use supervisor::{FleetFailure, TrackerSupervisor};
pub use tracker::{
    PostOutcome, SubredditTracker, TrackerHandle, TrackerSettings, TrackerState, TrackerStats,
};

use std::sync::Arc;

use karmacheck_core::{AppConfig, FeedSource, ReportSink, RepostLookup};
use tokio::task::JoinHandle;
use tracing::info;

/// Spawn one tracker task per configured subreddit and return the supervisor
/// watching them together with the task handles.
pub fn spawn_fleet(
    config: &AppConfig,
    feed: Arc<dyn FeedSource>,
    lookup: Arc<dyn RepostLookup>,
    sink: Arc<dyn ReportSink>,
) -> (TrackerSupervisor, Vec<JoinHandle<SubredditTracker>>) {
    let settings = TrackerSettings::from(config);
    let mut handles = Vec::with_capacity(config.subreddits.len());
    let mut tasks = Vec::with_capacity(config.subreddits.len());

    info!("Starting repost trackers for subs: {:?}", config.subreddits);
    for subreddit in &config.subreddits {
        let mut tracker = SubredditTracker::new(
            subreddit.clone(),
            settings.clone(),
            Arc::clone(&feed),
            Arc::clone(&lookup),
            Arc::clone(&sink),
        );
        let handle = tracker.handle();
        let guard = handle.dead_on_drop();
        handles.push(handle);
        tasks.push(tokio::spawn(async move {
            let _guard = guard;
            let _ = tracker.run().await;
            tracker
        }));
    }

    let supervisor = TrackerSupervisor::new(handles, config.supervisor_interval())
        .with_verbose(config.verbose);
    (supervisor, tasks)
}
