use std::time::Duration;

use karmacheck_core::EXIT_DEAD_TRACKER;
use tokio::time::sleep;
use tracing::{debug, error};

use crate::tracker::TrackerHandle;

/// Snapshot taken when a sampling tick sees fewer live trackers than total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetFailure {
    pub live: usize,
    pub total: usize,
    pub dead: Vec<String>,
}

/// Watches a fixed fleet of trackers. It never restarts anything: a single
/// dead tracker takes the whole process down.
pub struct TrackerSupervisor {
    trackers: Vec<TrackerHandle>,
    interval: Duration,
    verbose: bool,
}

impl TrackerSupervisor {
    pub fn new(trackers: Vec<TrackerHandle>, interval: Duration) -> Self {
        Self {
            trackers,
            interval,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn total(&self) -> usize {
        self.trackers.len()
    }

    /// Count live trackers. Fails when any of them has died.
    pub fn sample(&self) -> Result<usize, FleetFailure> {
        let mut live = 0;
        let mut dead = Vec::new();
        for tracker in &self.trackers {
            if self.verbose {
                debug!("Checking tracker: r/{}", tracker.subreddit());
            }
            if tracker.is_alive() {
                live += 1;
            } else {
                dead.push(tracker.subreddit().to_string());
            }
        }

        if live < self.trackers.len() {
            return Err(FleetFailure {
                live,
                total: self.trackers.len(),
                dead,
            });
        }
        Ok(live)
    }

    /// Sample on every tick until the fleet degrades.
    pub async fn watch(&self) -> FleetFailure {
        loop {
            if let Err(failure) = self.sample() {
                return failure;
            }
            sleep(self.interval).await;
        }
    }

    /// Wait for the fleet to degrade and return the process exit code.
    pub async fn wait_for_exit(&self) -> i32 {
        let failure = self.watch().await;
        error!(
            live = failure.live,
            total = failure.total,
            dead = ?failure.dead,
            "One or more trackers have stopped running. Exiting."
        );
        EXIT_DEAD_TRACKER
    }

    /// Watch the fleet and exit the process once a tracker dies.
    pub async fn run(&self) {
        std::process::exit(self.wait_for_exit().await)
    }
}
