use std::collections::VecDeque;

use karmacheck_core::{Post, DEFAULT_SEEN_CAPACITY};

/// Bounded history of post identifiers a tracker has already handled.
///
/// Eviction is strictly FIFO by arrival: once full, recording a new post drops
/// the oldest one. Membership checks never reorder entries.
#[derive(Debug, Clone)]
pub struct SeenPostStore {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for SeenPostStore {
    fn default() -> Self {
        Self::new(DEFAULT_SEEN_CAPACITY)
    }
}

impl SeenPostStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|seen| seen == id)
    }

    pub fn contains_post(&self, post: &Post) -> bool {
        self.contains(post.dedup_key())
    }

    pub fn record(&mut self, post: &Post) {
        self.record_id(post.dedup_key());
    }

    /// Returns the evicted identifier, if any.
    pub fn record_id(&mut self, id: &str) -> Option<String> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(id.to_string());
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
