//! Repost detection against KarmaDecay.
//!
//! [`KarmaDecayClient`] implements the core `RepostLookup` trait by scraping
//! the KarmaDecay result page for a Reddit permalink, and [`ConfidenceScorer`]
//! decides whether the scraped comment is strong enough to report.

pub mod confidence;
pub mod karma_decay;

pub use confidence::{count_links, Confidence, ConfidenceScorer};
pub use karma_decay::{extract_comment, validate_permalink, KarmaDecayClient, KARMA_DECAY_BASE_URL};
