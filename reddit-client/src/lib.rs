pub mod api;

#[cfg(test)]
mod tests;

pub use api::{RedditFeedClient, RedditListing, RedditPostData, REDDIT_BASE_URL};
