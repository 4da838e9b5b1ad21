use karmacheck_core::{Post, ReportSink};
use tracing::info;

/// Prints the ready-made reddit comment for a confident match to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReportSink;

impl ReportSink for ConsoleReportSink {
    fn report(&self, post: &Post, response: &str) {
        info!(
            subreddit = %post.subreddit,
            permalink = %post.permalink,
            "Repost match, comment text follows"
        );
        println!("{}", response);
    }
}
