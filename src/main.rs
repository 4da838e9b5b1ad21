use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use feed_tracker::{spawn_fleet, ConsoleReportSink};
use karmacheck_core::{
    AppConfig, ConfigError, CoreError, ErrorReporter, EXIT_INVALID_CONFIG, EXIT_NO_ARGS,
};
use reddit_client::RedditFeedClient;
use repost_lookup::KarmaDecayClient;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "karmacheck.toml";

/// KarmaCheck - watch subreddits for reposts using KarmaDecay
#[derive(Parser)]
#[command(name = "karmacheck", version, about)]
struct Cli {
    /// Comma separated list of subs to watch
    #[arg(short, long)]
    subreddits: Option<String>,

    /// Path to config file [default: karmacheck.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    if std::env::args_os().len() == 1 {
        let _ = Cli::command().print_help();
        process::exit(EXIT_NO_ARGS);
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            process::exit(EXIT_INVALID_CONFIG);
        }
        Err(e) => e.exit(),
    };

    let config = load_config(&cli);
    let verbose = cli.verbose || config.as_ref().map(|c| c.verbose).unwrap_or(false);
    init_tracing(verbose);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            ErrorReporter::new().report_error(&CoreError::Config(e));
            let _ = Cli::command().print_help();
            process::exit(EXIT_INVALID_CONFIG);
        }
    };

    tracing::info!("Starting KarmaCheck");
    if let Err(e) = run(config).await {
        tracing::error!("Startup failed: {:#}", e);
        process::exit(EXIT_INVALID_CONFIG);
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path, true)?,
        None => AppConfig::load(&PathBuf::from(DEFAULT_CONFIG_PATH), false)?,
    };

    if let Some(arg) = &cli.subreddits {
        config = config.with_subreddit_arg(arg)?;
    }
    config.verbose |= cli.verbose;
    config.validate()?;
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let default_filter = format!(
        "karmacheck={level},feed_tracker={level},reddit_client={level},repost_lookup={level},karmacheck_core={level}"
    );

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

/// Wire the collaborators, start one tracker per subreddit and hand control
/// to the supervisor, which only returns by exiting the process.
async fn run(config: AppConfig) -> anyhow::Result<()> {
    let feed = RedditFeedClient::new(&config.user_agent, config.request_timeout())
        .context("Failed to create Reddit client")?;
    let lookup = KarmaDecayClient::new(&config.user_agent, config.request_timeout())
        .context("Failed to create KarmaDecay client")?;

    let (supervisor, _tasks) = spawn_fleet(
        &config,
        Arc::new(feed),
        Arc::new(lookup),
        Arc::new(ConsoleReportSink),
    );
    supervisor.run().await;
    Ok(())
}
