//! rota-post - post today's entry to Bluesky
//!
//! One invocation posts exactly one thing: a date-anchored post if one is
//! due today, otherwise a draw from the rotation pool. Meant to be run by
//! an external scheduler (cron, GitHub Actions); all state lives in the
//! files named by the configuration.

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use librotasky::error::StorageError;
use librotasky::platforms::bluesky::BlueskyClient;
use librotasky::store::{FilePostStore, FileRecencyStore};
use librotasky::{Config, Credentials, Result, Runner};

#[derive(Parser, Debug)]
#[command(name = "rota-post")]
#[command(version, about = "Post today's entry to Bluesky", long_about = r#"
Posts exactly one entry per invocation: the date-anchored post due today if
there is one, otherwise a random draw from the rotation pool that avoids
recently used posts.

Credentials come from the BLUESKY_HANDLE and BLUESKY_PASSWORD environment
variables. State file locations come from the config file (ROTASKY_CONFIG,
or ~/.config/rotasky/config.toml), defaulting to scheduled_posts.json,
posts.txt and bot_state.json in the working directory.

EXIT CODES:
    0 - a post went out (or --dry-run printed the candidate)
    1 - configuration, storage or posting failure
    2 - authentication failure
    3 - nothing available to post
"#)]
struct Cli {
    /// Config file path (overrides ROTASKY_CONFIG)
    #[arg(short, long, value_name = "FILE")]
    config: Option<std::path::PathBuf>,

    /// Run as if today were this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    date: Option<chrono::NaiveDate>,

    /// Print what would be posted without sending or writing anything
    #[arg(long)]
    dry_run: bool,

    /// Output format for the outcome (text or json)
    #[arg(short, long, default_value = "text")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    librotasky::logging::init_default(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Credentials first: a misconfigured job should fail before any state
    // file is opened
    let credentials = Credentials::from_env()?;

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    let (scheduled_path, pool_path, state_path) = config.storage.expanded();

    let today = cli
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    tracing::debug!("Running for {}", today);

    let posts = Box::new(FilePostStore::new(scheduled_path, pool_path));
    let recency = Box::new(FileRecencyStore::new(state_path));
    let rng = Box::new(StdRng::from_entropy());

    if cli.dry_run {
        // Selection only: no reset pass, no network, no writes
        let mut runner = Runner::new(
            posts,
            recency,
            Box::new(librotasky::platforms::mock::MockPlatform::success("dry-run")),
            rng,
        );
        let selection = runner.select(today)?;
        println!("{}", selection.text());
        return Ok(());
    }

    let platform = Box::new(BlueskyClient::new(credentials).await?);
    let mut runner = Runner::new(posts, recency, platform, rng);
    let outcome = runner.run(today).await?;

    match cli.format.as_str() {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&outcome).map_err(StorageError::Parse)?
        ),
        _ => println!("Posted: {}", outcome.post_id()),
    }

    Ok(())
}
