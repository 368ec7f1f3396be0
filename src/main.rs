use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use emotion_analyzer::config::{Config, DEFAULT_CHANNEL, DEFAULT_KEYWORD, DEFAULT_LIMIT};
use emotion_analyzer::output;
use emotion_analyzer::pipeline::analysis::AnalysisPipeline;
use emotion_analyzer::reddit::client::RedditClient;
use emotion_analyzer::sentiment::classifier::SentimentClassifier;
use emotion_analyzer::sentiment::vader::VaderScorer;

/// Emotion analyzer: what is the mood of a subreddit's hot posts?
///
/// Pulls the hottest posts from a subreddit, keeps the ones whose title
/// mentions a keyword, and labels each title positive, negative or neutral.
#[derive(Parser)]
#[command(name = "emotion-analyzer", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a subreddit and print the results in the terminal
    Analyze {
        /// Subreddit to analyze (with or without the r/ prefix)
        #[arg(default_value = DEFAULT_CHANNEL)]
        channel: String,

        /// Only keep posts whose title contains this (case-insensitive); empty keeps all
        #[arg(long, short, default_value = DEFAULT_KEYWORD)]
        keyword: String,

        /// Number of hot posts to pull before filtering
        #[arg(long, short, default_value_t = DEFAULT_LIMIT, value_parser = parse_limit)]
        limit: usize,

        /// Print machine-readable JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Serve the web UI
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8501")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("emotion_analyzer=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            channel,
            keyword,
            limit,
            json,
        } => {
            let config = Config::load()?;
            let pipeline = build_pipeline(&config)?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message("Analyzing posts...");
            spinner.enable_steady_tick(Duration::from_millis(100));

            let result = pipeline.analyze(&channel, &keyword, limit).await;
            spinner.finish_and_clear();

            let analysis =
                result.with_context(|| format!("Could not analyze r/{channel}"))?;

            if json {
                let payload = serde_json::json!({
                    "channel": channel,
                    "keyword": keyword,
                    "limit": limit,
                    "posts": analysis.posts,
                    "counts": output::emotion_counts(&analysis.posts),
                    "fetched": analysis.fetched,
                    "skipped": analysis.skipped,
                    "analyzed_at": analysis.analyzed_at,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                output::terminal::display_analysis(&analysis, &channel, &keyword);
            }
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            let pipeline = build_pipeline(&config)?;
            let cache = emotion_analyzer::pipeline::cache::AnalysisCache::with_ttl(config.cache_ttl);

            match config.cache_ttl {
                Some(ttl) => info!(ttl_secs = ttl.as_secs(), "Caching analyses with TTL"),
                None => info!("Caching analyses for the lifetime of the process"),
            }

            let state = emotion_analyzer::web::AppState::new(pipeline, cache);
            emotion_analyzer::web::run_server(state, port, &bind).await?;
        }
    }

    Ok(())
}

/// Build the production pipeline: Reddit as the source, VADER as the scorer.
fn build_pipeline(config: &Config) -> Result<AnalysisPipeline> {
    config.require_reddit()?;

    let client = RedditClient::with_endpoints(
        config.reddit_credentials(),
        &config.reddit_auth_url,
        &config.reddit_api_url,
    )
    .context("Failed to create Reddit client")?;

    info!(user_agent = %config.reddit_user_agent, "Using Reddit OAuth source with VADER scorer");

    let classifier = SentimentClassifier::new(Arc::new(VaderScorer::new()));
    Ok(AnalysisPipeline::new(Arc::new(client), classifier))
}

/// Accept any positive post count; the 5–100 range only applies to the web UI.
fn parse_limit(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("limit must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("not a positive integer: {e}")),
    }
}
