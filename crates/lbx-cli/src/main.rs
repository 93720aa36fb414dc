use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lbx_core::ScrapeOptions;
use lbx_sync::{SyncConfig, SyncService};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "lbx-cli")]
#[command(about = "Letterboxd sync pipeline command-line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the JSON API.
    Serve,
    /// Check whether a Letterboxd username exists.
    Validate { username: String },
    /// Start a sync and poll it until it finishes or the deadline passes.
    Sync { username: String },
    /// Scrape immediately without tracking a job.
    Scrape {
        username: String,
        /// Use the scraper's quick preset.
        #[arg(long, conflicts_with_all = ["limit", "no_ratings", "no_watchlist"])]
        quick: bool,
        /// Ratings to fetch; values outside 1..=1000 are clamped.
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
        #[arg(long)]
        no_ratings: bool,
        #[arg(long)]
        no_watchlist: bool,
    },
    /// Check scraper availability; exits non-zero when unavailable.
    Health,
    /// Print the integration's service status.
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = SyncConfig::from_env();
    let service = config.build_service().context("building sync service")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config, service).await?,
        Commands::Validate { username } => {
            print_json(&service.validate_user(&username).await?)?;
        }
        Commands::Sync { username } => {
            let outcome = service.sync_and_wait(&username).await?;
            info!(polls = outcome.polls, status = %outcome.job.status(), "sync finished");
            print_json(&outcome.job)?;
        }
        Commands::Scrape {
            username,
            quick,
            limit,
            no_ratings,
            no_watchlist,
        } => {
            let options = (!quick).then(|| {
                let options = ScrapeOptions {
                    include_ratings: !no_ratings,
                    include_watchlist: !no_watchlist,
                    ..ScrapeOptions::default()
                };
                match limit {
                    Some(limit) => options.with_rating_limit(limit),
                    None => options,
                }
            });
            print_json(&service.scrape_now(&username, options).await?)?;
        }
        Commands::Health => {
            let health = service.check_health().await;
            print_json(&health)?;
            if !health.available {
                bail!("scraper service is unavailable");
            }
        }
        Commands::Status => {
            print_json(&service.service_status().await)?;
        }
    }

    Ok(())
}

async fn serve(config: &SyncConfig, service: SyncService) -> Result<()> {
    service.check_health().await;
    let _scheduler = if config.health_scheduler_enabled {
        Some(
            service
                .health_monitor()
                .schedule(&config.health_cron)
                .await?,
        )
    } else {
        None
    };
    lbx_web::serve(lbx_web::AppState::new(service), config.web_port).await
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{text}");
    Ok(())
}
