//! CLI administration tool for the shortener.
//!
//! Works directly against the configured storage backend, without going
//! through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Check which backend is selected and whether it answers
//! cargo run --bin admin -- ping
//!
//! # Shorten a URL on behalf of a user
//! cargo run --bin admin -- shorten https://example.com --user ops
//!
//! # Resolve a short ID
//! cargo run --bin admin -- resolve Ab3dE5gH
//!
//! # List a user's URLs
//! cargo run --bin admin -- list --user 7f1c0e52-...
//!
//! # Delete a user's URLs and wait for completion
//! cargo run --bin admin -- delete --user 7f1c0e52-... Ab3dE5gH x9Yz1kLm
//! ```
//!
//! # Environment Variables
//!
//! Same storage settings as the server: `DATABASE_DSN`, `FILE_STORAGE_PATH`,
//! `BASE_URL`, `SHORT_ID_LENGTH`, `DELETE_WORKERS`. The `-d` and `-f` flags
//! override them.

use shortener::application::services::{DeletePipeline, UrlService};
use shortener::config::Config;
use shortener::domain::repositories::UrlRepository;
use shortener::infrastructure::persistence::select_storage;
use shortener::utils::code_generator::RandomShortIdGenerator;
use shortener::utils::url_validator::check_url;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use std::sync::Arc;

/// CLI tool for managing the shortener's storage.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// PostgreSQL connection string (overrides DATABASE_DSN)
    #[arg(short = 'd', long = "database-dsn", global = true)]
    database_dsn: Option<String>,

    /// JSON storage file (overrides FILE_STORAGE_PATH)
    #[arg(short = 'f', long = "file-storage-path", global = true)]
    file_storage_path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Show the selected backend and check its connection
    Ping,

    /// Shorten a URL
    Shorten {
        url: String,

        /// Owner of the new short URL
        #[arg(short, long, default_value = "admin")]
        user: String,
    },

    /// Resolve a short ID to its original URL
    Resolve { short_id: String },

    /// List a user's live URLs
    List {
        /// User ID (prompted if omitted)
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Delete short IDs owned by a user
    Delete {
        /// Owner of the IDs
        #[arg(short, long)]
        user: String,

        #[arg(required = true)]
        short_ids: Vec<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(dsn) = cli.database_dsn {
        config.database_dsn = dsn;
    }
    if let Some(path) = cli.file_storage_path {
        config.file_storage_path = path;
    }
    config.validate()?;

    let repository = select_storage(
        &config.database_dsn,
        &config.file_storage_path,
        config.pg_pool_settings(),
    )
    .await;

    let service = UrlService::with_delete_workers(
        repository.clone(),
        Arc::new(RandomShortIdGenerator::new(config.short_id_length)),
        config.base_url.clone(),
        config.delete_workers,
    );

    let result = match cli.command {
        Commands::Ping => ping(&service).await,
        Commands::Shorten { url, user } => shorten(&service, &url, &user).await,
        Commands::Resolve { short_id } => resolve(&service, &short_id).await,
        Commands::List { user } => list(&service, user).await,
        Commands::Delete {
            user,
            short_ids,
            yes,
        } => delete(repository.clone(), config.delete_workers, user, short_ids, yes).await,
    };

    repository
        .close()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to close storage: {}", e))?;

    result
}

/// Prints the selected backend and its ping result.
async fn ping(service: &UrlService) -> Result<()> {
    println!("{}", "Storage check".bright_blue().bold());
    println!();
    println!("  Backend: {}", service.backend_name().cyan());

    match service.ping().await {
        Ok(()) => println!("  Status:  {}", "CONNECTED".green().bold()),
        Err(e) if e.is_ping_not_supported() => {
            println!("  Status:  {}", "NO DATABASE".yellow().bold())
        }
        Err(e) => {
            println!("  Status:  {}", "UNREACHABLE".red().bold());
            anyhow::bail!("Database ping failed: {}", e);
        }
    }

    println!();
    Ok(())
}

async fn shorten(service: &UrlService, url: &str, user: &str) -> Result<()> {
    check_url(url).map_err(|e| anyhow::anyhow!("Invalid URL: {}", e))?;

    let result = service
        .shorten(url, user)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to shorten URL: {}", e))?;

    if result.is_new {
        println!("{} {}", "Created".green().bold(), result.short_url.bright_yellow());
    } else {
        println!(
            "{} {}",
            "Already shortened".yellow().bold(),
            result.short_url.bright_yellow()
        );
    }

    Ok(())
}

async fn resolve(service: &UrlService, short_id: &str) -> Result<()> {
    match service.get(short_id).await {
        Some(url) => println!("  {} -> {}", short_id.cyan(), url),
        None => println!("  {} {}", short_id.cyan(), "not found".red()),
    }

    Ok(())
}

/// Lists a user's live URLs.
///
/// # Output Format
///
/// ```text
/// URLs for 7f1c0e52-...
///
///   Short URL                                Original URL
///   ----------------------------------------------------------------------
///   http://localhost:8080/Ab3dE5gH           https://example.com
/// ```
async fn list(service: &UrlService, user: Option<String>) -> Result<()> {
    let user = match user {
        Some(u) => u,
        None => Input::new().with_prompt("User ID").interact_text()?,
    };

    let urls = service
        .get_urls_by_user_id(&user)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list URLs: {}", e))?;

    println!("{} {}", "URLs for".bright_blue().bold(), user.cyan());
    println!();

    if urls.is_empty() {
        println!("{}", "  No URLs found".yellow());
        return Ok(());
    }

    println!(
        "  {:<40} {}",
        "Short URL".bright_white().bold(),
        "Original URL".bright_white().bold()
    );
    println!("  {}", "-".repeat(70).bright_black());

    for url in &urls {
        println!("  {:<40} {}", url.short_url.cyan(), url.original_url);
    }

    println!();
    println!("  Total: {}", urls.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Deletes IDs and waits for every worker to finish before returning.
///
/// Requires confirmation unless `--yes` is given.
async fn delete(
    repository: Arc<dyn UrlRepository>,
    workers: usize,
    user: String,
    short_ids: Vec<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "Delete URLs".bright_blue().bold());
    println!();
    println!("  Owner: {}", user.cyan());
    println!("  IDs:   {}", short_ids.join(", ").bright_black());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete these URLs?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let report = DeletePipeline::new(repository, workers)
        .submit(short_ids, user)
        .finished()
        .await
        .map_err(|e| anyhow::anyhow!("Delete pipeline failed: {}", e))?;

    if report.failed == 0 {
        println!(
            "{} {} processed",
            "Done:".green().bold(),
            report.attempted.to_string().bright_white()
        );
    } else {
        println!(
            "{} {} processed, {} failed",
            "Done with errors:".yellow().bold(),
            report.attempted,
            report.failed.to_string().red()
        );
    }
    println!("  IDs owned by other users are skipped silently.");
    println!();

    Ok(())
}
