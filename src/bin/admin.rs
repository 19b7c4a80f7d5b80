//! CLI administration tool for tinylink.
//!
//! Manages links and the database directly, without going through the
//! HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create the links table (same migrations the server applies on startup)
//! cargo run --bin admin -- db migrate
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # Create, inspect, list and delete links
//! cargo run --bin admin -- link create https://example.com/a/b --code promo24
//! cargo run --bin admin -- link show promo24
//! cargo run --bin admin -- link list --search example
//! cargo run --bin admin -- link delete promo24
//!
//! # View totals
//! cargo run --bin admin -- stats
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; `DATABASE_URL` (or the `DB_*` components) is required.

use tinylink::application::services::{LinkService, ShortenService};
use tinylink::config::{self, Config};
use tinylink::domain::entities::Link;
use tinylink::infrastructure::persistence::PgLinkRepository;
use tinylink::server::{MIGRATOR, connect_pool};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing tinylink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show totals
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Create a short link
    Create {
        /// Target URL (http or https)
        url: String,

        /// Custom code, 6-8 alphanumeric characters (generated if omitted)
        #[arg(short, long)]
        code: Option<String>,
    },

    /// List links, newest first
    List {
        /// Only show links whose code or URL contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one link with its click statistics
    Show {
        code: String,
    },

    /// Delete a link
    Delete {
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Apply pending schema migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let pool = connect_pool(&config).await?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &pool, &config).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    pool.close().await;

    Ok(())
}

/// Dispatches link management commands.
///
/// Degraded mode is never enabled here: a CLI user must see store failures.
async fn handle_link_action(action: LinkAction, pool: &PgPool, config: &Config) -> Result<()> {
    let repo = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));
    let shorten_service = ShortenService::new(repo.clone(), config.store_timeout());
    let link_service = LinkService::new(repo, config.store_timeout(), config.click_retry_attempts);

    match action {
        LinkAction::Create { url, code } => {
            let link = shorten_service
                .create_link(url, code)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?
                .into_link();

            println!("{}", "Link created".green().bold());
            println!();
            print_link(&link);
        }
        LinkAction::List { search } => {
            list_links(&link_service, search).await?;
        }
        LinkAction::Show { code } => {
            let link = link_service
                .get_link(&code)
                .await
                .map_err(|e| anyhow::anyhow!("{}: {}", code, e))?;

            print_link(&link);
        }
        LinkAction::Delete { code, yes } => {
            delete_link(&link_service, code, yes).await?;
        }
    }

    Ok(())
}

fn print_link(link: &Link) {
    let last = link
        .last_clicked
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    println!("  Code:         {}", link.code.bright_yellow().bold());
    println!("  Target:       {}", link.target_url.cyan());
    println!("  Clicks:       {}", link.clicks.to_string().bright_green());
    println!("  Last clicked: {}", last.bright_black());
    println!(
        "  Created:      {}",
        link.created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .bright_black()
    );
    println!();
}

/// Lists links in a table.
///
/// # Output Format
///
/// ```text
/// Links
///
///   Code      Clicks  Created           Target
///   ──────────────────────────────────────────────────────────────
///   aZ3k9Q    12      2025-01-15 10:30  https://example.com/a/b
/// ```
async fn list_links(link_service: &LinkService, search: Option<String>) -> Result<()> {
    let links = link_service
        .try_list_links(search)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    println!("{}", "Links".bright_blue().bold());
    println!();

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<9} {:<7} {:<17} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Created".bright_white().bold(),
        "Target".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &links {
        println!(
            "  {:<9} {:<7} {:<17} {}",
            link.code.cyan(),
            link.clicks,
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            link.target_url
        );
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Deletes a link after confirmation (default: No).
async fn delete_link(link_service: &LinkService, code: String, skip_confirm: bool) -> Result<()> {
    let link = link_service
        .get_link(&code)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", code, e))?;

    print_link(&link);

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let removed = link_service
        .delete_link(&code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    if removed == 0 {
        println!("{}", "Link was already deleted".yellow());
    } else {
        println!("{}", "Link deleted".green().bold());
    }

    Ok(())
}

/// Displays link and click totals.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let (links_count, clicks_count): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(clicks), 0)::bigint FROM links")
            .fetch_one(pool)
            .await
            .context("Failed to read statistics")?;

    println!(
        "  Links:  {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Clicks: {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Migrate => {
            println!("{}", "Applying migrations...".bright_blue());

            MIGRATOR
                .run(pool)
                .await
                .context("Failed to apply migrations")?;

            println!("{}", "links table ensured".green().bold());
        }
    }

    Ok(())
}
