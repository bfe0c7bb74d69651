//! CLI administration tool for the shortener service.
//!
//! Inspects the database without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # Show database info
//! cargo run --bin admin -- db info
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Inspect a short code
//! cargo run --bin admin -- lookup Ab3dE9xQ
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` components, as for the server

use shortener_service::config::mask_connection_string;
use shortener_service::domain::repositories::{ClickRepository, UrlRepository};
use shortener_service::infrastructure::persistence::{PgClickRepository, PgUrlRepository};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for inspecting the shortener service.
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
    /// Show statistics
    Stats,

    /// Show a short code, its target and click count
    Lookup {
        /// Short code or alias
        code: String,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = database_url()?;
    let pool = PgPool::connect(&database_url)
        .await
        .with_context(|| {
            format!(
                "Failed to connect to database at {}",
                mask_connection_string(&database_url)
            )
        })?;
    let pool = Arc::new(pool);

    match cli.command {
        Commands::Stats => handle_stats(pool).await?,
        Commands::Lookup { code } => handle_lookup(pool, &code).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Reads `DATABASE_URL`, falling back to the `DB_*` components.
fn database_url() -> Result<String> {
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return Ok(url);
    }

    let config = shortener_service::config::Config::from_env()
        .context("DATABASE_URL or DB_USER/DB_PASSWORD/DB_NAME must be set")?;
    Ok(config.database_url)
}

/// Displays link and click totals.
async fn handle_stats(pool: Arc<PgPool>) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let urls = PgUrlRepository::new(pool.clone());
    let clicks = PgClickRepository::new(pool.clone());

    let urls_count = urls
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;
    let clicks_count = clicks
        .count(None)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    let expired_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM urls WHERE expires_at IS NOT NULL AND expires_at < NOW()")
            .fetch_one(pool.as_ref())
            .await?;

    println!(
        "  Short URLs:    {}",
        urls_count.to_string().bright_green().bold()
    );
    println!(
        "  Expired:       {}",
        expired_count.to_string().yellow().bold()
    );
    println!(
        "  Clicks:        {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Prints a single mapping.
async fn handle_lookup(pool: Arc<PgPool>, code: &str) -> Result<()> {
    let urls = PgUrlRepository::new(pool.clone());
    let clicks = PgClickRepository::new(pool);

    let record = urls
        .find_by_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    let Some(record) = record else {
        println!("{} {}", "❌ Not found:".red(), code);
        return Ok(());
    };

    let click_count = clicks
        .count(Some(record.short_code.clone()))
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    let status = if record.is_expired_at(Utc::now()) {
        "expired".red()
    } else {
        "active".green()
    };

    println!("{}", "🔗 Short URL".bright_blue().bold());
    println!();
    println!("  Code:     {}", record.short_code.cyan());
    println!("  Target:   {}", record.original_url.bright_white());
    println!("  Status:   {}", status);
    println!("  Created:  {}", record.created_at.to_rfc3339());
    match record.expires_at {
        Some(expires_at) => println!("  Expires:  {}", expires_at.to_rfc3339()),
        None => println!("  Expires:  {}", "never".bright_black()),
    }
    println!("  Clicks:   {}", click_count.to_string().bright_green());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
