//! CLI administration tool for link-allocator.
//!
//! Manages owners and their quota counters, inspects and removes short codes,
//! and checks the database without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create an owner
//! cargo run --bin admin -- owner create --tier basic
//!
//! # Start a new accounting period for an owner
//! cargo run --bin admin -- owner reset-quota 42 -y
//!
//! # Inspect or delete a short code
//! cargo run --bin admin -- link show go-docs
//! cargo run --bin admin -- link delete go-docs
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use link_allocator::domain::entities::{NewOwner, Owner, SubscriptionTier};
use link_allocator::domain::repositories::{OwnerRepository, ShortCodeRepository};
use link_allocator::infrastructure::persistence::{PgOwnerRepository, PgRecordRepository};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Select};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing link-allocator.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage owners and quotas
    Owner {
        #[command(subcommand)]
        action: OwnerAction,
    },

    /// Inspect and delete short codes
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show record counts
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum OwnerAction {
    /// Create a new owner
    Create {
        /// Subscription tier: free, basic, premium, enterprise
        #[arg(short, long)]
        tier: Option<SubscriptionTier>,

        /// Quota ceiling (defaults to the tier's ceiling)
        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// Show an owner and its quota usage
    Show { id: i64 },

    /// Reset quota usage to zero for a new period
    ResetQuota {
        id: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Show a short code record
    Show { code: String },

    /// Delete a short code, freeing it for reuse
    Delete {
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

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

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    let result = match cli.command {
        Commands::Owner { action } => handle_owner_action(action, &pool).await,
        Commands::Link { action } => handle_link_action(action, &pool).await,
        Commands::Stats => handle_stats(&pool).await,
        Commands::Db { action } => handle_db_action(action, &pool).await,
    };

    pool.close().await;
    result
}

async fn handle_owner_action(action: OwnerAction, pool: &PgPool) -> Result<()> {
    let repo = PgOwnerRepository::new(Arc::new(pool.clone()));

    match action {
        OwnerAction::Create { tier, limit } => create_owner(&repo, tier, limit).await,
        OwnerAction::Show { id } => {
            let owner = repo
                .find_by_id(id)
                .await
                .map_err(|e| anyhow::anyhow!("Database error: {e}"))?
                .with_context(|| format!("Owner {id} not found"))?;

            print_owner(&owner);
            Ok(())
        }
        OwnerAction::ResetQuota { id, yes } => reset_quota(&repo, id, yes).await,
    }
}

/// Creates an owner, prompting for the tier when not given.
async fn create_owner(
    repo: &PgOwnerRepository,
    tier: Option<SubscriptionTier>,
    limit: Option<i64>,
) -> Result<()> {
    println!("{}", "Create Owner".bright_blue().bold());
    println!();

    let tier = match tier {
        Some(tier) => tier,
        None => {
            let tiers = [
                SubscriptionTier::Free,
                SubscriptionTier::Basic,
                SubscriptionTier::Premium,
                SubscriptionTier::Enterprise,
            ];
            let index = Select::new()
                .with_prompt("Subscription tier")
                .items(&tiers.map(|t| t.as_str()))
                .default(0)
                .interact()?;
            tiers[index]
        }
    };

    let mut new_owner = NewOwner::with_tier(tier);
    if let Some(limit) = limit {
        anyhow::ensure!(limit >= 0, "Quota limit must not be negative");
        new_owner.quota_limit = limit;
    }

    let owner = repo
        .create(new_owner)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create owner: {e}"))?;

    println!("{}", "✅ Owner created".green().bold());
    println!();
    print_owner(&owner);
    println!("{}", "Send this id upstream as:".bright_white());
    println!("  {}: {}", "X-Owner-Id".bright_cyan(), owner.id.to_string().bright_yellow());
    println!();

    Ok(())
}

async fn reset_quota(repo: &PgOwnerRepository, id: i64, skip_confirm: bool) -> Result<()> {
    let owner = repo
        .find_by_id(id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {e}"))?
        .with_context(|| format!("Owner {id} not found"))?;

    print_owner(&owner);

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Reset quota usage to 0?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let reset = repo
        .reset_quota(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to reset quota: {e}"))?;

    anyhow::ensure!(reset, "Owner {id} disappeared before the reset");

    println!("{}", "✅ Quota reset".green().bold());
    Ok(())
}

fn print_owner(owner: &Owner) {
    let limit = if owner.tier.is_unlimited() {
        "unlimited".to_string()
    } else {
        owner.quota_limit.to_string()
    };

    println!("  ID:      {}", owner.id.to_string().cyan());
    println!("  Tier:    {}", owner.tier.as_str().cyan());
    println!(
        "  Quota:   {} / {}",
        owner.quota_used.to_string().bright_white().bold(),
        limit
    );
    println!(
        "  Created: {}",
        owner
            .created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!();
}

async fn handle_link_action(action: LinkAction, pool: &PgPool) -> Result<()> {
    let repo = PgRecordRepository::new(Arc::new(pool.clone()));

    match action {
        LinkAction::Show { code } => {
            let record = repo
                .find_by_code(&code)
                .await
                .map_err(|e| anyhow::anyhow!("Database error: {e}"))?
                .with_context(|| format!("Short code '{code}' not found"))?;

            let status = if record.is_expired() {
                "EXPIRED".red()
            } else {
                "ACTIVE".green()
            };

            println!("  Code:    {}", record.short_code.cyan());
            println!("  URL:     {}", record.original_url);
            println!(
                "  Owner:   {}",
                record
                    .owner_id
                    .map_or_else(|| "anonymous".to_string(), |id| id.to_string())
            );
            println!("  Clicks:  {}", record.clicks);
            println!("  Created: {}", record.created_at.format("%Y-%m-%d %H:%M"));
            println!(
                "  Expires: {}",
                record
                    .expires_at
                    .map_or_else(|| "never".to_string(), |e| e.format("%Y-%m-%d %H:%M").to_string())
            );
            println!("  Status:  {status}");
            println!();
        }
        LinkAction::Delete { code, yes } => {
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete short code '{code}'? It can then be reallocated."))
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "Cancelled".red());
                    return Ok(());
                }
            }

            let deleted = repo
                .delete(&code)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to delete: {e}"))?;

            if deleted {
                println!("{}", "✅ Short code deleted".green().bold());
            } else {
                println!("{}", format!("Short code '{code}' not found").yellow());
            }
        }
    }

    Ok(())
}

/// Displays owner and record counts.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let owners: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM owners")
        .fetch_one(pool)
        .await?;

    let records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM short_codes")
        .fetch_one(pool)
        .await?;

    let expired: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM short_codes WHERE expires_at <= NOW()")
            .fetch_one(pool)
            .await?;

    println!("  Owners:      {}", owners.to_string().bright_green().bold());
    println!("  Short codes: {}", records.to_string().bright_green().bold());
    println!("  Expired:     {}", expired.to_string().bright_black());
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
