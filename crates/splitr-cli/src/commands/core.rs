//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database with its config
//! - `resolve_user` - Look up (or register) the acting user
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use splitr_core::db::Database;
use splitr_core::models::User;
use splitr_core::SplitrConfig;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool, config_path: Option<&Path>) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow!("Database path is not valid UTF-8: {}", db_path.display()))?;
    let config = SplitrConfig::load(config_path).context("Failed to load configuration")?;

    let db = if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")?
    } else {
        Database::new(path_str).context("Failed to open database")?
    };
    tracing::debug!(path = %db_path.display(), encrypted = !no_encrypt, "Opened database");
    Ok(db.with_config(config))
}

/// The acting user, created on first use
pub fn resolve_user(db: &Database, email: &str) -> Result<User> {
    db.get_or_create_user(email)
        .with_context(|| format!("Failed to resolve user {}", email))
}

/// Acting user first, then any other participants (duplicates dropped)
pub fn participant_ids(db: &Database, user: &User, others: &[String]) -> Result<Vec<i64>> {
    let mut ids = vec![user.id];
    for id in db.resolve_user_ids(others)? {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Parse a YYYY-MM-DD date as midnight UTC
pub fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' (use YYYY-MM-DD)", s))?;
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| anyhow!("Invalid date '{}'", s))
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool, config_path: Option<&Path>) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt, config_path)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    let config = db.config();
    println!(
        "   Analytics cache TTL: {}s, suggestion window: {} days",
        config.cache_ttl_secs, config.suggestion_window_days
    );

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record an expense: splitr expenses add \"Dinner\" 60 --with friend@example.com");
    println!("  2. Start web API: splitr serve");

    Ok(())
}
