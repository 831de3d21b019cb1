//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `users` - Users, identified by email
//! - `groups` - Groups and membership
//! - `expenses` - Expense CRUD and split storage
//! - `budgets` - Monthly category budgets
//! - `recurring` - Recurring expense templates and materialization
//! - `suggestions` - Mined expense suggestions
//! - `analytics` - Cached spending analytics and trend series
//! - `receipts` - Receipt attachment and analysis
//! - `audit` - Audit log
//!
//! Timestamps are stored as integer milliseconds since the Unix epoch.

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::config::SplitrConfig;
use crate::error::{Error, Result};

mod analytics;
mod audit;
mod budgets;
mod expenses;
mod groups;
mod receipts;
mod recurring;
mod suggestions;
mod users;

pub use expenses::ExpenseFilter;
pub use recurring::MaterializeOutcome;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "SPLITR_DB_KEY";

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the same key,
/// regardless of database path.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Changing this would invalidate all existing encrypted databases
    const APP_SALT: &[u8; 16] = b"splitr-salt-v1-x";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let hash = Argon2::default()
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let output = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(output.as_bytes()))
}

pub(crate) fn to_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

/// Convert stored milliseconds back to a timestamp
pub(crate) fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

/// Read a JSON text column into a typed value
pub(crate) fn json_column<T: DeserializeOwned>(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Parse a stored enum string column
pub(crate) fn enum_column<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
    })
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
    config: SplitrConfig,
}

impl Database {
    /// Create a new database connection pool with encryption
    ///
    /// Requires `SPLITR_DB_KEY` environment variable to be set.
    /// Use `new_unencrypted()` for development/testing without encryption.
    pub fn new(path: &str) -> Result<Self> {
        match std::env::var(DB_KEY_ENV).ok() {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for unencrypted databases (not recommended for production).",
                DB_KEY_ENV
            ))),
        }
    }

    /// Create a new unencrypted database connection pool
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Create a new database with an explicit encryption key
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                conn.execute_batch("PRAGMA foreign_keys = ON;")?;
                Ok(())
            });

            Pool::builder().max_size(10).build(manager)?
        } else {
            let manager =
                manager.with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
            Pool::builder().max_size(10).build(manager)?
        };

        let db = Self {
            pool,
            db_path: path.to_string(),
            config: SplitrConfig::default(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Create a temporary database (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` because each pooled
    /// connection would otherwise see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "splitr_test_{}_{}.db",
            std::process::id(),
            id
        ));
        let path = path.to_string_lossy().to_string();

        let _ = std::fs::remove_file(&path);

        Self::new_unencrypted(&path)
    }

    /// Replace the runtime configuration
    pub fn with_config(mut self, config: SplitrConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SplitrConfig {
        &self.config
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Check if the database is encrypted
    pub fn is_encrypted(&self) -> Result<bool> {
        let conn = self.conn()?;
        let result: rusqlite::Result<String> =
            conn.query_row("PRAGMA cipher_version;", [], |row| row.get(0));
        Ok(result.is_ok() && std::env::var(DB_KEY_ENV).is_ok())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS expense_groups (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                created_by INTEGER NOT NULL REFERENCES users(id),
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS group_members (
                group_id INTEGER NOT NULL REFERENCES expense_groups(id) ON DELETE CASCADE,
                user_id INTEGER NOT NULL REFERENCES users(id),
                role TEXT NOT NULL DEFAULT 'member',     -- admin, member
                joined_at INTEGER NOT NULL,
                PRIMARY KEY (group_id, user_id)
            );

            CREATE INDEX IF NOT EXISTS idx_group_members_user ON group_members(user_id);

            CREATE TABLE IF NOT EXISTS recurring_expenses (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                frequency TEXT NOT NULL,                 -- weekly, biweekly, monthly, yearly
                participants TEXT NOT NULL,              -- JSON array of user ids
                group_id INTEGER REFERENCES expense_groups(id),
                split_type TEXT NOT NULL,
                splits TEXT NOT NULL,                    -- JSON split template
                next_due INTEGER NOT NULL,
                last_created INTEGER,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_recurring_user ON recurring_expenses(user_id);
            CREATE INDEX IF NOT EXISTS idx_recurring_next_due ON recurring_expenses(next_due);

            CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT,
                date INTEGER NOT NULL,
                paid_by INTEGER NOT NULL REFERENCES users(id),
                created_by INTEGER NOT NULL REFERENCES users(id),
                split_type TEXT NOT NULL,                -- equal, percentage, exact
                group_id INTEGER REFERENCES expense_groups(id),
                receipt_image_url TEXT,
                receipt_data TEXT,                       -- JSON receipt fields
                recurring_id INTEGER REFERENCES recurring_expenses(id) ON DELETE SET NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);
            CREATE INDEX IF NOT EXISTS idx_expenses_paid_by ON expenses(paid_by);
            CREATE INDEX IF NOT EXISTS idx_expenses_group ON expenses(group_id);

            -- Splits keep their insertion order via position
            CREATE TABLE IF NOT EXISTS expense_splits (
                expense_id INTEGER NOT NULL REFERENCES expenses(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                user_id INTEGER NOT NULL REFERENCES users(id),
                amount REAL NOT NULL,
                paid BOOLEAN NOT NULL DEFAULT 0,
                PRIMARY KEY (expense_id, position)
            );

            CREATE INDEX IF NOT EXISTS idx_expense_splits_user ON expense_splits(user_id);

            CREATE TABLE IF NOT EXISTS budgets (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                category TEXT NOT NULL,
                monthly_limit REAL NOT NULL,
                year INTEGER NOT NULL,
                month INTEGER NOT NULL,                  -- 1-12
                spent REAL NOT NULL DEFAULT 0,
                last_updated INTEGER NOT NULL,
                UNIQUE(user_id, category, year, month)
            );

            CREATE TABLE IF NOT EXISTS expense_suggestions (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                description TEXT NOT NULL,
                category TEXT,
                avg_amount REAL NOT NULL,
                frequency TEXT NOT NULL,                 -- daily, weekly, monthly, irregular
                confidence REAL NOT NULL,
                based_on_expenses TEXT NOT NULL,         -- JSON array of expense ids
                last_suggested INTEGER NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT 1
            );

            CREATE INDEX IF NOT EXISTS idx_suggestions_user ON expense_suggestions(user_id);

            CREATE TABLE IF NOT EXISTS analytics_cache (
                user_id INTEGER NOT NULL REFERENCES users(id),
                time_range TEXT NOT NULL,
                data TEXT NOT NULL,                      -- JSON ExpenseAnalytics
                last_updated INTEGER NOT NULL,
                PRIMARY KEY (user_id, time_range)
            );

            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                user_email TEXT NOT NULL,
                action TEXT NOT NULL,
                entity_type TEXT,
                entity_id INTEGER,
                details TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}

/// Audit log entry
#[derive(Debug, Clone, serde::Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub user_email: String,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub details: Option<String>,
}

#[cfg(test)]
mod tests;
