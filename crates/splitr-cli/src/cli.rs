//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Splitr - Split shared expenses and understand your spending
#[derive(Parser)]
#[command(name = "splitr")]
#[command(about = "Self-hosted expense splitting and spending analytics", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "splitr.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set SPLITR_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Email of the user to act as
    #[arg(long, default_value = splitr_server::DEFAULT_USER_EMAIL, global = true)]
    pub user: String,

    /// Configuration file (defaults to ~/.local/share/splitr/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origin (repeatable)
        #[arg(long = "allow-origin")]
        allowed_origins: Vec<String>,
    },

    /// Record and list expenses
    Expenses {
        #[command(subcommand)]
        action: Option<ExpensesAction>,
    },

    /// Spending summary for a time range
    Analytics {
        /// Time range: week, month, year
        #[arg(short, long, default_value = "month")]
        range: String,

        /// Ignore the cached result
        #[arg(long)]
        refresh: bool,

        /// Print the raw JSON result
        #[arg(long)]
        json: bool,
    },

    /// Bucketed spending series
    Trends {
        /// Time range: week, month, year
        #[arg(short, long, default_value = "month")]
        range: String,

        /// Bucket size: day, week, month
        #[arg(short, long, default_value = "week")]
        group_by: String,
    },

    /// Manage monthly budgets
    Budgets {
        #[command(subcommand)]
        action: Option<BudgetsAction>,
    },

    /// Manage recurring expense templates
    Recurring {
        #[command(subcommand)]
        action: Option<RecurringAction>,
    },

    /// Suggestions mined from spending history
    Suggestions {
        #[command(subcommand)]
        action: Option<SuggestionsAction>,
    },

    /// Receipt scanning
    Receipts {
        #[command(subcommand)]
        action: Option<ReceiptsAction>,
    },
}

#[derive(Subcommand)]
pub enum ExpensesAction {
    /// Record an expense split equally among participants
    Add {
        /// What the expense was for
        description: String,

        /// Total amount
        amount: f64,

        /// Category (defaults to "other" in reports)
        #[arg(short, long)]
        category: Option<String>,

        /// Other participants' emails (repeatable); you are always included
        #[arg(short, long = "with")]
        with: Vec<String>,

        /// Payer email (defaults to you)
        #[arg(long)]
        paid_by: Option<String>,

        /// Date (YYYY-MM-DD, defaults to now)
        #[arg(short, long)]
        date: Option<String>,

        /// Group id
        #[arg(long)]
        group: Option<i64>,
    },

    /// List expenses you are part of
    List {
        /// Maximum number to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Only expenses you paid for
        #[arg(long)]
        paid_by_me: bool,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// Set this month's limit for a category
    Set {
        category: String,
        limit: f64,
    },

    /// Compare this month's budgets with spending
    Overview,
}

#[derive(Subcommand)]
pub enum RecurringAction {
    /// Create a template split equally among participants
    Add {
        description: String,

        amount: f64,

        /// Category
        #[arg(short, long, default_value = "other")]
        category: String,

        /// Frequency: weekly, biweekly, monthly, yearly
        #[arg(short, long, default_value = "monthly")]
        frequency: String,

        /// Other participants' emails (repeatable)
        #[arg(short, long = "with")]
        with: Vec<String>,
    },

    /// List your templates
    List,

    /// Pause or resume a template
    Toggle { id: i64 },

    /// Create the expense for a template now
    Run { id: i64 },

    /// Materialize every due template
    Due,

    /// Delete a template
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum SuggestionsAction {
    /// Re-mine your recent history
    Generate,

    /// Show active suggestions
    List,

    /// Turn a suggestion into an expense
    Use {
        id: i64,

        /// Override the suggested amount
        #[arg(short, long)]
        amount: Option<f64>,

        /// Other participants' emails (repeatable)
        #[arg(short, long = "with")]
        with: Vec<String>,
    },

    /// Hide a suggestion
    Dismiss { id: i64 },
}

#[derive(Subcommand)]
pub enum ReceiptsAction {
    /// Scan a receipt image
    Scan {
        /// Image file
        file: PathBuf,

        /// Attach the result to this expense
        #[arg(long)]
        attach: Option<i64>,
    },

    /// List expenses with receipts
    List,

    /// Receipt statistics
    Analysis,
}
