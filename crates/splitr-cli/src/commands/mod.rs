//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analytics` - Spending summary and trend series
//! - `budgets` - Monthly budget commands (set, overview)
//! - `core` - Init and shared utilities (open_db, resolve_user)
//! - `expenses` - Expense commands (add, list)
//! - `receipts` - Receipt scanning commands
//! - `recurring` - Recurring template commands
//! - `serve` - Web server command
//! - `suggestions` - Suggestion commands

pub mod analytics;
pub mod budgets;
pub mod core;
pub mod expenses;
pub mod receipts;
pub mod recurring;
pub mod serve;
pub mod suggestions;

// Re-export command functions for main.rs
pub use analytics::*;
pub use budgets::*;
pub use self::core::*;
pub use expenses::*;
pub use receipts::*;
pub use recurring::*;
pub use serve::*;
pub use suggestions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
