//! Splitr Core Library
//!
//! Shared functionality for the Splitr expense-splitting service:
//! - Database access and migrations
//! - Spending analytics (aggregation, trends, budgets)
//! - Recurring expense scheduling
//! - Usage-pattern suggestions
//! - Pluggable receipt parsing

pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod receipts;

pub use config::SplitrConfig;
pub use db::{AuditEntry, Database};
pub use error::{Error, Result};
pub use receipts::{MockReceiptParser, ParsedReceipt, ReceiptParser, ReceiptScan};
