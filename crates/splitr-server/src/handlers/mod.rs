//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod analytics;
pub mod audit;
pub mod auth;
pub mod budgets;
pub mod expenses;
pub mod groups;
pub mod receipts;
pub mod recurring;
pub mod suggestions;

// Re-export all handlers for use in router
pub use analytics::*;
pub use audit::*;
pub use auth::*;
pub use budgets::*;
pub use expenses::*;
pub use groups::*;
pub use receipts::*;
pub use recurring::*;
pub use suggestions::*;
