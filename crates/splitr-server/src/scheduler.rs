//! Background scheduler for recurring expenses
//!
//! When `SPLITR_RECURRING_INTERVAL` (or `recurring_interval_secs` in the
//! config file) is non-zero, the server periodically materializes every
//! active template whose `next_due` has passed.

use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;
use tracing::{error, info};

use splitr_core::Database;

/// Start the recurring-expense scheduler as a background task
pub fn start_recurring_scheduler(db: Database, every: Duration) {
    info!(
        "Starting recurring expense scheduler: every {} seconds",
        every.as_secs()
    );

    tokio::spawn(async move {
        let mut ticker = interval(every);

        // Skip the first immediate tick
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match run_due_recurring(&db) {
                Ok(0) => {}
                Ok(count) => info!("Scheduled run created {} recurring expense(s)", count),
                Err(e) => error!("Scheduled recurring run failed: {}", e),
            }
        }
    });
}

/// Materialize all due templates once, returning how many expenses were created
pub fn run_due_recurring(db: &Database) -> Result<usize, String> {
    let outcomes = db
        .materialize_due_recurring(Utc::now())
        .map_err(|e| format!("Failed to materialize due templates: {}", e))?;

    for outcome in &outcomes {
        if let Err(e) = db.log_audit(
            "scheduler",
            "materialize",
            Some("recurring"),
            Some(outcome.template.id),
            Some(&format!("expense={}", outcome.expense.id)),
        ) {
            error!("Failed to log scheduled materialization: {}", e);
        }
    }

    Ok(outcomes.len())
}
