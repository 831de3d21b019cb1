//! Server command implementation

use std::path::Path;

use anyhow::Result;
use splitr_core::config::RECURRING_INTERVAL_ENV;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    allowed_origins: Vec<String>,
    no_encrypt: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let db = open_db(db_path, no_encrypt, config_path)?;

    println!("🚀 Starting Splitr web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}/api", host, port);

    if allowed_origins.is_empty() {
        println!("   🔒 CORS: same-origin only");
    } else {
        println!("   🌐 CORS origins: {}", allowed_origins.join(", "));
    }

    let interval = db.config().recurring_interval_secs;
    if interval > 0 {
        println!("   🔁 Recurring expenses: every {}s", interval);
    } else {
        println!(
            "   🔁 Recurring expenses: manual (set {} to schedule)",
            RECURRING_INTERVAL_ENV
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let config = splitr_server::ServerConfig { allowed_origins };
    splitr_server::serve_with_config(db, host, port, config).await?;

    Ok(())
}
