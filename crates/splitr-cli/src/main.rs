//! Splitr CLI - Expense splitting and spending analytics
//!
//! Usage:
//!   splitr init                        Initialize database
//!   splitr expenses add Dinner 60 -w bob@example.com
//!   splitr analytics --range week      Spending summary
//!   splitr recurring due               Materialize due templates
//!   splitr serve --port 3000           Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt, config),
        Commands::Serve {
            port,
            host,
            allowed_origins,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                allowed_origins,
                cli.no_encrypt,
                config,
            )
            .await
        }
        Commands::Expenses { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt, config)?;
            let user = commands::resolve_user(&db, &cli.user)?;
            match action {
                None => commands::cmd_expenses_list(&db, &user, 20, false),
                Some(ExpensesAction::List { limit, paid_by_me }) => {
                    commands::cmd_expenses_list(&db, &user, limit, paid_by_me)
                }
                Some(ExpensesAction::Add {
                    description,
                    amount,
                    category,
                    with,
                    paid_by,
                    date,
                    group,
                }) => commands::cmd_expenses_add(
                    &db,
                    &user,
                    &description,
                    amount,
                    category,
                    &with,
                    paid_by.as_deref(),
                    date.as_deref(),
                    group,
                ),
            }
        }
        Commands::Analytics {
            range,
            refresh,
            json,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt, config)?;
            let user = commands::resolve_user(&db, &cli.user)?;
            commands::cmd_analytics(&db, &user, &range, refresh, json)
        }
        Commands::Trends { range, group_by } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt, config)?;
            let user = commands::resolve_user(&db, &cli.user)?;
            commands::cmd_trends(&db, &user, &range, &group_by)
        }
        Commands::Budgets { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt, config)?;
            let user = commands::resolve_user(&db, &cli.user)?;
            match action {
                None | Some(BudgetsAction::Overview) => commands::cmd_budgets_overview(&db, &user),
                Some(BudgetsAction::Set { category, limit }) => {
                    commands::cmd_budgets_set(&db, &user, &category, limit)
                }
            }
        }
        Commands::Recurring { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt, config)?;
            let user = commands::resolve_user(&db, &cli.user)?;
            match action {
                None | Some(RecurringAction::List) => commands::cmd_recurring_list(&db, &user),
                Some(RecurringAction::Add {
                    description,
                    amount,
                    category,
                    frequency,
                    with,
                }) => commands::cmd_recurring_add(
                    &db,
                    &user,
                    &description,
                    amount,
                    &category,
                    &frequency,
                    &with,
                ),
                Some(RecurringAction::Toggle { id }) => {
                    commands::cmd_recurring_toggle(&db, &user, id)
                }
                Some(RecurringAction::Run { id }) => commands::cmd_recurring_run(&db, &user, id),
                Some(RecurringAction::Due) => commands::cmd_recurring_due(&db),
                Some(RecurringAction::Delete { id }) => {
                    commands::cmd_recurring_delete(&db, &user, id)
                }
            }
        }
        Commands::Suggestions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt, config)?;
            let user = commands::resolve_user(&db, &cli.user)?;
            match action {
                None | Some(SuggestionsAction::List) => commands::cmd_suggestions_list(&db, &user),
                Some(SuggestionsAction::Generate) => {
                    commands::cmd_suggestions_generate(&db, &user)
                }
                Some(SuggestionsAction::Use { id, amount, with }) => {
                    commands::cmd_suggestions_use(&db, &user, id, amount, &with)
                }
                Some(SuggestionsAction::Dismiss { id }) => {
                    commands::cmd_suggestions_dismiss(&db, &user, id)
                }
            }
        }
        Commands::Receipts { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt, config)?;
            let user = commands::resolve_user(&db, &cli.user)?;
            match action {
                None | Some(ReceiptsAction::List) => commands::cmd_receipts_list(&db, &user),
                Some(ReceiptsAction::Scan { file, attach }) => {
                    commands::cmd_receipts_scan(&db, &user, &file, attach).await
                }
                Some(ReceiptsAction::Analysis) => commands::cmd_receipts_analysis(&db, &user),
            }
        }
    }
}
