//! Receipt commands (scan, list, analysis)

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use splitr_core::db::Database;
use splitr_core::models::User;
use splitr_core::receipts::scan_receipt;
use splitr_core::MockReceiptParser;

use super::truncate;

/// Scan a receipt image and optionally attach it to an expense
pub async fn cmd_receipts_scan(
    db: &Database,
    user: &User,
    file: &Path,
    attach: Option<i64>,
) -> Result<()> {
    let image = std::fs::read(file)
        .with_context(|| format!("Failed to read receipt image {}", file.display()))?;
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid receipt filename: {}", file.display()))?;

    println!("📷 Scanning {} ({} bytes)...", filename, image.len());

    let parser = MockReceiptParser::new();
    let scan = scan_receipt(&parser, &image, filename).await?;

    db.log_audit(
        &user.email,
        "parse",
        Some("receipt"),
        None,
        Some(&format!("hash={}", scan.content_hash)),
    )?;

    println!(
        "   Merchant:   {}",
        scan.receipt.merchant_name.as_deref().unwrap_or("Unknown")
    );
    match scan.receipt.extracted_amount {
        Some(amount) => println!("   Total:      ${:.2}", amount),
        None => println!("   Total:      not found"),
    }
    println!("   Confidence: {:.0}%", scan.receipt.confidence * 100.0);
    for item in &scan.receipt.items {
        println!("     - {:<30} ${:.2}", truncate(&item.description, 30), item.amount);
    }
    println!();
    println!(
        "💡 Suggested: {} [{}]",
        scan.suggested_expense.description, scan.suggested_expense.category
    );

    if let Some(expense_id) = attach {
        db.attach_receipt(expense_id, user.id, &scan.image_url, &scan.receipt_data)?;
        db.log_audit(
            &user.email,
            "attach",
            Some("receipt"),
            Some(expense_id),
            scan.receipt.merchant_name.as_deref(),
        )?;
        println!("🔗 Attached to expense #{}", expense_id);
    }

    Ok(())
}

pub fn cmd_receipts_list(db: &Database, user: &User) -> Result<()> {
    let expenses = db.list_expenses_with_receipts(user.id)?;

    if expenses.is_empty() {
        println!("No expenses with receipts.");
        return Ok(());
    }

    println!("\n🧾 Receipts ({})", expenses.len());
    println!("{}", "─".repeat(70));
    for expense in &expenses {
        let merchant = expense
            .receipt_data
            .as_ref()
            .and_then(|d| d.merchant_name.as_deref())
            .unwrap_or("Unknown");
        println!(
            "  #{:<5} {}  {:<24} ${:>9.2}  {}",
            expense.id,
            expense.date.format("%Y-%m-%d"),
            truncate(&expense.description, 24),
            expense.amount,
            merchant
        );
        if let Some(url) = &expense.receipt_image_url {
            println!("         📷 {}", url);
        }
    }

    println!();
    Ok(())
}

pub fn cmd_receipts_analysis(db: &Database, user: &User) -> Result<()> {
    let analysis = db.receipt_analysis(user.id)?;

    println!("\n🧾 Receipt analysis");
    println!("   ─────────────────────────────");
    println!("   Receipts scanned:   {}", analysis.total_receipts_scanned);
    println!(
        "   Average confidence: {:.0}%",
        analysis.average_confidence * 100.0
    );

    if !analysis.top_merchants.is_empty() {
        let mut merchants: Vec<_> = analysis.top_merchants.iter().collect();
        merchants.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        println!();
        println!("   Top merchants:");
        for (merchant, count) in merchants {
            println!("     {:<24} {}", merchant, count);
        }
    }

    println!();
    Ok(())
}
