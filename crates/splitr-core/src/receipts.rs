//! Receipt scanning
//!
//! OCR is pluggable through [`ReceiptParser`]. The bundled
//! [`MockReceiptParser`] returns a fixed restaurant receipt so the rest of the
//! flow (categorization, suggested expense, attachment) can run without an
//! OCR service.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::models::{Expense, ReceiptAnalysis, ReceiptData};

/// Base URL under which scanned receipt images are addressed
pub const RECEIPT_URL_BASE: &str = "https://example.com/receipts";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub description: String,
    pub amount: f64,
}

/// Result of OCR on a receipt image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReceipt {
    pub extracted_text: String,
    pub confidence: f64,
    pub merchant_name: Option<String>,
    pub extracted_amount: Option<f64>,
    #[serde(default)]
    pub items: Vec<ReceiptItem>,
    pub tax: Option<f64>,
    pub total: Option<f64>,
}

impl ParsedReceipt {
    /// The subset of fields stored on an expense
    pub fn to_receipt_data(&self) -> ReceiptData {
        ReceiptData {
            extracted_text: Some(self.extracted_text.clone()),
            confidence: Some(self.confidence),
            merchant_name: self.merchant_name.clone(),
            extracted_amount: self.extracted_amount,
        }
    }
}

/// Pre-filled expense derived from a receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedExpense {
    pub description: String,
    pub amount: Option<f64>,
    pub category: String,
}

/// Everything a receipt scan produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptScan {
    pub image_url: String,
    pub content_hash: String,
    pub receipt: ParsedReceipt,
    pub receipt_data: ReceiptData,
    pub suggested_expense: SuggestedExpense,
}

/// OCR backend
#[async_trait]
pub trait ReceiptParser: Send + Sync {
    async fn parse(&self, image: &[u8], filename: &str) -> Result<ParsedReceipt>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Parser returning a canned receipt
#[derive(Clone, Default)]
pub struct MockReceiptParser {
    fail: bool,
}

impl MockReceiptParser {
    pub fn new() -> Self {
        Self { fail: false }
    }

    /// A parser whose every call fails
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl ReceiptParser for MockReceiptParser {
    async fn parse(&self, image: &[u8], filename: &str) -> Result<ParsedReceipt> {
        if self.fail {
            return Err(Error::Receipt(format!("OCR failed for {}", filename)));
        }
        tracing::debug!(filename, bytes = image.len(), "Mock receipt parse");

        Ok(ParsedReceipt {
            extracted_text: "RESTAURANT ABC\n123 Main St\nBurger & Fries $12.50\nDrink $2.50\nTax $1.50\nTotal: $16.50\nThank you!".to_string(),
            confidence: 0.85,
            merchant_name: Some("Restaurant ABC".to_string()),
            extracted_amount: Some(16.50),
            items: vec![
                ReceiptItem {
                    description: "Burger & Fries".to_string(),
                    amount: 12.50,
                },
                ReceiptItem {
                    description: "Drink".to_string(),
                    amount: 2.50,
                },
            ],
            tax: Some(1.50),
            total: Some(16.50),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

fn merchant_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (r"(?i)restaurant|cafe|food", "foodDrink"),
            (r"(?i)gas|fuel|station", "transportation"),
            (r"(?i)grocery|market", "groceries"),
            (r"(?i)pharmacy|medical", "health"),
            (r"(?i)hotel|motel", "travel"),
        ]
        .into_iter()
        .filter_map(|(pattern, category)| Regex::new(pattern).ok().map(|re| (re, category)))
        .collect()
    })
}

/// Category suggested for a merchant name, first matching rule wins
pub fn categorize_merchant(merchant: &str) -> &'static str {
    merchant_rules()
        .iter()
        .find(|(re, _)| re.is_match(merchant))
        .map(|(_, category)| *category)
        .unwrap_or("other")
}

/// SHA-256 of the image bytes, hex encoded
pub fn content_hash(image: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image);
    hex::encode(hasher.finalize())
}

/// Run OCR on an image and derive the suggested expense
pub async fn scan_receipt(
    parser: &dyn ReceiptParser,
    image: &[u8],
    filename: &str,
) -> Result<ReceiptScan> {
    if image.is_empty() {
        return Err(Error::InvalidData("Receipt image is empty".into()));
    }
    let filename = filename.trim();
    if filename.is_empty() || filename.contains('/') || filename.contains("..") {
        return Err(Error::InvalidData(format!(
            "Invalid receipt filename: {:?}",
            filename
        )));
    }

    let receipt = parser.parse(image, filename).await?;
    tracing::info!(
        parser = parser.name(),
        merchant = ?receipt.merchant_name,
        confidence = receipt.confidence,
        "Parsed receipt"
    );

    let merchant = receipt.merchant_name.as_deref().unwrap_or("Unknown merchant");
    let suggested_expense = SuggestedExpense {
        description: format!("Expense at {}", merchant),
        amount: receipt.extracted_amount,
        category: categorize_merchant(merchant).to_string(),
    };

    Ok(ReceiptScan {
        image_url: format!("{}/{}", RECEIPT_URL_BASE, filename),
        content_hash: content_hash(image),
        receipt_data: receipt.to_receipt_data(),
        receipt,
        suggested_expense,
    })
}

/// Summarize receipts attached to expenses
pub fn analyze_receipts(expenses: &[Expense]) -> ReceiptAnalysis {
    let with_receipts: Vec<&Expense> = expenses
        .iter()
        .filter(|e| e.receipt_image_url.is_some())
        .collect();

    if with_receipts.is_empty() {
        return ReceiptAnalysis::default();
    }

    let total_confidence: f64 = with_receipts
        .iter()
        .filter_map(|e| e.receipt_data.as_ref().and_then(|d| d.confidence))
        .sum();

    let mut top_merchants = BTreeMap::new();
    for merchant in with_receipts
        .iter()
        .filter_map(|e| e.receipt_data.as_ref().and_then(|d| d.merchant_name.clone()))
    {
        *top_merchants.entry(merchant).or_insert(0) += 1;
    }

    ReceiptAnalysis {
        total_receipts_scanned: with_receipts.len(),
        average_confidence: total_confidence / with_receipts.len() as f64,
        top_merchants,
    }
}
