use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// ITT bill-of-quantities line item (read-only input to matching)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct IttItem {
    pub itt_item_id: i64,
    pub project_id: i64,
    pub section_id: String,
    pub item_code: Option<String>,      // hierarchical code, e.g. "1.2.3"
    pub description: String,
    pub unit: Option<String>,           // unit of measure, e.g. "m", "m2", "nr"
    pub qty: Option<BigDecimal>,
    pub rate: Option<BigDecimal>,
    pub amount: Option<BigDecimal>,
}

/// Contractor response line item (read-only input to matching)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ResponseItem {
    pub response_item_id: i64,
    pub project_id: i64,
    pub contractor_id: i64,
    pub section_guess: Option<String>,  // free-text section hint from extraction
    pub item_code: Option<String>,
    pub description: String,
    pub unit: Option<String>,
    pub qty: Option<BigDecimal>,
    pub rate: Option<BigDecimal>,
    pub amount: Option<BigDecimal>,
    pub amount_label: Option<String>,   // textual fallback when amount is non-numeric, e.g. "Included"
}
