use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Purchase,
    Sale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Completed,
}

/// One leg of a trade, appended to the transaction log. Immutable once
/// written. A resale produces two records (seller SALE, buyer PURCHASE)
/// sharing seat and amount but with distinct ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: String,
    pub user_id: String,
    pub transaction_type: TransactionType,
    pub theatre_seat: String,
    pub movie: String,
    /// Always positive; the sign of the ledger effect comes from the type.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Buyer id on a SALE leg, seller id on the matching PURCHASE leg.
    #[serde(default)]
    pub counterparty_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
    pub description: String,
}

impl Transaction {
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}
