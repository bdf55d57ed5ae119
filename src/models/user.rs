use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::transaction::Transaction;

/// Per-user ledger record: running balance plus aggregate purchase/sale
/// counters, maintained incrementally (a materialized view over the
/// transaction log, not re-derived from it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayroll {
    pub user_id: String,
    pub email: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_purchases: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_sales: Decimal,
    pub total_transactions: u64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub last_transaction_id: Option<String>,
}

impl UserPayroll {
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        initial_balance: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            name: name.into(),
            current_balance: initial_balance,
            total_purchases: Decimal::ZERO,
            total_sales: Decimal::ZERO,
            total_transactions: 0,
            status: "ACTIVE".to_string(),
            created_at: now,
            last_updated: now,
            last_transaction_id: None,
        }
    }

    /// Record synthesized when a balance update arrives for an unknown user
    /// (out-of-order event delivery is tolerated by creating the ledger
    /// record on the fly).
    pub fn placeholder(user_id: &str, now: DateTime<Utc>) -> Self {
        Self::new(
            user_id,
            format!("{user_id}@example.com"),
            format!("User {user_id}"),
            Decimal::ZERO,
            now,
        )
    }

    pub fn net_profit_loss(&self) -> Decimal {
        self.total_sales - self.total_purchases
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub status: String,
    pub member_since: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub current_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_purchases: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_sales: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_profit_loss: Decimal,
    pub total_transactions: u64,
    pub is_net_positive: bool,
}

/// Payroll joined with recent transaction history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_info: UserInfo,
    pub financial_summary: FinancialSummary,
    pub recent_transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_profit_loss: Decimal,
    pub total_transactions: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_sales: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_purchases: Decimal,
    pub is_net_positive: bool,
}

impl LeaderboardEntry {
    pub fn from_payroll(rank: usize, payroll: UserPayroll) -> Self {
        let net_profit_loss = payroll.net_profit_loss();
        Self {
            rank,
            user_id: payroll.user_id,
            name: payroll.name,
            current_balance: payroll.current_balance,
            net_profit_loss,
            total_transactions: payroll.total_transactions,
            total_sales: payroll.total_sales,
            total_purchases: payroll.total_purchases,
            is_net_positive: net_profit_loss > Decimal::ZERO,
        }
    }
}

/// Leaderboard sort direction, parsed from the `order` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}
