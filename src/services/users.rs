use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use crate::models::user::{
    FinancialSummary, LeaderboardEntry, SortOrder, UserInfo, UserPayroll, UserSummary,
};
use crate::store::{PayrollStore, TransactionStore};
use crate::utils::error::AppError;

/// How many transactions the summary view joins in, and how many of those
/// it embeds in the response.
const SUMMARY_FETCH_LIMIT: usize = 10;
const SUMMARY_EMBED_LIMIT: usize = 5;

#[derive(Clone)]
pub struct UserService {
    payroll: Arc<dyn PayrollStore>,
    transactions: Arc<dyn TransactionStore>,
}

impl UserService {
    pub fn new(payroll: Arc<dyn PayrollStore>, transactions: Arc<dyn TransactionStore>) -> Self {
        Self {
            payroll,
            transactions,
        }
    }

    pub async fn create_user(
        &self,
        user_id: &str,
        email: &str,
        name: &str,
        initial_balance: Decimal,
    ) -> Result<UserPayroll, AppError> {
        let record = UserPayroll::new(user_id, email, name, initial_balance, Utc::now());

        let inserted = self.payroll.insert(record.clone()).await?;
        if !inserted {
            return Err(AppError::AlreadyExists(format!("user '{user_id}'")));
        }

        info!(user_id, "created user payroll record");
        Ok(record)
    }

    pub async fn get_user_payroll(&self, user_id: &str) -> Result<Option<UserPayroll>, AppError> {
        Ok(self.payroll.get(user_id).await?)
    }

    /// Applies a signed amount to the user's ledger: positive amounts are
    /// sale income, negative amounts are purchase spend. Unknown users are
    /// created on the fly with synthesized contact fields so out-of-order
    /// delivery never drops a balance update. The whole read-modify-write
    /// happens in a single atomic store call.
    pub async fn update_user_balance(
        &self,
        user_id: &str,
        amount: Decimal,
        transaction_id: &str,
    ) -> Result<UserPayroll, AppError> {
        let now = Utc::now();
        let placeholder_id = user_id.to_string();
        let tx_id = transaction_id.to_string();

        let updated = self
            .payroll
            .apply(
                user_id,
                Box::new(move || UserPayroll::placeholder(&placeholder_id, now)),
                Box::new(move |record| {
                    record.current_balance += amount;
                    if amount > Decimal::ZERO {
                        record.total_sales += amount;
                    } else {
                        record.total_purchases += amount.abs();
                    }
                    record.total_transactions += 1;
                    record.last_transaction_id = Some(tx_id);
                    record.last_updated = now;
                }),
            )
            .await?;

        info!(user_id, %amount, transaction_id, "updated user balance");
        Ok(updated)
    }

    pub async fn get_user_summary(&self, user_id: &str) -> Result<Option<UserSummary>, AppError> {
        let Some(payroll) = self.payroll.get(user_id).await? else {
            return Ok(None);
        };

        let mut recent = self
            .transactions
            .for_user(user_id, SUMMARY_FETCH_LIMIT, None)
            .await?;
        recent.truncate(SUMMARY_EMBED_LIMIT);

        let net_profit_loss = payroll.net_profit_loss();
        Ok(Some(UserSummary {
            user_info: UserInfo {
                user_id: payroll.user_id,
                email: payroll.email,
                name: payroll.name,
                status: payroll.status,
                member_since: payroll.created_at,
            },
            financial_summary: FinancialSummary {
                current_balance: payroll.current_balance,
                total_purchases: payroll.total_purchases,
                total_sales: payroll.total_sales,
                net_profit_loss,
                total_transactions: payroll.total_transactions,
                is_net_positive: net_profit_loss > Decimal::ZERO,
            },
            recent_transactions: recent,
        }))
    }

    /// Full scan of the payroll table ranked by net profit/loss. The sort
    /// is stable so ties keep scan order.
    pub async fn get_payroll_leaderboard(
        &self,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<LeaderboardEntry>, AppError> {
        let mut users = self.payroll.scan().await?;

        users.sort_by(|a, b| {
            let ordering = a.net_profit_loss().cmp(&b.net_profit_loss());
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        Ok(users
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(index, payroll)| LeaderboardEntry::from_payroll(index + 1, payroll))
            .collect())
    }
}
