use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

use crate::models::ticket::{Ticket, TicketStatus};
use crate::models::transaction::{Transaction, TransactionStatus, TransactionType};
use crate::services::users::UserService;
use crate::store::{TicketStore, TransactionStore};
use crate::utils::error::AppError;
use crate::utils::response::error as error_response;

/// The stateful steps of a trade, in commit order. There is no cross-store
/// transaction: a failure mid-sequence leaves the earlier steps committed,
/// and the outcome reports exactly which ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TradeStep {
    LogWrite,
    SellerLogWrite,
    BuyerLogWrite,
    TicketMutation,
    LedgerUpdate,
    SellerLedgerUpdate,
    BuyerLedgerUpdate,
}

#[derive(Debug, Error)]
pub enum TradeError {
    /// Validation failed before any write; the stores are untouched.
    #[error(transparent)]
    Rejected(#[from] AppError),

    /// A store call failed mid-sequence. The listed steps are committed
    /// and are not rolled back.
    #[error("trade aborted after {completed:?}")]
    Aborted {
        completed: Vec<TradeStep>,
        #[source]
        source: AppError,
    },
}

impl IntoResponse for TradeError {
    fn into_response(self) -> Response {
        match self {
            TradeError::Rejected(err) => err.into_response(),
            TradeError::Aborted { completed, source } => {
                error!(?completed, error = %source, "trade aborted mid-sequence");
                error_response(
                    "TRADE_ABORTED",
                    "Trade failed after partial completion",
                    Some(json!({ "completedSteps": completed })),
                    StatusCode::INTERNAL_SERVER_ERROR,
                )
            }
        }
    }
}

fn aborted(completed: &[TradeStep], source: impl Into<AppError>) -> TradeError {
    TradeError::Aborted {
        completed: completed.to_vec(),
        source: source.into(),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    pub transaction_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub user_balance: Decimal,
    /// Ticket as read before the purchase mutated it.
    pub ticket_details: Ticket,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleReceipt {
    pub seller_transaction_id: String,
    pub buyer_transaction_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub seller_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub buyer_balance: Decimal,
}

#[derive(Clone)]
pub struct TradeService {
    tickets: Arc<dyn TicketStore>,
    transactions: Arc<dyn TransactionStore>,
    users: UserService,
}

impl TradeService {
    pub fn new(
        tickets: Arc<dyn TicketStore>,
        transactions: Arc<dyn TransactionStore>,
        users: UserService,
    ) -> Self {
        Self {
            tickets,
            transactions,
            users,
        }
    }

    /// First-hand purchase of an available seat. Commit order: log write,
    /// ticket mutation, ledger debit.
    pub async fn process_ticket_purchase(
        &self,
        user_id: &str,
        theatre_seat: &str,
        purchase_price: Decimal,
        payment_method: &str,
    ) -> Result<PurchaseReceipt, TradeError> {
        let ticket = self
            .tickets
            .get(theatre_seat)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound(format!("ticket '{theatre_seat}'")))?;

        if ticket.status == TicketStatus::Sold {
            return Err(AppError::AlreadySold(theatre_seat.to_string()).into());
        }

        let transaction_id = Transaction::generate_id();
        let now = Utc::now();
        let record = Transaction {
            transaction_id: transaction_id.clone(),
            user_id: user_id.to_string(),
            transaction_type: TransactionType::Purchase,
            theatre_seat: theatre_seat.to_string(),
            movie: ticket.movie.clone(),
            amount: purchase_price,
            payment_method: Some(payment_method.to_string()),
            counterparty_id: None,
            timestamp: now,
            status: TransactionStatus::Completed,
            description: format!(
                "Purchased ticket for {} - Seat {}",
                ticket.movie, theatre_seat
            ),
        };

        let mut completed = Vec::new();

        self.transactions
            .append(record)
            .await
            .map_err(|e| aborted(&completed, e))?;
        completed.push(TradeStep::LogWrite);

        let owner = user_id.to_string();
        self.tickets
            .update(
                theatre_seat,
                Box::new(move |t| {
                    t.status = TicketStatus::Sold;
                    t.owner = Some(owner);
                    t.purchase_price = Some(purchase_price);
                    t.purchase_timestamp = Some(now);
                }),
            )
            .await
            .map_err(|e| aborted(&completed, e))?;
        completed.push(TradeStep::TicketMutation);

        let payroll = self
            .users
            .update_user_balance(user_id, -purchase_price, &transaction_id)
            .await
            .map_err(|e| aborted(&completed, e))?;

        info!(user_id, theatre_seat, transaction_id, "processed ticket purchase");
        Ok(PurchaseReceipt {
            transaction_id,
            user_balance: payroll.current_balance,
            ticket_details: ticket,
        })
    }

    /// Resale between two users. Two log records (seller SALE, buyer
    /// PURCHASE) share the seat and amount; the ledger is credited for the
    /// seller and debited for the buyer.
    pub async fn process_ticket_sale(
        &self,
        seller_id: &str,
        buyer_id: &str,
        theatre_seat: &str,
        sale_price: Decimal,
    ) -> Result<SaleReceipt, TradeError> {
        let ticket = self
            .tickets
            .get(theatre_seat)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound(format!("ticket '{theatre_seat}'")))?;

        if ticket.owner.as_deref() != Some(seller_id) {
            return Err(AppError::NotOwner(theatre_seat.to_string()).into());
        }

        let seller_transaction_id = Transaction::generate_id();
        let buyer_transaction_id = Transaction::generate_id();
        let now = Utc::now();

        let seller_record = Transaction {
            transaction_id: seller_transaction_id.clone(),
            user_id: seller_id.to_string(),
            transaction_type: TransactionType::Sale,
            theatre_seat: theatre_seat.to_string(),
            movie: ticket.movie.clone(),
            amount: sale_price,
            payment_method: None,
            counterparty_id: Some(buyer_id.to_string()),
            timestamp: now,
            status: TransactionStatus::Completed,
            description: format!(
                "Sold ticket for {} - Seat {} to {}",
                ticket.movie, theatre_seat, buyer_id
            ),
        };
        let buyer_record = Transaction {
            transaction_id: buyer_transaction_id.clone(),
            user_id: buyer_id.to_string(),
            transaction_type: TransactionType::Purchase,
            theatre_seat: theatre_seat.to_string(),
            movie: ticket.movie.clone(),
            amount: sale_price,
            payment_method: None,
            counterparty_id: Some(seller_id.to_string()),
            timestamp: now,
            status: TransactionStatus::Completed,
            description: format!(
                "Purchased ticket for {} - Seat {} from {}",
                ticket.movie, theatre_seat, seller_id
            ),
        };

        let mut completed = Vec::new();

        self.transactions
            .append(seller_record)
            .await
            .map_err(|e| aborted(&completed, e))?;
        completed.push(TradeStep::SellerLogWrite);

        self.transactions
            .append(buyer_record)
            .await
            .map_err(|e| aborted(&completed, e))?;
        completed.push(TradeStep::BuyerLogWrite);

        let new_owner = buyer_id.to_string();
        let previous_owner = seller_id.to_string();
        let original_purchase_price = ticket.purchase_price.unwrap_or(Decimal::ZERO);
        self.tickets
            .update(
                theatre_seat,
                Box::new(move |t| {
                    t.owner = Some(new_owner);
                    t.sale_price = Some(sale_price);
                    t.sale_timestamp = Some(now);
                    t.previous_owner = Some(previous_owner);
                    t.original_purchase_price = Some(original_purchase_price);
                }),
            )
            .await
            .map_err(|e| aborted(&completed, e))?;
        completed.push(TradeStep::TicketMutation);

        let seller_payroll = self
            .users
            .update_user_balance(seller_id, sale_price, &seller_transaction_id)
            .await
            .map_err(|e| aborted(&completed, e))?;
        completed.push(TradeStep::SellerLedgerUpdate);

        let buyer_payroll = self
            .users
            .update_user_balance(buyer_id, -sale_price, &buyer_transaction_id)
            .await
            .map_err(|e| aborted(&completed, e))?;

        info!(
            seller_id,
            buyer_id, theatre_seat, seller_transaction_id, buyer_transaction_id,
            "processed ticket sale"
        );
        Ok(SaleReceipt {
            seller_transaction_id,
            buyer_transaction_id,
            seller_balance: seller_payroll.current_balance,
            buyer_balance: buyer_payroll.current_balance,
        })
    }

    pub async fn get_user_transactions(
        &self,
        user_id: &str,
        limit: usize,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Transaction>, AppError> {
        Ok(self.transactions.for_user(user_id, limit, range).await?)
    }

    pub async fn get_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Transaction>, AppError> {
        Ok(self.transactions.get(transaction_id).await?)
    }
}
