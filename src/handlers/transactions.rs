use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::transaction::Transaction;
use crate::services::trades::TradeError;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

const DEFAULT_HISTORY_LIMIT: usize = 50;
const MAX_HISTORY_LIMIT: usize = 100;

fn default_payment_method() -> String {
    "credit_card".to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseTicketRequest {
    pub user_id: String,
    pub theatre_seat: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub purchase_price: Decimal,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellTicketRequest {
    pub user_id: String,
    pub buyer_id: String,
    pub theatre_seat: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub sale_price: Decimal,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHistoryQuery {
    pub limit: Option<usize>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionHistoryPayload {
    user_id: String,
    transactions: Vec<Transaction>,
    total_transactions: usize,
}

pub async fn purchase_ticket(
    State(state): State<AppState>,
    Json(request): Json<PurchaseTicketRequest>,
) -> Result<Response, TradeError> {
    info!(user_id = %request.user_id, theatre_seat = %request.theatre_seat, "processing ticket purchase");
    let receipt = state
        .trades
        .process_ticket_purchase(
            &request.user_id,
            &request.theatre_seat,
            request.purchase_price,
            &request.payment_method,
        )
        .await?;

    Ok(created(receipt, "Ticket purchased successfully").into_response())
}

pub async fn sell_ticket(
    State(state): State<AppState>,
    Json(request): Json<SellTicketRequest>,
) -> Result<Response, TradeError> {
    info!(
        seller_id = %request.user_id,
        buyer_id = %request.buyer_id,
        theatre_seat = %request.theatre_seat,
        "processing ticket sale"
    );
    let receipt = state
        .trades
        .process_ticket_sale(
            &request.user_id,
            &request.buyer_id,
            &request.theatre_seat,
            request.sale_price,
        )
        .await?;

    Ok(created(receipt, "Ticket sold successfully").into_response())
}

pub async fn user_transactions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<TransactionHistoryQuery>,
) -> Result<Response, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let range = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => Some((start, end)),
        _ => None,
    };

    let transactions = state
        .trades
        .get_user_transactions(&user_id, limit, range)
        .await?;

    let payload = TransactionHistoryPayload {
        user_id,
        total_transactions: transactions.len(),
        transactions,
    };
    Ok(success(payload, "Transactions retrieved successfully").into_response())
}

pub async fn transaction_details(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Response, AppError> {
    let transaction = state
        .trades
        .get_transaction(&transaction_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("transaction '{transaction_id}'")))?;

    Ok(success(transaction, "Transaction retrieved successfully").into_response())
}
