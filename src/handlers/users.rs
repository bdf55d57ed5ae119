use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::user::{LeaderboardEntry, SortOrder};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
const MAX_LEADERBOARD_LIMIT: usize = 50;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub user_id: String,
    pub email: String,
    pub name: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub initial_balance: Option<Decimal>,
}

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
    pub order: Option<SortOrder>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LeaderboardPayload {
    leaderboard: Vec<LeaderboardEntry>,
    total_users: usize,
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Response, AppError> {
    info!(user_id = %request.user_id, "creating user");
    let payroll = state
        .users
        .create_user(
            &request.user_id,
            &request.email,
            &request.name,
            request.initial_balance.unwrap_or(Decimal::ZERO),
        )
        .await?;

    Ok(created(payroll, "User created successfully").into_response())
}

pub async fn payroll(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, AppError> {
    let payroll = state
        .users
        .get_user_payroll(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user '{user_id}'")))?;

    Ok(success(payroll, "Payroll retrieved successfully").into_response())
}

pub async fn summary(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, AppError> {
    let summary = state
        .users
        .get_user_summary(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user '{user_id}'")))?;

    Ok(success(summary, "Summary retrieved successfully").into_response())
}

pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Response, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT);
    let order = query.order.unwrap_or_default();

    let leaderboard = state.users.get_payroll_leaderboard(limit, order).await?;

    let payload = LeaderboardPayload {
        total_users: leaderboard.len(),
        leaderboard,
    };
    Ok(success(payload, "Leaderboard retrieved successfully").into_response())
}
