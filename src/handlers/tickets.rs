use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::models::ticket::Ticket;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketKeyQuery {
    pub theatre_seat: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub theatre_seat: String,
    pub movie: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    pub theatre_seat: String,
    pub update_key: String,
    pub update_value: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTicketRequest {
    pub theatre_seat: String,
}

#[derive(Serialize)]
struct TicketListPayload {
    tickets: Vec<Ticket>,
}

#[derive(Serialize)]
struct MovieListPayload {
    movies: Vec<String>,
}

pub async fn get_ticket(
    State(state): State<AppState>,
    Query(query): Query<TicketKeyQuery>,
) -> Result<Response, AppError> {
    let ticket = state
        .tickets
        .get_ticket(&query.theatre_seat)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("ticket '{}'", query.theatre_seat)))?;

    Ok(success(ticket, "Ticket retrieved successfully").into_response())
}

pub async fn list_tickets(State(state): State<AppState>) -> Result<Response, AppError> {
    let tickets = state.tickets.list_tickets().await?;
    Ok(success(TicketListPayload { tickets }, "Tickets retrieved successfully").into_response())
}

pub async fn list_movies(State(state): State<AppState>) -> Result<Response, AppError> {
    let movies = state.tickets.list_movies().await?;
    Ok(success(MovieListPayload { movies }, "Movies retrieved successfully").into_response())
}

pub async fn create_ticket(
    State(state): State<AppState>,
    Json(request): Json<CreateTicketRequest>,
) -> Result<Response, AppError> {
    info!(theatre_seat = %request.theatre_seat, "creating ticket");
    let ticket = state
        .tickets
        .create_ticket(&request.theatre_seat, &request.movie, request.price)
        .await?;

    Ok(created(ticket, "Ticket created successfully").into_response())
}

pub async fn update_ticket(
    State(state): State<AppState>,
    Json(request): Json<UpdateTicketRequest>,
) -> Result<Response, AppError> {
    info!(theatre_seat = %request.theatre_seat, update_key = %request.update_key, "updating ticket");
    let outcome = state
        .tickets
        .update_ticket(
            &request.theatre_seat,
            &request.update_key,
            request.update_value,
        )
        .await?;

    Ok(success(outcome, "Ticket updated successfully").into_response())
}

pub async fn delete_ticket(
    State(state): State<AppState>,
    Json(request): Json<DeleteTicketRequest>,
) -> Result<Response, AppError> {
    info!(theatre_seat = %request.theatre_seat, "deleting ticket");
    let deleted = state.tickets.delete_ticket(&request.theatre_seat).await?;

    Ok(success(deleted, "Ticket deleted successfully").into_response())
}
