use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;

use crate::models::event::TicketEvent;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

/// Feeds one event straight to the price-change processor, standing in
/// for queue delivery in deployments without a real transport.
pub async fn price_change(
    State(state): State<AppState>,
    Json(event): Json<TicketEvent>,
) -> Result<Response, AppError> {
    info!("received price change event");
    let disposition = state.events.handle(event).await?;

    Ok(success(disposition, "Price change event processed successfully").into_response())
}
