use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{events, health_check, tickets, transactions, users};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/ticket",
            get(tickets::get_ticket)
                .post(tickets::create_ticket)
                .patch(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route("/tickets", get(tickets::list_tickets))
        .route("/movies", get(tickets::list_movies))
        .route("/purchase-ticket", post(transactions::purchase_ticket))
        .route("/sell-ticket", post(transactions::sell_ticket))
        .route(
            "/user-transactions/:user_id",
            get(transactions::user_transactions),
        )
        .route(
            "/transaction/:transaction_id",
            get(transactions::transaction_details),
        )
        .route("/users", post(users::create_user))
        .route("/users/leaderboard", get(users::leaderboard))
        .route("/users/:user_id/payroll", get(users::payroll))
        .route("/users/:user_id/summary", get(users::summary))
        .route("/events/price-change", post(events::price_change));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .with_state(state)
}
