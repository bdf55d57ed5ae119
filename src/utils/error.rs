use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::notifier::NotifierError;
use crate::store::StoreError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Ticket already sold: {0}")]
    AlreadySold(String),

    #[error("Seller does not own ticket: {0}")]
    NotOwner(String),

    #[error("Store error")]
    StoreError(#[from] StoreError),

    #[error("Notifier error")]
    NotifierError(#[from] NotifierError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::AlreadySold(_) => StatusCode::CONFLICT,
            AppError::NotOwner(_) => StatusCode::FORBIDDEN,
            AppError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotifierError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::AlreadyExists(_) => "ALREADY_EXISTS",
            AppError::AlreadySold(_) => "TICKET_ALREADY_SOLD",
            AppError::NotOwner(_) => "NOT_TICKET_OWNER",
            AppError::StoreError(_) => "STORE_ERROR",
            AppError::NotifierError(_) => "NOTIFIER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::AlreadyExists(msg)
            | AppError::AlreadySold(msg)
            | AppError::NotOwner(msg) => {
                error!(error = ?self, message = %msg, "Application error");
            }
            AppError::StoreError(e) => {
                error!(error = ?e, "Store error");
            }
            AppError::NotifierError(e) => {
                error!(error = ?e, "Notifier error");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level message to the client
        let public_message = match &self {
            AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::AlreadyExists(msg)
            | AppError::AlreadySold(msg)
            | AppError::NotOwner(msg) => msg.clone(),
            AppError::StoreError(_) => "A storage error occurred".to_string(),
            AppError::NotifierError(_) => "Failed to publish event".to_string(),
        };

        // Do not expose internal details in the API response
        let details = None;

        error_response(code, public_message, details, status)
    }
}
