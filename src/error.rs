// Application error type and its conversion into HTTP responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{finance::FinanceError, leads::LeadError};

#[derive(Debug)]
pub enum AppError {
    InternalServerError(anyhow::Error),
    BadRequest(String),
    NotFound(String),
    // Well-formed request whose content failed validation
    Validation(String),
}

// Implement conversion from anyhow::Error for easier error propagation
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::InternalServerError(error)
    }
}

impl From<FinanceError> for AppError {
    fn from(error: FinanceError) -> Self {
        AppError::BadRequest(error.to_string())
    }
}

impl From<LeadError> for AppError {
    fn from(error: LeadError) -> Self {
        AppError::Validation(error.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(e) => {
                tracing::error!("Internal server error: {:?}", e);
                // Don't expose internal details to the client
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::BadRequest(message) => {
                tracing::warn!("Bad request: {}", message);
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::NotFound(message) => {
                tracing::debug!("Not found: {}", message);
                (StatusCode::NOT_FOUND, message)
            }
            AppError::Validation(message) => {
                tracing::info!("Validation failed: {}", message);
                (StatusCode::UNPROCESSABLE_ENTITY, message)
            }
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
