//! Application error type and its HTTP mapping
//!
//! Every handler returns `Result<_, AppError>`; the response body is always
//! `{"error": "...", "code": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use thiserror::Error;

use crate::models::common::ErrorResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Your cart is empty.")]
    EmptyCart,

    #[error("Not enough stock for {product}.")]
    StockShortage { product: String },

    #[error("Only pending orders can be cancelled.")]
    InvalidCancellation,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::EmptyCart | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::StockShortage { .. }
            | AppError::InvalidCancellation
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Config(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::EmptyCart => "EMPTY_CART",
            AppError::StockShortage { .. } => "STOCK_SHORTAGE",
            AppError::InvalidCancellation => "ORDER_NOT_CANCELLABLE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server-side failures are logged in full but surfaced generically
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "An unexpected error occurred.".to_string()
        } else {
            tracing::warn!(code = self.code(), error = %self, "Request rejected");
            self.to_string()
        };

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: Some(self.code().to_string()),
            }),
        )
            .into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_shortage_names_product() {
        let err = AppError::StockShortage {
            product: "Trail Shoe".to_string(),
        };
        assert_eq!(err.to_string(), "Not enough stock for Trail Shoe.");
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "STOCK_SHORTAGE");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::EmptyCart.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCancellation.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::NotFound("Order 7 not found".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Forbidden("nope".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Database(DbErr::Custom("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_database_error_is_not_leaked() {
        let response = AppError::Database(DbErr::Custom("secret table".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
