//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`; server-side faults are
//! captured to Sentry before the response is written.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::checkout::FlowError;
use crate::stores::StoreError;

/// Application-level error type for the bot service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Checkout flow failed outside user-recoverable input.
    #[error("checkout error: {0}")]
    Flow(#[from] FlowError),

    /// Bad request from client.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    fn is_server_fault(&self) -> bool {
        match self {
            Self::Store(e) => store_is_server_fault(e),
            Self::Flow(FlowError::Store(e)) => store_is_server_fault(e),
            Self::Flow(FlowError::DraftIncomplete) => true,
            Self::BadRequest(_) => false,
        }
    }
}

fn store_is_server_fault(error: &StoreError) -> bool {
    matches!(
        error,
        StoreError::Database(_) | StoreError::DataCorruption(_)
    )
}

fn store_status(error: &StoreError) -> StatusCode {
    match error {
        StoreError::NotFound => StatusCode::NOT_FOUND,
        StoreError::InvalidTransition { .. } => StatusCode::CONFLICT,
        StoreError::Database(_) | StoreError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Store(e) | Self::Flow(FlowError::Store(e)) => store_status(e),
            Self::Flow(FlowError::DraftIncomplete) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Store(StoreError::NotFound) => "Not found".to_string(),
            Self::Store(e @ StoreError::InvalidTransition { .. }) => e.to_string(),
            Self::BadRequest(msg) => msg.clone(),
            _ => "Internal server error".to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        fn status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            status(AppError::Store(StoreError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(AppError::Store(StoreError::InvalidTransition {
                from: chefport_core::OrderStatus::Completed,
                to: chefport_core::OrderStatus::New,
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(AppError::BadRequest("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(AppError::Store(StoreError::DataCorruption(
                "x".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let response =
            AppError::Store(StoreError::DataCorruption("secret column".to_string()))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
