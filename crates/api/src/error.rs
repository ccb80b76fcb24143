//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::{AbortReason, CheckoutError, OrderError};
use domain::CartError;
use storage::StorageError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Missing or malformed identity headers.
    Unauthorized(String),
    /// Authenticated but not allowed.
    Forbidden(String),
    /// Cart manipulation error.
    Cart(CartError),
    /// Checkout execution error.
    Checkout(CheckoutError),
    /// Order lookup or administration error.
    Order(OrderError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Cart(err) => cart_error_to_response(err),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Order(err) => order_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn cart_error_to_response(err: CartError) -> (StatusCode, String) {
    match &err {
        CartError::ProductMissing(_) | CartError::LineNotFound(_) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        CartError::OutOfStock(_) | CartError::InsufficientStock(_) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        CartError::Storage(_) => storage_error_to_response(err.to_string()),
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    match &err {
        CheckoutError::Aborted(reason) => match reason {
            AbortReason::NotAuthenticated => (StatusCode::UNAUTHORIZED, err.to_string()),
            AbortReason::EmptyCart => (StatusCode::BAD_REQUEST, err.to_string()),
            AbortReason::ProductMissing(_) => (StatusCode::NOT_FOUND, err.to_string()),
            AbortReason::InsufficientStock { .. } => (StatusCode::CONFLICT, err.to_string()),
        },
        CheckoutError::Storage(_) => storage_error_to_response(err.to_string()),
    }
}

fn order_error_to_response(err: OrderError) -> (StatusCode, String) {
    match &err {
        OrderError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        OrderError::AccessDenied => (StatusCode::FORBIDDEN, err.to_string()),
        OrderError::Storage(_) => storage_error_to_response(err.to_string()),
    }
}

fn storage_error_to_response(message: String) -> (StatusCode, String) {
    tracing::error!(error = %message, "storage failure");
    (StatusCode::INTERNAL_SERVER_ERROR, message)
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        ApiError::Cart(err)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ProductNotFound(id) => {
                ApiError::NotFound(format!("Product {id} not found"))
            }
            StorageError::InvalidStatus(e) => ApiError::BadRequest(e.to_string()),
            StorageError::InvalidAmount => {
                ApiError::BadRequest("amount must be greater than zero".to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}
