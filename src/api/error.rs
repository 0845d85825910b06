//! Boundary errors: every actor error kind mapped to a status and a JSON body.

use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::error;

use crate::order_actor::OrderError;
use crate::product_actor::ProductError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    InvalidData,
    InvalidArgument,
    ProductUnavailable,
    InsufficientStock,
    InvalidState,
    EmptyOrder,
    OperationNotAllowed,
    Internal,
}

impl ErrorKind {
    /// HTTP-style status code for the kind.
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::InvalidData | ErrorKind::InvalidArgument => 400,
            ErrorKind::ProductUnavailable
            | ErrorKind::InsufficientStock
            | ErrorKind::InvalidState
            | ErrorKind::EmptyOrder
            | ErrorKind::OperationNotAllowed => 409,
            ErrorKind::Internal => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::InvalidData => "INVALID_DATA",
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::ProductUnavailable => "PRODUCT_UNAVAILABLE",
            ErrorKind::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorKind::InvalidState => "INVALID_STATE",
            ErrorKind::EmptyOrder => "EMPTY_ORDER",
            ErrorKind::OperationNotAllowed => "OPERATION_NOT_ALLOWED",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error as reported to API callers.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub status: u16,
    pub kind: ErrorKind,
    pub message: String,
    pub details: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: kind.status(),
            kind,
            message: message.into(),
            details: Map::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// Logs the underlying failure and hides it from the caller.
    pub fn internal(cause: &str) -> Self {
        error!(cause, "Internal error");
        Self::new(ErrorKind::Internal, "Internal server error")
    }

    pub fn body(&self) -> Value {
        json!({
            "kind": self.kind,
            "message": self.message,
            "details": self.details,
            "timestamp": self.timestamp,
        })
    }
}

fn not_found(resource: &str, id: u32, message: String) -> ApiError {
    ApiError::new(ErrorKind::NotFound, message)
        .with_detail("resource", resource)
        .with_detail("id", id)
}

fn invalid_data(field: &str, reason: &str, message: String) -> ApiError {
    ApiError::new(ErrorKind::InvalidData, message)
        .with_detail("field", field)
        .with_detail("reason", reason)
}

impl From<ProductError> for ApiError {
    fn from(e: ProductError) -> Self {
        let message = e.to_string();
        match e {
            ProductError::NotFound(id) => not_found("product", id.0, message),
            ProductError::InvalidData { field, reason } => invalid_data(&field, &reason, message),
            ProductError::InvalidArgument(_) => ApiError::new(ErrorKind::InvalidArgument, message),
            ProductError::ProductUnavailable(product) => {
                ApiError::new(ErrorKind::ProductUnavailable, message).with_detail("product", product)
            }
            ProductError::InsufficientStock {
                product,
                available,
                requested,
            } => ApiError::new(ErrorKind::InsufficientStock, message)
                .with_detail("product", product)
                .with_detail("available", available)
                .with_detail("requested", requested),
            ProductError::ActorCommunicationError(cause) => ApiError::internal(&cause),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(e: OrderError) -> Self {
        let message = e.to_string();
        match e {
            OrderError::NotFound(id) => not_found("order", id.0, message),
            OrderError::InvalidData { field, reason } => invalid_data(&field, &reason, message),
            OrderError::InvalidState {
                current,
                operation,
                required,
            } => {
                let error = ApiError::new(ErrorKind::InvalidState, message)
                    .with_detail("current_state", current.to_string())
                    .with_detail("operation", operation);
                match required {
                    Some(state) => error.with_detail("required_state", state.to_string()),
                    None => error,
                }
            }
            OrderError::EmptyOrder => ApiError::new(ErrorKind::EmptyOrder, message),
            OrderError::OperationNotAllowed(_) => ApiError::new(ErrorKind::OperationNotAllowed, message),
            OrderError::Product(e) => e.into(),
            OrderError::ActorCommunicationError(cause) => ApiError::internal(&cause),
        }
    }
}
