//! Error types for the Order actor.

use crate::model::{OrderId, OrderState};
use crate::product_actor::ProductError;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// A field of the request is structurally invalid.
    #[error("Invalid {field}: {reason}")]
    InvalidData { field: String, reason: String },

    /// The transition is not allowed from the order's current state.
    #[error("Cannot {operation} an order in state '{current}'{}", required_suffix(.required))]
    InvalidState {
        current: OrderState,
        operation: &'static str,
        required: Option<OrderState>,
    },

    /// Confirm (or create-with-lines) was attempted without any line.
    #[error("Order has no lines")]
    EmptyOrder,

    /// A business rule rejected the operation.
    #[error("Operation not allowed: {0}")]
    OperationNotAllowed(String),

    /// The catalog rejected a product lookup or stock change.
    #[error(transparent)]
    Product(#[from] ProductError),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        OrderError::InvalidData {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

fn required_suffix(required: &Option<OrderState>) -> String {
    required
        .map(|state| format!(" (requires '{}')", state))
        .unwrap_or_default()
}

impl From<String> for OrderError {
    fn from(msg: String) -> Self {
        OrderError::ActorCommunicationError(msg)
    }
}
