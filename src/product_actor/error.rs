//! Error types for the Product actor.

use crate::model::ProductId;
use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    /// The requested product was not found.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// A field of the request is structurally invalid.
    #[error("Invalid {field}: {reason}")]
    InvalidData { field: String, reason: String },

    /// A query argument is out of range (e.g. an inverted price range).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The product exists but is flagged unavailable.
    #[error("Product '{0}' is not available")]
    ProductUnavailable(String),

    /// The requested quantity exceeds the available stock.
    #[error("Insufficient stock for '{product}': available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: u32,
        requested: u32,
    },

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl ProductError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ProductError::InvalidData {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<String> for ProductError {
    fn from(msg: String) -> Self {
        ProductError::ActorCommunicationError(msg)
    }
}
