//! Custom actions for the Product actor.
//!
//! This module defines the stock and price operations that can be performed on a
//! [`Product`](crate::model::Product) beyond plain CRUD. They are handled by
//! [`ActorEntity::handle_action`](crate::framework::ActorEntity::handle_action).

use crate::model::Product;

/// Custom actions for Product entities.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Reads the current stock level without modifying it.
    CheckStock,
    /// Replaces the price. Must be greater than zero.
    SetPrice(f64),
    /// Replaces the stock level. Must not be negative; recomputes availability.
    SetStock(i64),
    /// Takes units out of stock.
    ///
    /// # Errors
    /// Fails without touching the product if the amount exceeds the stock.
    Decrement(u32),
    /// Puts units back into stock (restock).
    Increment(u32),
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone)]
pub enum ProductActionResult {
    /// Current stock level
    CheckStock(u32),
    /// Product after the price change
    SetPrice(Product),
    /// Product after the stock change
    SetStock(Product),
    /// Stock left after the decrement
    Decrement(u32),
    /// Stock after the increment
    Increment(u32),
}
