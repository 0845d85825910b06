/// Represents a customer order and the lines it owns.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](crate::framework::ActorEntity) trait,
/// allowing it to be managed by a [`ResourceActor`](crate::framework::ResourceActor).
///
/// See [`impl ActorEntity for Order`](#impl-ActorEntity-for-Order) for details on:
/// - Creation parameters ([`OrderCreate`])
/// - Custom actions ([`OrderAction`](crate::order_actor::OrderAction))
use crate::model::{Product, ProductId};
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// Where an order is in its lifecycle. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    Pending,
    Confirmed,
    Cancelled,
}

impl Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderState::Pending => "pending",
            OrderState::Confirmed => "confirmed",
            OrderState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// One product line of an order, with the price captured when it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl OrderLine {
    /// Validates a requested quantity against the product as it is now and captures its
    /// name and price.
    ///
    /// # Errors
    /// - `InvalidData` when `quantity <= 0`
    /// - `ProductUnavailable` when the product is flagged unavailable
    /// - `InsufficientStock` when the product has fewer units than requested
    pub fn snapshot(product: &Product, quantity: i64) -> Result<Self, OrderError> {
        let quantity = positive_quantity(quantity)?;
        if !product.available {
            return Err(ProductError::ProductUnavailable(product.name.clone()).into());
        }
        if product.stock < quantity {
            return Err(ProductError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock,
                requested: quantity,
            }
            .into());
        }
        Ok(Self {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity,
            unit_price: product.price,
        })
    }

    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Converts a caller-supplied quantity into a strictly positive count.
pub(crate) fn positive_quantity(quantity: i64) -> Result<u32, OrderError> {
    if quantity <= 0 {
        return Err(OrderError::invalid("quantity", "must be greater than 0"));
    }
    u32::try_from(quantity).map_err(|_| OrderError::invalid("quantity", "is too large"))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub created_at: DateTime<Utc>,
    pub state: OrderState,
    pub lines: Vec<OrderLine>,
}

/// Payload for creating a new order. Lines are validated snapshots; an empty list
/// creates an empty pending order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub customer_name: String,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Creates a pending Order stamped with the current time.
    pub fn new(id: OrderId, customer_name: impl Into<String>, lines: Vec<OrderLine>) -> Self {
        Self {
            id,
            customer_name: customer_name.into(),
            created_at: Utc::now(),
            state: OrderState::Pending,
            lines,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(OrderLine::subtotal).sum()
    }

    /// Total minus `percentage` percent of it.
    pub fn total_with_discount(&self, percentage: f64) -> Result<f64, OrderError> {
        if !(0.0..=100.0).contains(&percentage) {
            return Err(OrderError::invalid("percentage", "must be between 0 and 100"));
        }
        let total = self.total();
        Ok(total - total * (percentage / 100.0))
    }

    /// Units to take from the catalog for each line, in line order.
    pub fn stock_requirements(&self) -> Vec<(ProductId, u32)> {
        self.lines
            .iter()
            .map(|line| (line.product_id, line.quantity))
            .collect()
    }

    pub fn summary(&self) -> String {
        Summary(self).to_string()
    }

    // --- Lifecycle ---

    pub fn ensure_pending(&self, operation: &'static str) -> Result<(), OrderError> {
        if self.state == OrderState::Pending {
            Ok(())
        } else {
            Err(OrderError::InvalidState {
                current: self.state,
                operation,
                required: Some(OrderState::Pending),
            })
        }
    }

    pub fn add_line(&mut self, line: OrderLine) -> Result<(), OrderError> {
        self.ensure_pending("add a line to")?;
        if line.quantity == 0 {
            return Err(OrderError::invalid("quantity", "must be greater than 0"));
        }
        self.lines.push(line);
        Ok(())
    }

    /// Removes the line at `index` (0-based).
    pub fn remove_line(&mut self, index: usize) -> Result<OrderLine, OrderError> {
        self.ensure_pending("edit a line of")?;
        self.check_index(index)?;
        Ok(self.lines.remove(index))
    }

    /// Takes `units` off the line at `index` (0-based); the line disappears once its
    /// quantity would reach zero.
    pub fn reduce_line(&mut self, index: usize, units: i64) -> Result<(), OrderError> {
        self.ensure_pending("edit a line of")?;
        self.check_index(index)?;
        let units = positive_quantity(units)?;
        let line = &mut self.lines[index];
        if units >= line.quantity {
            self.lines.remove(index);
        } else {
            line.quantity -= units;
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), OrderError> {
        if index < self.lines.len() {
            Ok(())
        } else {
            Err(OrderError::OperationNotAllowed(format!(
                "{} has no line at index {}",
                self.id, index
            )))
        }
    }

    /// Guards for the confirm transition: pending and non-empty.
    pub fn check_confirmable(&self) -> Result<(), OrderError> {
        self.ensure_pending("confirm")?;
        if self.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        Ok(())
    }

    /// Commits the order. Callers must have decremented stock first.
    pub fn mark_confirmed(&mut self) -> Result<(), OrderError> {
        self.check_confirmable()?;
        self.state = OrderState::Confirmed;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), OrderError> {
        self.ensure_pending("cancel")?;
        self.state = OrderState::Cancelled;
        Ok(())
    }
}

/// Multi-line, human-readable rendering of an order.
struct Summary<'a>(&'a Order);

impl Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = self.0;
        writeln!(f, "ORDER #{}", order.id.0)?;
        writeln!(f, "Customer: {}", order.customer_name)?;
        writeln!(f, "Date: {}", order.created_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "State: {}", order.state)?;
        writeln!(f)?;
        writeln!(f, "Products:")?;
        for (n, line) in order.lines.iter().enumerate() {
            writeln!(
                f,
                "{}. {} x {} = ${:.2}",
                n + 1,
                line.product_name,
                line.quantity,
                line.subtotal()
            )?;
        }
        writeln!(f)?;
        write!(f, "TOTAL: ${:.2}", order.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Product {
        Product::new(ProductId(1), "Widget", 10.0, "tools", 5)
    }

    fn gadget() -> Product {
        Product::new(ProductId(2), "Gadget", 2.5, "tools", 100)
    }

    fn pending_order() -> Order {
        Order::new(
            OrderId(1),
            "Ana",
            vec![
                OrderLine::snapshot(&widget(), 3).unwrap(),
                OrderLine::snapshot(&gadget(), 4).unwrap(),
            ],
        )
    }

    #[test]
    fn test_snapshot_captures_price() {
        let mut product = widget();
        let line = OrderLine::snapshot(&product, 2).unwrap();
        product.price = 99.0;
        assert_eq!(line.unit_price, 10.0);
        assert_eq!(line.subtotal(), 20.0);
    }

    #[test]
    fn test_snapshot_rejects_bad_requests() {
        assert!(matches!(
            OrderLine::snapshot(&widget(), 0),
            Err(OrderError::InvalidData { .. })
        ));

        let mut hidden = widget();
        hidden.available = false;
        assert!(matches!(
            OrderLine::snapshot(&hidden, 1),
            Err(OrderError::Product(ProductError::ProductUnavailable(_)))
        ));

        match OrderLine::snapshot(&widget(), 10) {
            Err(OrderError::Product(ProductError::InsufficientStock { available, requested, .. })) => {
                assert_eq!(available, 5);
                assert_eq!(requested, 10);
            }
            other => panic!("Expected InsufficientStock, got {:?}", other),
        }
    }

    #[test]
    fn test_totals() {
        let order = pending_order();
        assert_eq!(order.total(), 40.0);
        assert_eq!(order.item_count(), 7);
        assert_eq!(order.line_count(), 2);
        assert_eq!(order.total_with_discount(25.0).unwrap(), 30.0);
        assert!(order.total_with_discount(120.0).is_err());
    }

    #[test]
    fn test_reduce_line_removes_at_zero() {
        let mut order = pending_order();
        order.reduce_line(0, 1).unwrap();
        assert_eq!(order.lines[0].quantity, 2);

        order.reduce_line(0, 5).unwrap();
        assert_eq!(order.line_count(), 1);
        assert_eq!(order.lines[0].product_name, "Gadget");
        assert!(order.lines.iter().all(|line| line.quantity > 0));
    }

    #[test]
    fn test_line_edits_check_index() {
        let mut order = pending_order();
        assert!(matches!(
            order.remove_line(5),
            Err(OrderError::OperationNotAllowed(_))
        ));
        let removed = order.remove_line(1).unwrap();
        assert_eq!(removed.product_name, "Gadget");
    }

    #[test]
    fn test_confirm_and_cancel_only_from_pending() {
        let mut order = pending_order();
        order.mark_confirmed().unwrap();
        assert_eq!(order.state, OrderState::Confirmed);

        match order.cancel() {
            Err(OrderError::InvalidState { current, .. }) => assert_eq!(current, OrderState::Confirmed),
            other => panic!("Expected InvalidState, got {:?}", other),
        }
        assert!(matches!(
            order.add_line(OrderLine::snapshot(&widget(), 1).unwrap()),
            Err(OrderError::InvalidState { .. })
        ));

        let mut cancelled = pending_order();
        cancelled.cancel().unwrap();
        assert!(matches!(
            cancelled.mark_confirmed(),
            Err(OrderError::InvalidState { current: OrderState::Cancelled, .. })
        ));
        assert!(cancelled.cancel().is_err());
    }

    #[test]
    fn test_empty_order_cannot_confirm() {
        let mut order = Order::new(OrderId(2), "Ana", Vec::new());
        assert!(matches!(order.mark_confirmed(), Err(OrderError::EmptyOrder)));
        assert_eq!(order.state, OrderState::Pending);
    }

    #[test]
    fn test_summary_layout() {
        let summary = pending_order().summary();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines[0], "ORDER #1");
        assert_eq!(lines[1], "Customer: Ana");
        assert!(lines[2].starts_with("Date: "));
        assert_eq!(lines[3], "State: pending");
        assert_eq!(lines[5], "Products:");
        assert_eq!(lines[6], "1. Widget x 3 = $30.00");
        assert_eq!(lines[7], "2. Gadget x 4 = $10.00");
        assert_eq!(lines.last(), Some(&"TOTAL: $40.00"));
    }
}
