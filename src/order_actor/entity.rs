//! ActorEntity trait implementation for the Order domain type.
//!
//! The order actor owns the lifecycle state machine. Its context is the
//! [`ProductClient`], which `Confirm` uses to take stock for every line in one
//! all-or-nothing catalog transaction.

use super::actions::OrderAction;
use super::error::OrderError;
use crate::clients::ProductClient;
use crate::framework::ActorEntity;
use crate::model::{Order, OrderCreate, OrderId};
use async_trait::async_trait;
use tracing::info;

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = ();
    type Action = OrderAction;
    type ActionResult = Order;
    type Context = ProductClient;
    type Error = OrderError;

    fn id(&self) -> &OrderId {
        &self.id
    }

    /// Creates a pending Order from lines that were validated against the catalog.
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        if params.customer_name.trim().is_empty() {
            return Err(OrderError::invalid("customer_name", "must not be blank"));
        }
        if params.lines.iter().any(|line| line.quantity == 0) {
            return Err(OrderError::invalid("quantity", "must be greater than 0"));
        }
        Ok(Self::new(id, params.customer_name, params.lines))
    }

    async fn on_update(&mut self, _update: (), _ctx: &ProductClient) -> Result<(), OrderError> {
        Ok(())
    }

    async fn handle_action(&mut self, action: OrderAction, ctx: &ProductClient) -> Result<Order, OrderError> {
        match action {
            OrderAction::AddLine(line) => self.add_line(line)?,
            OrderAction::RemoveLine(index) => {
                self.remove_line(index)?;
            }
            OrderAction::ReduceLine { index, units } => self.reduce_line(index, units)?,
            OrderAction::Confirm => {
                self.check_confirmable()?;
                // The actor does not take its next message until the catalog answers,
                // so the state checked above still holds when we commit below.
                ctx.decrement_stock_all(self.stock_requirements()).await?;
                self.mark_confirmed()?;
                info!(order_id = %self.id, total = self.total(), "Order confirmed");
            }
            OrderAction::Cancel => {
                self.cancel()?;
                info!(order_id = %self.id, "Order cancelled");
            }
        }
        Ok(self.clone())
    }
}
