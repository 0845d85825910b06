//! # Order Service
//!
//! Orchestration across the two actors. The service resolves products through the
//! [`ProductClient`], snapshots them into [`OrderLine`]s and drives the order actor's
//! lifecycle through the [`OrderClient`]. It owns no state of its own.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::clients::{ActorClient, OrderClient, ProductClient};
use crate::model::order::positive_quantity;
use crate::model::{Order, OrderCreate, OrderId, OrderLine, OrderState, ProductId};
use crate::order_actor::OrderError;

#[derive(Clone)]
pub struct OrderService {
    orders: OrderClient,
    catalog: ProductClient,
}

impl OrderService {
    pub fn new(orders: OrderClient, catalog: ProductClient) -> Self {
        Self { orders, catalog }
    }

    /// Resolves a product and captures a line for it.
    async fn line_for(&self, product_id: ProductId, quantity: i64) -> Result<OrderLine, OrderError> {
        let product = self.catalog.require(product_id).await?;
        OrderLine::snapshot(&product, quantity)
    }

    // --- Creation ---

    #[instrument(skip(self))]
    pub async fn create_empty(&self, customer_name: &str) -> Result<Order, OrderError> {
        self.orders
            .create(OrderCreate {
                customer_name: customer_name.to_string(),
                lines: Vec::new(),
            })
            .await
    }

    /// Creates a pending order with one line per `(product, quantity)` item.
    ///
    /// # Errors
    /// - `InvalidData` for a blank customer or a non-positive quantity
    /// - `EmptyOrder` when `items` is empty
    /// - `Product(NotFound | ProductUnavailable | InsufficientStock)` from line validation
    ///
    /// Nothing is stored unless every line validates.
    #[instrument(skip(self))]
    pub async fn create_with_lines(
        &self,
        customer_name: &str,
        items: Vec<(ProductId, i64)>,
    ) -> Result<Order, OrderError> {
        if customer_name.trim().is_empty() {
            return Err(OrderError::invalid("customer_name", "must not be blank"));
        }
        if items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let mut lines = Vec::with_capacity(items.len());
        for (product_id, quantity) in items {
            lines.push(self.line_for(product_id, quantity).await?);
        }
        debug!(lines = lines.len(), "All lines validated");

        self.orders
            .create(OrderCreate {
                customer_name: customer_name.to_string(),
                lines,
            })
            .await
    }

    // --- Line editing ---

    /// Appends a line for `quantity` units of a product to a pending order.
    ///
    /// Guards run in order: the order exists and is pending, the quantity is positive,
    /// then the product exists, is available and has enough stock.
    #[instrument(skip(self))]
    pub async fn add_line(&self, order_id: OrderId, product_id: ProductId, quantity: i64) -> Result<Order, OrderError> {
        let order = self.orders.require(order_id).await?;
        order.ensure_pending("add a line to")?;
        positive_quantity(quantity)?;

        let line = self.line_for(product_id, quantity).await?;
        self.orders.add_line(order_id, line).await
    }

    #[instrument(skip(self))]
    pub async fn remove_line(&self, order_id: OrderId, index: usize) -> Result<Order, OrderError> {
        self.orders.remove_line(order_id, index).await
    }

    #[instrument(skip(self))]
    pub async fn reduce_line(&self, order_id: OrderId, index: usize, units: i64) -> Result<Order, OrderError> {
        self.orders.reduce_line(order_id, index, units).await
    }

    // --- Transitions ---

    #[instrument(skip(self))]
    pub async fn confirm(&self, order_id: OrderId) -> Result<Order, OrderError> {
        let order = self.orders.confirm(order_id).await?;
        info!(%order_id, total = order.total(), "Confirmed");
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.orders.cancel(order_id).await
    }

    /// Removes the order in any state. Stock taken by a confirmed order stays taken.
    #[instrument(skip(self))]
    pub async fn delete(&self, order_id: OrderId) -> Result<bool, OrderError> {
        self.orders.delete(order_id).await
    }

    // --- Reads ---

    pub async fn get(&self, order_id: OrderId) -> Result<Option<Order>, OrderError> {
        self.orders.get(order_id).await
    }

    pub async fn find_all(&self) -> Result<Vec<Order>, OrderError> {
        self.orders.find_all().await
    }

    pub async fn list_by_state(&self, state: OrderState) -> Result<Vec<Order>, OrderError> {
        self.orders.list_by_state(state).await
    }

    pub async fn search_by_customer(&self, customer: &str) -> Result<Vec<Order>, OrderError> {
        self.orders.search_by_customer(customer).await
    }

    pub async fn list_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Order>, OrderError> {
        self.orders.list_between(from, to).await
    }

    // --- Reporting ---

    pub async fn total(&self, order_id: OrderId) -> Result<f64, OrderError> {
        Ok(self.orders.require(order_id).await?.total())
    }

    pub async fn total_with_discount(&self, order_id: OrderId, percentage: f64) -> Result<f64, OrderError> {
        self.orders.require(order_id).await?.total_with_discount(percentage)
    }

    pub async fn summary(&self, order_id: OrderId) -> Result<String, OrderError> {
        Ok(self.orders.require(order_id).await?.summary())
    }

    /// Sum of the totals of all confirmed orders.
    #[instrument(skip(self))]
    pub async fn total_sales(&self) -> Result<f64, OrderError> {
        let confirmed = self.orders.list_by_state(OrderState::Confirmed).await?;
        Ok(confirmed.iter().map(Order::total).sum())
    }

    pub async fn count_by_state(&self, state: OrderState) -> Result<usize, OrderError> {
        Ok(self.orders.list_by_state(state).await?.len())
    }
}
