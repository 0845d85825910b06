use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, Query, ResourceClient};
use crate::model::{Order, OrderCreate, OrderId, OrderLine, OrderState};
use crate::order_actor::{OrderAction, OrderError};
use async_trait::async_trait;

/// Client for interacting with the Order actor.
///
/// Lines arrive here already validated against the catalog; stock is only taken when
/// the order actor handles [`OrderAction::Confirm`].
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, params), fields(customer = %params.customer_name))]
    pub async fn create(&self, params: OrderCreate) -> Result<Order, OrderError> {
        debug!(?params, "create called");
        info!("Sending create to actor");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    /// Fetches an order that must exist.
    #[instrument(skip(self))]
    pub async fn require(&self, id: OrderId) -> Result<Order, OrderError> {
        self.get(id).await?.ok_or(OrderError::NotFound(id))
    }

    async fn query(&self, query: Query<Order>) -> Result<Vec<Order>, OrderError> {
        debug!(query = query.label(), "Sending request");
        self.inner.list(query).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn list_by_state(&self, state: OrderState) -> Result<Vec<Order>, OrderError> {
        self.query(Query::new(format!("state = {state}"), move |o: &Order| o.state == state))
            .await
    }

    /// Case-insensitive substring match on the customer name. A blank query matches
    /// nothing.
    #[instrument(skip(self))]
    pub async fn search_by_customer(&self, customer: &str) -> Result<Vec<Order>, OrderError> {
        let needle = customer.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        self.query(Query::new(format!("customer contains '{needle}'"), move |o: &Order| {
            o.customer_name.to_lowercase().contains(&needle)
        }))
        .await
    }

    /// Orders created within `from..=to`.
    #[instrument(skip(self))]
    pub async fn list_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Order>, OrderError> {
        if from > to {
            return Err(OrderError::invalid("from", "must not be after 'to'"));
        }
        self.query(Query::new(format!("created in {from}..={to}"), move |o: &Order| {
            (from..=to).contains(&o.created_at)
        }))
        .await
    }

    async fn act(&self, id: OrderId, action: OrderAction) -> Result<Order, OrderError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self, line), fields(product_id = %line.product_id, quantity = line.quantity))]
    pub async fn add_line(&self, id: OrderId, line: OrderLine) -> Result<Order, OrderError> {
        self.act(id, OrderAction::AddLine(line)).await
    }

    #[instrument(skip(self))]
    pub async fn remove_line(&self, id: OrderId, index: usize) -> Result<Order, OrderError> {
        self.act(id, OrderAction::RemoveLine(index)).await
    }

    #[instrument(skip(self))]
    pub async fn reduce_line(&self, id: OrderId, index: usize, units: i64) -> Result<Order, OrderError> {
        self.act(id, OrderAction::ReduceLine { index, units }).await
    }

    #[instrument(skip(self))]
    pub async fn confirm(&self, id: OrderId) -> Result<Order, OrderError> {
        self.act(id, OrderAction::Confirm).await
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, id: OrderId) -> Result<Order, OrderError> {
        self.act(id, OrderAction::Cancel).await
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError<Order>) -> Self::Error {
        match e {
            FrameworkError::Entity(e) => e,
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockClient;

    #[tokio::test]
    async fn test_confirm_maps_missing_order() {
        let mut mock = MockClient::<Order>::new();
        mock.expect_action(OrderId(9))
            .return_err(FrameworkError::NotFound(OrderId(9)));

        let client = OrderClient::new(mock.client());
        assert_eq!(client.confirm(OrderId(9)).await, Err(OrderError::NotFound(OrderId(9))));
        mock.verify();
    }

    #[tokio::test]
    async fn test_dropped_reply_is_communication_error() {
        let mock = MockClient::<Order>::new();
        let client = OrderClient::new(mock.client());

        assert!(matches!(
            client.cancel(OrderId(1)).await,
            Err(OrderError::ActorCommunicationError(_))
        ));
    }

    #[tokio::test]
    async fn test_list_between_rejects_inverted_range() {
        let mock = MockClient::<Order>::new();
        let client = OrderClient::new(mock.client());

        let now = Utc::now();
        let earlier = now - chrono::Duration::hours(1);
        assert!(matches!(
            client.list_between(now, earlier).await,
            Err(OrderError::InvalidData { .. })
        ));
        mock.verify();
    }

    #[tokio::test]
    async fn test_blank_customer_search_matches_nothing() {
        let mock = MockClient::<Order>::new();
        let client = OrderClient::new(mock.client());

        assert!(client.search_by_customer(" ").await.unwrap().is_empty());
        mock.verify();
    }
}
