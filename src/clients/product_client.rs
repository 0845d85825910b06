//! # Product Client
//!
//! Provides a high‑level API for interacting with the `Product` actor.
//! It wraps a `ResourceClient<Product>` and exposes the catalog operations: lookups,
//! filters, stock adjustments and inventory aggregates.
use std::collections::BTreeMap;

use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, Query, ResourceClient};
use crate::model::{CatalogStats, Product, ProductCreate, ProductId, ProductUpdate, StockCheck};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Product> for ProductClient {
    type Error = ProductError;

    fn inner(&self) -> &ResourceClient<Product> {
        &self.inner
    }

    fn map_error(e: FrameworkError<Product>) -> Self::Error {
        match e {
            FrameworkError::Entity(e) => e,
            FrameworkError::NotFound(id) => ProductError::NotFound(id),
            other => ProductError::ActorCommunicationError(other.to_string()),
        }
    }
}

/// Rejects zero and negative quantities before they reach the actor.
fn units(quantity: i64) -> Result<u32, ProductError> {
    if quantity <= 0 {
        return Err(ProductError::invalid("quantity", "must be greater than 0"));
    }
    u32::try_from(quantity).map_err(|_| ProductError::invalid("quantity", "is too large"))
}

impl ProductClient {
    // --- Reads ---

    /// Fetches a product; absence is not an error.
    #[instrument(skip(self))]
    pub async fn lookup(&self, id: ProductId) -> Result<Option<Product>, ProductError> {
        self.get(id).await
    }

    /// Fetches a product that must exist.
    #[instrument(skip(self))]
    pub async fn require(&self, id: ProductId) -> Result<Product, ProductError> {
        self.get(id).await?.ok_or(ProductError::NotFound(id))
    }

    /// Resolves a free-form criterion: a numeric id first, then the first name match.
    #[instrument(skip(self))]
    pub async fn find(&self, criterion: &str) -> Result<Option<Product>, ProductError> {
        if let Ok(id) = criterion.trim().parse::<u32>() {
            if let Some(product) = self.get(ProductId(id)).await? {
                return Ok(Some(product));
            }
        }
        Ok(self.search_by_name(criterion).await?.into_iter().next())
    }

    async fn query(&self, query: Query<Product>) -> Result<Vec<Product>, ProductError> {
        debug!(query = query.label(), "Sending request");
        self.inner.list(query).await.map_err(Self::map_error)
    }

    /// Products with stock on hand.
    #[instrument(skip(self))]
    pub async fn list_available(&self) -> Result<Vec<Product>, ProductError> {
        self.query(Query::new("available", |p: &Product| p.stock > 0))
            .await
    }

    /// Case-insensitive substring match on the name. A blank query matches nothing.
    #[instrument(skip(self))]
    pub async fn search_by_name(&self, name: &str) -> Result<Vec<Product>, ProductError> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        self.query(Query::new(format!("name contains '{needle}'"), move |p: &Product| {
            p.name.to_lowercase().contains(&needle)
        }))
        .await
    }

    #[instrument(skip(self))]
    pub async fn filter_by_category(&self, category: &str) -> Result<Vec<Product>, ProductError> {
        let category = category.to_string();
        self.query(Query::new(format!("category = '{category}'"), move |p: &Product| {
            p.category == category
        }))
        .await
    }

    /// Products priced within `min..=max`.
    ///
    /// # Errors
    /// `InvalidArgument` when `min` is negative or `max < min`; nothing is queried then.
    #[instrument(skip(self))]
    pub async fn filter_by_price_range(&self, min: f64, max: f64) -> Result<Vec<Product>, ProductError> {
        if min < 0.0 {
            return Err(ProductError::InvalidArgument(format!(
                "minimum price {min} must not be negative"
            )));
        }
        if max < min {
            return Err(ProductError::InvalidArgument(format!(
                "maximum price {max} is below minimum price {min}"
            )));
        }
        self.query(Query::new(format!("price in {min}..={max}"), move |p: &Product| {
            (min..=max).contains(&p.price)
        }))
        .await
    }

    // --- Writes ---

    #[instrument(skip(self))]
    pub async fn add(&self, params: ProductCreate) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: ProductId, update: ProductUpdate) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn set_price(&self, id: ProductId, price: f64) -> Result<Product, ProductError> {
        match self
            .inner
            .perform_action(id, ProductAction::SetPrice(price))
            .await
        {
            Ok(ProductActionResult::SetPrice(product)) => Ok(product),
            Ok(_) => unreachable!("SetPrice action must return SetPrice result"),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    #[instrument(skip(self))]
    pub async fn set_stock(&self, id: ProductId, stock: i64) -> Result<Product, ProductError> {
        match self
            .inner
            .perform_action(id, ProductAction::SetStock(stock))
            .await
        {
            Ok(ProductActionResult::SetStock(product)) => Ok(product),
            Ok(_) => unreachable!("SetStock action must return SetStock result"),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    /// Takes `quantity` units out of stock. Returns the stock left.
    #[instrument(skip(self))]
    pub async fn decrement_stock(&self, id: ProductId, quantity: i64) -> Result<u32, ProductError> {
        let quantity = units(quantity)?;
        match self
            .inner
            .perform_action(id, ProductAction::Decrement(quantity))
            .await
        {
            Ok(ProductActionResult::Decrement(left)) => Ok(left),
            Ok(_) => unreachable!("Decrement action must return Decrement result"),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    /// Decrements every listed product or none of them.
    #[instrument(skip(self))]
    pub async fn decrement_stock_all(&self, requirements: Vec<(ProductId, u32)>) -> Result<(), ProductError> {
        let actions = requirements
            .into_iter()
            .map(|(id, quantity)| (id, ProductAction::Decrement(quantity)))
            .collect();
        self.inner
            .transaction(actions)
            .await
            .map(|_| ())
            .map_err(Self::map_error)
    }

    /// Puts `quantity` units back into stock. Returns the new stock level.
    #[instrument(skip(self))]
    pub async fn increment_stock(&self, id: ProductId, quantity: i64) -> Result<u32, ProductError> {
        let quantity = units(quantity)?;
        match self
            .inner
            .perform_action(id, ProductAction::Increment(quantity))
            .await
        {
            Ok(ProductActionResult::Increment(stock)) => Ok(stock),
            Ok(_) => unreachable!("Increment action must return Increment result"),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    /// Compares `quantity` against the current stock without reserving anything.
    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: ProductId, quantity: u32) -> Result<StockCheck, ProductError> {
        let product = self.require(id).await?;
        Ok(StockCheck {
            product_id: product.id,
            product_name: product.name,
            current_stock: product.stock,
            requested: quantity,
            sufficient: product.stock >= quantity,
        })
    }

    /// Current stock level of one product.
    #[instrument(skip(self))]
    pub async fn stock_level(&self, id: ProductId) -> Result<u32, ProductError> {
        match self
            .inner
            .perform_action(id, ProductAction::CheckStock)
            .await
        {
            Ok(ProductActionResult::CheckStock(level)) => Ok(level),
            Ok(_) => unreachable!("CheckStock action must return CheckStock result"),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    /// Deletes a product and returns the removed record.
    #[instrument(skip(self))]
    pub async fn delete_confirmed(&self, id: ProductId) -> Result<Product, ProductError> {
        self.inner
            .delete(id)
            .await
            .map_err(Self::map_error)?
            .ok_or(ProductError::NotFound(id))
    }

    // --- Aggregates ---

    /// Products with `0 < stock <= threshold`.
    #[instrument(skip(self))]
    pub async fn low_stock(&self, threshold: u32) -> Result<Vec<Product>, ProductError> {
        self.query(Query::new(format!("0 < stock <= {threshold}"), move |p: &Product| {
            p.stock > 0 && p.stock <= threshold
        }))
        .await
    }

    /// Sum of price × stock over the whole catalog.
    #[instrument(skip(self))]
    pub async fn inventory_value(&self) -> Result<f64, ProductError> {
        Ok(self.find_all().await?.iter().map(Product::stock_value).sum())
    }

    #[instrument(skip(self))]
    pub async fn count_by_category(&self) -> Result<BTreeMap<String, usize>, ProductError> {
        Ok(count_categories(&self.find_all().await?))
    }

    #[instrument(skip(self))]
    pub async fn statistics(&self, low_stock_threshold: u32) -> Result<CatalogStats, ProductError> {
        let products = self.find_all().await?;
        Ok(CatalogStats {
            total_products: products.len(),
            available_products: products.iter().filter(|p| p.available).count(),
            inventory_value: products.iter().map(Product::stock_value).sum(),
            low_stock_products: products
                .iter()
                .filter(|p| p.stock > 0 && p.stock <= low_stock_threshold)
                .count(),
            products_by_category: count_categories(&products),
        })
    }
}

fn count_categories(products: &[Product]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for product in products {
        *counts.entry(product.category.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{create_mock_client, expect_action, expect_transaction, MockClient};

    fn product(id: u32, name: &str, price: f64, category: &str, stock: u32) -> Product {
        let mut product = Product::new(ProductId(id), name, price, category, stock);
        product.available = stock > 0;
        product
    }

    #[tokio::test]
    async fn test_check_stock_level_returns_correct_level() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let product_client = ProductClient::new(client);

        let check_task = tokio::spawn(async move { product_client.stock_level(ProductId(1)).await });

        let (id, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");

        assert_eq!(id, ProductId(1));
        assert!(matches!(action, ProductAction::CheckStock));

        responder
            .send(Ok(ProductActionResult::CheckStock(42)))
            .unwrap();

        let result = check_task.await.unwrap();
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_decrement_stock_unwraps_entity_error() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let product_client = ProductClient::new(client);

        let task = tokio::spawn(async move { product_client.decrement_stock(ProductId(1), 100).await });

        let (_, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        match action {
            ProductAction::Decrement(amount) => assert_eq!(amount, 100),
            _ => panic!("Expected Decrement action"),
        }

        let insufficient = ProductError::InsufficientStock {
            product: "Widget".into(),
            available: 5,
            requested: 100,
        };
        responder
            .send(Err(FrameworkError::Entity(insufficient.clone())))
            .unwrap();

        assert_eq!(task.await.unwrap(), Err(insufficient));
    }

    #[tokio::test]
    async fn test_decrement_rejects_non_positive_quantity_locally() {
        let mock = MockClient::<Product>::new();
        let client = ProductClient::new(mock.client());

        assert!(matches!(
            client.decrement_stock(ProductId(1), 0).await,
            Err(ProductError::InvalidData { .. })
        ));
        assert!(matches!(
            client.increment_stock(ProductId(1), -2).await,
            Err(ProductError::InvalidData { .. })
        ));
        mock.verify();
    }

    #[tokio::test]
    async fn test_decrement_stock_all_sends_one_transaction() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let product_client = ProductClient::new(client);

        let task = tokio::spawn(async move {
            product_client
                .decrement_stock_all(vec![(ProductId(2), 1), (ProductId(1), 3)])
                .await
        });

        let (actions, responder) = expect_transaction(&mut receiver)
            .await
            .expect("Expected Transaction request");
        let ids: Vec<ProductId> = actions.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![ProductId(2), ProductId(1)]);

        responder
            .send(Ok(vec![
                ProductActionResult::Decrement(2),
                ProductActionResult::Decrement(9),
            ]))
            .unwrap();
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_price_range_is_validated_before_querying() {
        let mock = MockClient::<Product>::new();
        let client = ProductClient::new(mock.client());

        assert!(matches!(
            client.filter_by_price_range(-1.0, 10.0).await,
            Err(ProductError::InvalidArgument(_))
        ));
        assert!(matches!(
            client.filter_by_price_range(10.0, 5.0).await,
            Err(ProductError::InvalidArgument(_))
        ));
        // No List expectation is registered, so a request would come back ActorDropped.
        mock.verify();
    }

    #[tokio::test]
    async fn test_blank_search_matches_nothing() {
        let mock = MockClient::<Product>::new();
        let client = ProductClient::new(mock.client());

        assert!(client.search_by_name("   ").await.unwrap().is_empty());
        mock.verify();
    }

    #[tokio::test]
    async fn test_lookup_and_require() {
        let mut mock = MockClient::<Product>::new();
        mock.expect_get(ProductId(7)).return_ok(None);
        mock.expect_get(ProductId(7)).return_ok(None);

        let client = ProductClient::new(mock.client());
        assert_eq!(client.lookup(ProductId(7)).await.unwrap(), None);
        assert_eq!(
            client.require(ProductId(7)).await,
            Err(ProductError::NotFound(ProductId(7)))
        );
        mock.verify();
    }

    #[tokio::test]
    async fn test_find_falls_back_to_name() {
        let mut mock = MockClient::<Product>::new();
        mock.expect_get(ProductId(3)).return_ok(None);
        mock.expect_list().return_ok(vec![]);
        mock.expect_list()
            .return_ok(vec![product(1, "Blue Widget", 10.0, "tools", 5)]);

        let client = ProductClient::new(mock.client());
        assert_eq!(client.find("3").await.unwrap(), None);

        let found = client.find("widget").await.unwrap().unwrap();
        assert_eq!(found.id, ProductId(1));
        mock.verify();
    }

    #[tokio::test]
    async fn test_statistics() {
        let mut mock = MockClient::<Product>::new();
        mock.expect_list().return_ok(vec![
            product(1, "Widget", 10.0, "tools", 5),
            product(2, "Gadget", 2.5, "tools", 40),
            product(3, "Rake", 20.0, "garden", 0),
        ]);

        let client = ProductClient::new(mock.client());
        let stats = client.statistics(10).await.unwrap();

        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.available_products, 2);
        assert_eq!(stats.inventory_value, 150.0);
        assert_eq!(stats.low_stock_products, 1);
        assert_eq!(stats.products_by_category.get("tools"), Some(&2));
        assert_eq!(stats.products_by_category.get("garden"), Some(&1));
        mock.verify();
    }

    #[tokio::test]
    async fn test_delete_confirmed_reports_absence() {
        let mut mock = MockClient::<Product>::new();
        mock.expect_delete(ProductId(4)).return_ok(None);

        let client = ProductClient::new(mock.client());
        assert_eq!(
            client.delete_confirmed(ProductId(4)).await,
            Err(ProductError::NotFound(ProductId(4)))
        );
        mock.verify();
    }
}
