//! ActorEntity trait implementation for the Product domain type.
//!
//! Validation of new products, the partial-update merge and every stock mutation live
//! here, so they all run inside the catalog actor one message at a time.

use super::actions::{ProductAction, ProductActionResult};
use super::error::ProductError;
use crate::framework::ActorEntity;
use crate::model::{Product, ProductCreate, ProductId, ProductUpdate};
use async_trait::async_trait;

fn non_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

fn valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

fn stock_level(stock: i64) -> Result<u32, ProductError> {
    if stock < 0 {
        return Err(ProductError::invalid("stock", "must not be negative"));
    }
    u32::try_from(stock).map_err(|_| ProductError::invalid("stock", "is too large"))
}

fn positive_quantity(quantity: u32) -> Result<u32, ProductError> {
    if quantity == 0 {
        return Err(ProductError::invalid("quantity", "must be greater than 0"));
    }
    Ok(quantity)
}

#[async_trait]
impl ActorEntity for Product {
    type Id = ProductId;
    type Create = ProductCreate;
    type Update = ProductUpdate;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Context = ();
    type Error = ProductError;

    fn id(&self) -> &ProductId {
        &self.id
    }

    /// Validates and builds a new Product.
    ///
    /// `available` keeps the caller's value (default `true`) and is forced `true` when
    /// the product starts with stock.
    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, ProductError> {
        if !non_blank(&params.name) {
            return Err(ProductError::invalid("name", "must not be blank"));
        }
        if !valid_price(params.price) {
            return Err(ProductError::invalid("price", "must be greater than 0"));
        }
        let stock = stock_level(params.stock)?;
        if !non_blank(&params.category) {
            return Err(ProductError::invalid("category", "must not be blank"));
        }

        let available = params.available.unwrap_or(true) || stock > 0;
        Ok(Self {
            id,
            name: params.name,
            description: params.description,
            price: params.price,
            category: params.category,
            image: params.image,
            stock,
            available,
        })
    }

    /// Merges a partial update; meaningless values are skipped, never rejected.
    async fn on_update(&mut self, update: ProductUpdate, _ctx: &()) -> Result<(), ProductError> {
        if let Some(name) = update.name.filter(|n| non_blank(n)) {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(price) = update.price.filter(|p| valid_price(*p)) {
            self.price = price;
        }
        if let Some(category) = update.category.filter(|c| non_blank(c)) {
            self.category = category;
        }
        if let Some(image) = update.image {
            self.image = Some(image);
        }
        if let Some(Ok(stock)) = update.stock.map(stock_level) {
            self.set_stock(stock);
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: ProductAction, _ctx: &()) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::CheckStock(self.stock)),
            ProductAction::SetPrice(price) => {
                if !valid_price(price) {
                    return Err(ProductError::invalid("price", "must be greater than 0"));
                }
                self.price = price;
                Ok(ProductActionResult::SetPrice(self.clone()))
            }
            ProductAction::SetStock(stock) => {
                let stock = stock_level(stock)?;
                self.set_stock(stock);
                Ok(ProductActionResult::SetStock(self.clone()))
            }
            ProductAction::Decrement(quantity) => {
                let quantity = positive_quantity(quantity)?;
                if self.stock < quantity {
                    return Err(ProductError::InsufficientStock {
                        product: self.name.clone(),
                        available: self.stock,
                        requested: quantity,
                    });
                }
                self.set_stock(self.stock - quantity);
                Ok(ProductActionResult::Decrement(self.stock))
            }
            ProductAction::Increment(quantity) => {
                let quantity = positive_quantity(quantity)?;
                let stock = self
                    .stock
                    .checked_add(quantity)
                    .ok_or_else(|| ProductError::invalid("quantity", "would overflow the stock counter"))?;
                self.set_stock(stock);
                Ok(ProductActionResult::Increment(self.stock))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str, price: f64, category: &str, stock: i64) -> Result<Product, ProductError> {
        Product::from_create_params(ProductId(1), ProductCreate::new(name, price, category, stock))
    }

    #[test]
    fn test_create_validation() {
        assert!(matches!(create(" ", 1.0, "tools", 1), Err(ProductError::InvalidData { field, .. }) if field == "name"));
        assert!(matches!(create("Widget", 0.0, "tools", 1), Err(ProductError::InvalidData { field, .. }) if field == "price"));
        assert!(matches!(create("Widget", 1.0, "tools", -1), Err(ProductError::InvalidData { field, .. }) if field == "stock"));
        assert!(matches!(create("Widget", 1.0, "", 1), Err(ProductError::InvalidData { field, .. }) if field == "category"));
    }

    #[test]
    fn test_create_availability() {
        assert!(create("Widget", 1.0, "tools", 0).unwrap().available);

        let mut params = ProductCreate::new("Widget", 1.0, "tools", 0);
        params.available = Some(false);
        assert!(!Product::from_create_params(ProductId(1), params).unwrap().available);

        let mut params = ProductCreate::new("Widget", 1.0, "tools", 3);
        params.available = Some(false);
        assert!(Product::from_create_params(ProductId(1), params).unwrap().available);
    }

    #[tokio::test]
    async fn test_update_skips_meaningless_values() {
        let mut product = create("Widget", 10.0, "tools", 5).unwrap();
        let update = ProductUpdate {
            name: Some("  ".into()),
            price: Some(-3.0),
            stock: Some(-1),
            category: Some("garden".into()),
            ..Default::default()
        };
        product.on_update(update, &()).await.unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.price, 10.0);
        assert_eq!(product.stock, 5);
        assert_eq!(product.category, "garden");

        let update = ProductUpdate {
            stock: Some(0),
            ..Default::default()
        };
        product.on_update(update, &()).await.unwrap();
        assert_eq!(product.stock, 0);
        assert!(!product.available);
    }

    #[tokio::test]
    async fn test_decrement_is_all_or_nothing() {
        let mut product = create("Widget", 10.0, "tools", 2).unwrap();

        let err = product.handle_action(ProductAction::Decrement(3), &()).await.unwrap_err();
        assert_eq!(
            err,
            ProductError::InsufficientStock {
                product: "Widget".into(),
                available: 2,
                requested: 3
            }
        );
        assert_eq!(product.stock, 2);

        let left = product.handle_action(ProductAction::Decrement(2), &()).await.unwrap();
        assert!(matches!(left, ProductActionResult::Decrement(0)));
        assert!(!product.available);

        product.handle_action(ProductAction::Increment(4), &()).await.unwrap();
        assert_eq!(product.stock, 4);
        assert!(product.available);
    }

    #[tokio::test]
    async fn test_zero_quantities_are_invalid() {
        let mut product = create("Widget", 10.0, "tools", 2).unwrap();
        assert!(product.handle_action(ProductAction::Decrement(0), &()).await.is_err());
        assert!(product.handle_action(ProductAction::Increment(0), &()).await.is_err());
        assert!(product.handle_action(ProductAction::SetPrice(0.0), &()).await.is_err());
        assert!(product.handle_action(ProductAction::SetStock(-5), &()).await.is_err());
    }
}
