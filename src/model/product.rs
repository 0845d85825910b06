/// Represents a product in the catalog.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](crate::framework::ActorEntity) trait,
/// allowing it to be managed by a [`ResourceActor`](crate::framework::ResourceActor).
///
/// See [`impl ActorEntity for Product`](#impl-ActorEntity-for-Product) for details on:
/// - Creation parameters ([`ProductCreate`])
/// - Update parameters ([`ProductUpdate`])
/// - Custom actions ([`ProductAction`](crate::product_actor::ProductAction))
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::fmt::Display;

/// Type-safe identifier for Products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "product_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub image: Option<String>,
    pub stock: u32,
    pub available: bool,
}

impl Product {
    /// Creates an available Product with no description or image.
    ///
    /// No validation happens here; catalog creation goes through
    /// [`ProductCreate`] and the actor instead.
    pub fn new(id: ProductId, name: impl Into<String>, price: f64, category: impl Into<String>, stock: u32) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            price,
            category: category.into(),
            image: None,
            stock,
            available: true,
        }
    }

    /// Sets the stock level and keeps `available` in line with it.
    pub fn set_stock(&mut self, stock: u32) {
        self.stock = stock;
        self.available = stock > 0;
    }

    /// True when the product may be ordered in the given quantity right now.
    pub fn can_supply(&self, quantity: u32) -> bool {
        self.available && self.stock >= quantity
    }

    /// Value of the stock on hand at the current price.
    pub fn stock_value(&self) -> f64 {
        self.price * f64::from(self.stock)
    }
}

/// Payload for adding a product to the catalog.
///
/// `stock` is signed so that a negative value can be reported as invalid input rather
/// than rejected by the type system at the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
    pub stock: i64,
    /// Initial availability; defaults to `true` and is forced `true` when stock > 0.
    #[serde(default)]
    pub available: Option<bool>,
}

impl ProductCreate {
    pub fn new(name: impl Into<String>, price: f64, category: impl Into<String>, stock: i64) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            category: category.into(),
            image: None,
            stock,
            available: None,
        }
    }
}

/// Partial update for a product. Absent or meaningless values leave the stored field
/// alone: blank strings, non-positive prices and negative stock are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub stock: Option<i64>,
}

/// Result of comparing a requested quantity with a product's stock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockCheck {
    pub product_id: ProductId,
    pub product_name: String,
    pub current_stock: u32,
    pub requested: u32,
    pub sufficient: bool,
}

/// Catalog-wide figures for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_products: usize,
    pub available_products: usize,
    pub inventory_value: f64,
    pub low_stock_products: usize,
    pub products_by_category: BTreeMap<String, usize>,
}
