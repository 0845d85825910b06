//! The request surface of the storefront, independent of any transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{OrderId, OrderState, ProductCreate, ProductId, ProductUpdate};

/// One `(product, quantity)` item of an order creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Every operation a caller can request.
///
/// Serialized adjacently tagged, e.g.
/// `{"type": "AddLine", "data": {"order_id": 1, "product_id": 2, "quantity": 3}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ApiRequest {
    // --- Catalog reads ---
    ListProducts,
    ListAvailableProducts,
    GetProduct { id: ProductId },
    FindProduct { criterion: String },
    SearchProducts { name: String },
    FilterByCategory { category: String },
    FilterByPriceRange { min: f64, max: f64 },

    // --- Catalog writes ---
    CreateProduct(ProductCreate),
    UpdateProduct { id: ProductId, update: ProductUpdate },
    SetPrice { id: ProductId, price: f64 },
    SetStock { id: ProductId, stock: i64 },
    Restock { id: ProductId, quantity: i64 },
    CheckStock { id: ProductId, quantity: u32 },
    DeleteProduct { id: ProductId },
    DeleteProductConfirmed { id: ProductId },

    // --- Catalog reports; thresholds default to the configured one ---
    LowStock { threshold: Option<u32> },
    InventoryValue,
    CountByCategory,
    CatalogStatistics { threshold: Option<u32> },

    // --- Order reads ---
    ListOrders,
    ListOrdersByState { state: OrderState },
    SearchOrdersByCustomer { customer: String },
    ListOrdersBetween { from: DateTime<Utc>, to: DateTime<Utc> },
    GetOrder { id: OrderId },

    // --- Order writes ---
    CreateEmptyOrder { customer_name: String },
    CreateOrder { customer_name: String, items: Vec<OrderItem> },
    AddLine { order_id: OrderId, product_id: ProductId, quantity: i64 },
    RemoveLine { order_id: OrderId, index: usize },
    ReduceLine { order_id: OrderId, index: usize, units: i64 },
    ConfirmOrder { id: OrderId },
    CancelOrder { id: OrderId },
    DeleteOrder { id: OrderId },

    // --- Order reports ---
    OrderTotal { id: OrderId },
    DiscountedTotal { id: OrderId, percentage: f64 },
    OrderSummary { id: OrderId },
    SalesTotal,
    CountOrdersByState { state: OrderState },
}
