//! # API Boundary
//!
//! Transport-agnostic entry point. A router deserializes an [`ApiRequest`], hands it to
//! [`dispatch`] and writes back the [`ApiResponse`] or the [`ApiError`] body with its
//! status.

pub mod error;
pub mod request;

pub use error::{ApiError, ErrorKind};
pub use request::{ApiRequest, OrderItem};

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::clients::ActorClient;
use crate::lifecycle::OrderSystem;
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;

/// A successful reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn with_status(status: u16, value: impl Serialize) -> Result<Self, ApiError> {
        let body = serde_json::to_value(value).map_err(|e| ApiError::internal(&e.to_string()))?;
        Ok(Self { status, body })
    }

    fn ok(value: impl Serialize) -> Result<Self, ApiError> {
        Self::with_status(200, value)
    }

    fn created(value: impl Serialize) -> Result<Self, ApiError> {
        Self::with_status(201, value)
    }

    fn no_content() -> Result<Self, ApiError> {
        Ok(Self {
            status: 204,
            body: Value::Null,
        })
    }
}

/// Runs one request against the system.
#[instrument(skip(system))]
pub async fn dispatch(system: &OrderSystem, request: ApiRequest) -> Result<ApiResponse, ApiError> {
    let result = handle(system, request).await;
    match &result {
        Ok(response) => debug!(status = response.status, "Request handled"),
        Err(e) if e.kind != ErrorKind::Internal => warn!(status = e.status, kind = %e.kind, "Request rejected"),
        Err(_) => {}
    }
    result
}

async fn handle(system: &OrderSystem, request: ApiRequest) -> Result<ApiResponse, ApiError> {
    let catalog = &system.catalog;
    let orders = &system.orders;
    let threshold = |requested: Option<u32>| requested.unwrap_or(system.config.low_stock_threshold);

    match request {
        ApiRequest::ListProducts => ApiResponse::ok(catalog.find_all().await?),
        ApiRequest::ListAvailableProducts => ApiResponse::ok(catalog.list_available().await?),
        ApiRequest::GetProduct { id } => ApiResponse::ok(catalog.require(id).await?),
        ApiRequest::FindProduct { criterion } => match catalog.find(&criterion).await? {
            Some(product) => ApiResponse::ok(product),
            None => Err(ApiError::new(
                ErrorKind::NotFound,
                format!("No product matches '{criterion}'"),
            )
            .with_detail("resource", "product")
            .with_detail("criterion", criterion)),
        },
        ApiRequest::SearchProducts { name } => ApiResponse::ok(catalog.search_by_name(&name).await?),
        ApiRequest::FilterByCategory { category } => ApiResponse::ok(catalog.filter_by_category(&category).await?),
        ApiRequest::FilterByPriceRange { min, max } => {
            ApiResponse::ok(catalog.filter_by_price_range(min, max).await?)
        }

        ApiRequest::CreateProduct(params) => ApiResponse::created(catalog.add(params).await?),
        ApiRequest::UpdateProduct { id, update } => ApiResponse::ok(catalog.update(id, update).await?),
        ApiRequest::SetPrice { id, price } => ApiResponse::ok(catalog.set_price(id, price).await?),
        ApiRequest::SetStock { id, stock } => ApiResponse::ok(catalog.set_stock(id, stock).await?),
        ApiRequest::Restock { id, quantity } => {
            let stock = catalog.increment_stock(id, quantity).await?;
            ApiResponse::ok(json!({ "product_id": id, "stock": stock }))
        }
        ApiRequest::CheckStock { id, quantity } => ApiResponse::ok(catalog.check_stock(id, quantity).await?),
        ApiRequest::DeleteProduct { id } => {
            if catalog.delete(id).await? {
                ApiResponse::no_content()
            } else {
                Err(ProductError::NotFound(id).into())
            }
        }
        ApiRequest::DeleteProductConfirmed { id } => ApiResponse::ok(catalog.delete_confirmed(id).await?),

        ApiRequest::LowStock { threshold: requested } => {
            ApiResponse::ok(catalog.low_stock(threshold(requested)).await?)
        }
        ApiRequest::InventoryValue => {
            ApiResponse::ok(json!({ "inventory_value": catalog.inventory_value().await? }))
        }
        ApiRequest::CountByCategory => ApiResponse::ok(catalog.count_by_category().await?),
        ApiRequest::CatalogStatistics { threshold: requested } => {
            ApiResponse::ok(catalog.statistics(threshold(requested)).await?)
        }

        ApiRequest::ListOrders => ApiResponse::ok(orders.find_all().await?),
        ApiRequest::ListOrdersByState { state } => ApiResponse::ok(orders.list_by_state(state).await?),
        ApiRequest::SearchOrdersByCustomer { customer } => {
            ApiResponse::ok(orders.search_by_customer(&customer).await?)
        }
        ApiRequest::ListOrdersBetween { from, to } => ApiResponse::ok(orders.list_between(from, to).await?),
        ApiRequest::GetOrder { id } => match orders.get(id).await? {
            Some(order) => ApiResponse::ok(order),
            None => Err(OrderError::NotFound(id).into()),
        },

        ApiRequest::CreateEmptyOrder { customer_name } => {
            ApiResponse::created(orders.create_empty(&customer_name).await?)
        }
        ApiRequest::CreateOrder { customer_name, items } => {
            let items = items
                .into_iter()
                .map(|item| (item.product_id, item.quantity))
                .collect();
            ApiResponse::created(orders.create_with_lines(&customer_name, items).await?)
        }
        ApiRequest::AddLine {
            order_id,
            product_id,
            quantity,
        } => ApiResponse::ok(orders.add_line(order_id, product_id, quantity).await?),
        ApiRequest::RemoveLine { order_id, index } => ApiResponse::ok(orders.remove_line(order_id, index).await?),
        ApiRequest::ReduceLine { order_id, index, units } => {
            ApiResponse::ok(orders.reduce_line(order_id, index, units).await?)
        }
        ApiRequest::ConfirmOrder { id } => ApiResponse::ok(orders.confirm(id).await?),
        ApiRequest::CancelOrder { id } => ApiResponse::ok(orders.cancel(id).await?),
        ApiRequest::DeleteOrder { id } => {
            if orders.delete(id).await? {
                ApiResponse::no_content()
            } else {
                Err(OrderError::NotFound(id).into())
            }
        }

        ApiRequest::OrderTotal { id } => {
            ApiResponse::ok(json!({ "order_id": id, "total": orders.total(id).await? }))
        }
        ApiRequest::DiscountedTotal { id, percentage } => ApiResponse::ok(json!({
            "order_id": id,
            "percentage": percentage,
            "total": orders.total_with_discount(id, percentage).await?,
        })),
        ApiRequest::OrderSummary { id } => ApiResponse::ok(json!({ "order_id": id, "summary": orders.summary(id).await? })),
        ApiRequest::SalesTotal => ApiResponse::ok(json!({ "total_sales": orders.total_sales().await? })),
        ApiRequest::CountOrdersByState { state } => ApiResponse::ok(json!({
            "state": state,
            "count": orders.count_by_state(state).await?,
        })),
    }
}
