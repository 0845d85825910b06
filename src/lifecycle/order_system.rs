use tracing::{error, info};

use super::config::SystemConfig;
use crate::clients::ProductClient;
use crate::service::OrderService;

/// The runtime orchestrator for the storefront.
///
/// `OrderSystem` is responsible for:
/// - **Lifecycle Management**: Starting and stopping the catalog and order actors
/// - **Dependency Wiring**: The order actor runs with the catalog client as its context
/// - **Service Assembly**: Building the [`OrderService`] on top of both clients
///
/// # Example
///
/// ```ignore
/// let system = OrderSystem::new();
///
/// let widget = system.catalog.add(ProductCreate::new("Widget", 10.0, "tools", 5)).await?;
/// let order = system.orders.create_with_lines("Ana", vec![(widget.id, 3)]).await?;
/// system.orders.confirm(order.id).await?;
///
/// system.shutdown().await?;
/// ```
pub struct OrderSystem {
    /// Client for the Product actor
    pub catalog: ProductClient,

    /// Order orchestration over both actors
    pub orders: OrderService,

    pub config: SystemConfig,

    /// Task handles for all running actors (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl OrderSystem {
    /// Starts the system with [`SystemConfig::default`].
    pub fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    /// Spawns both actors and wires them together.
    ///
    /// The catalog actor has no dependencies (Context = `()`); the order actor gets a
    /// clone of the catalog client. The catalog never calls back into orders.
    pub fn with_config(config: SystemConfig) -> Self {
        let (product_actor, catalog) = crate::product_actor::new(config.channel_capacity);
        let (order_actor, order_client) = crate::order_actor::new(config.channel_capacity);

        let product_handle = tokio::spawn(product_actor.run(()));
        let order_handle = tokio::spawn(order_actor.run(catalog.clone()));

        info!(channel_capacity = config.channel_capacity, "Order system started");

        Self {
            orders: OrderService::new(order_client, catalog.clone()),
            catalog,
            config,
            handles: vec![order_handle, product_handle],
        }
    }

    /// Gracefully shuts down the system.
    ///
    /// Dropping the clients closes the channels; each actor drains its mailbox and exits.
    /// The order actor holds the last catalog client, so the catalog stops after it.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if all actors shut down cleanly
    /// - `Err(String)` if any actor task failed or panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.orders);
        drop(self.catalog);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

impl Default for OrderSystem {
    fn default() -> Self {
        Self::new()
    }
}
