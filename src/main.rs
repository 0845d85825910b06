//! Demo: stock a catalog, place a few orders and race two confirms for the last units.

use storefront::clients::ActorClient;
use storefront::lifecycle::{setup_tracing, OrderSystem, SystemConfig};
use storefront::model::ProductCreate;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let system = OrderSystem::with_config(SystemConfig::from_env());
    info!("Starting storefront demo");

    let span = tracing::info_span!("catalog_setup");
    let (widget, gadget) = async {
        let widget = system
            .catalog
            .add(ProductCreate::new("Widget", 10.0, "tools", 5))
            .await?;
        let gadget = system
            .catalog
            .add(ProductCreate::new("Gadget", 2.5, "tools", 100))
            .await?;
        Ok::<_, storefront::product_actor::ProductError>((widget, gadget))
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    let span = tracing::info_span!("order_processing");
    async {
        let order = system
            .orders
            .create_with_lines("Ana", vec![(widget.id, 3), (gadget.id, 4)])
            .await?;
        let order = system.orders.confirm(order.id).await?;
        info!(order_id = %order.id, total = order.total(), "Order confirmed");
        println!("{}\n", order.summary());
        Ok::<_, storefront::order_actor::OrderError>(())
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    // Two pending orders both want the last two widgets; only one confirm can win.
    let span = tracing::info_span!("confirm_race");
    async {
        let first = system
            .orders
            .create_with_lines("Bruno", vec![(widget.id, 2)])
            .await?;
        let second = system
            .orders
            .create_with_lines("Carla", vec![(widget.id, 2)])
            .await?;

        let (a, b) = tokio::join!(system.orders.confirm(first.id), system.orders.confirm(second.id));
        for result in [a, b] {
            match result {
                Ok(order) => info!(order_id = %order.id, "Confirm won"),
                Err(e) => error!(error = %e, "Confirm lost"),
            }
        }
        Ok::<_, storefront::order_actor::OrderError>(())
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    let stock = system
        .catalog
        .get(widget.id)
        .await
        .map_err(|e| e.to_string())?
        .map(|p| p.stock);
    let sales = system.orders.total_sales().await.map_err(|e| e.to_string())?;
    info!(?stock, sales, "Final state");

    system.shutdown().await?;

    info!("Demo completed successfully");
    Ok(())
}
