use storefront::clients::{actor_client::ActorClient, ProductClient};
use storefront::framework::mock::{create_mock_client, expect_transaction, MockClient};
use storefront::framework::FrameworkError;
use storefront::model::{OrderCreate, OrderLine, OrderState, Product, ProductId};
use storefront::order_actor::OrderError;
use storefront::product_actor::{ProductAction, ProductActionResult, ProductError};

fn line(product_id: u32, name: &str, quantity: u32, unit_price: f64) -> OrderLine {
    OrderLine {
        product_id: ProductId(product_id),
        product_name: name.to_string(),
        quantity,
        unit_price,
    }
}

/// Real Order actor with a mocked catalog.
///
/// Confirm must send exactly one transaction with a decrement per line, and only
/// commit the order once the catalog accepts it.
#[tokio::test]
async fn test_confirm_sends_one_decrement_transaction() {
    let (catalog, mut receiver) = create_mock_client::<Product>(10);
    let (order_actor, order_client) = storefront::order_actor::new(10);
    let actor_handle = tokio::spawn(order_actor.run(ProductClient::new(catalog)));

    let order = order_client
        .create(OrderCreate {
            customer_name: "Ana".to_string(),
            lines: vec![line(2, "Gadget", 4, 2.5), line(1, "Widget", 3, 10.0)],
        })
        .await
        .unwrap();

    let confirm = {
        let order_client = order_client.clone();
        tokio::spawn(async move { order_client.confirm(order.id).await })
    };

    let (actions, responder) = expect_transaction(&mut receiver)
        .await
        .expect("Expected Transaction request");
    let decrements: Vec<(ProductId, u32)> = actions
        .iter()
        .map(|(id, action)| match action {
            ProductAction::Decrement(quantity) => (*id, *quantity),
            other => panic!("Expected Decrement, got {:?}", other),
        })
        .collect();
    assert_eq!(decrements, vec![(ProductId(2), 4), (ProductId(1), 3)]);

    responder
        .send(Ok(vec![
            ProductActionResult::Decrement(2),
            ProductActionResult::Decrement(96),
        ]))
        .unwrap();

    let confirmed = confirm.await.unwrap().unwrap();
    assert_eq!(confirmed.state, OrderState::Confirmed);
    assert_eq!(confirmed.total(), 40.0);

    drop(order_client);
    actor_handle.await.unwrap();
}

/// A rejected transaction leaves the order pending.
#[tokio::test]
async fn test_rejected_stock_keeps_order_pending() {
    let mut product_mock = MockClient::<Product>::new();
    product_mock
        .expect_transaction()
        .return_err(FrameworkError::Entity(ProductError::InsufficientStock {
            product: "Widget".to_string(),
            available: 1,
            requested: 3,
        }));

    let (order_actor, order_client) = storefront::order_actor::new(10);
    let actor_handle = tokio::spawn(order_actor.run(ProductClient::new(product_mock.client())));

    let order = order_client
        .create(OrderCreate {
            customer_name: "Ana".to_string(),
            lines: vec![line(1, "Widget", 3, 10.0)],
        })
        .await
        .unwrap();

    let result = order_client.confirm(order.id).await;
    assert!(matches!(
        result,
        Err(OrderError::Product(ProductError::InsufficientStock { available: 1, requested: 3, .. }))
    ));

    let stored = order_client.get(order.id).await.unwrap().unwrap();
    assert_eq!(stored.state, OrderState::Pending);
    product_mock.verify();

    drop(order_client);
    actor_handle.await.unwrap();
}

/// Empty and non-pending orders are rejected before the catalog is contacted.
#[tokio::test]
async fn test_guards_run_before_catalog() {
    let product_mock = MockClient::<Product>::new();
    let (order_actor, order_client) = storefront::order_actor::new(10);
    let actor_handle = tokio::spawn(order_actor.run(ProductClient::new(product_mock.client())));

    let empty = order_client
        .create(OrderCreate {
            customer_name: "Ana".to_string(),
            lines: Vec::new(),
        })
        .await
        .unwrap();
    assert_eq!(order_client.confirm(empty.id).await, Err(OrderError::EmptyOrder));

    order_client.cancel(empty.id).await.unwrap();
    assert!(matches!(
        order_client.confirm(empty.id).await,
        Err(OrderError::InvalidState { current: OrderState::Cancelled, .. })
    ));

    let blank = order_client
        .create(OrderCreate {
            customer_name: "  ".to_string(),
            lines: Vec::new(),
        })
        .await;
    assert!(matches!(blank, Err(OrderError::InvalidData { .. })));

    product_mock.verify();
    drop(order_client);
    actor_handle.await.unwrap();
}
