//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`MockClient`] to script the replies of an actor, or [`create_mock_client`] to get
//! a client plus the raw receiver and answer requests by hand with helpers like
//! [`expect_get`] or [`expect_action`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use super::core::{ActorEntity, FrameworkError, ResourceClient, ResourceRequest, Response};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected request and the reply the mock sends back for it.
enum Expectation<T: ActorEntity> {
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError<T>>,
    },
    Create {
        response: Result<T, FrameworkError<T>>,
    },
    List {
        response: Result<Vec<T>, FrameworkError<T>>,
    },
    Update {
        id: T::Id,
        response: Result<T, FrameworkError<T>>,
    },
    Delete {
        id: T::Id,
        response: Result<Option<T>, FrameworkError<T>>,
    },
    Action {
        id: T::Id,
        response: Result<T::ActionResult, FrameworkError<T>>,
    },
    Transaction {
        response: Result<Vec<T::ActionResult>, FrameworkError<T>>,
    },
}

impl<T: ActorEntity> Expectation<T> {
    fn name(&self) -> &'static str {
        match self {
            Expectation::Get { .. } => "Get",
            Expectation::Create { .. } => "Create",
            Expectation::List { .. } => "List",
            Expectation::Update { .. } => "Update",
            Expectation::Delete { .. } => "Delete",
            Expectation::Action { .. } => "Action",
            Expectation::Transaction { .. } => "Transaction",
        }
    }
}

type Expectations<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock client with expectation tracking for fluent testing.
///
/// Requests are answered strictly in the order the expectations were registered. A
/// request that does not match the next expectation (kind or id) is dropped without a
/// reply, so the caller observes [`FrameworkError::ActorDropped`].
///
/// # Example
/// ```ignore
/// let mut mock = MockClient::<Product>::new();
/// mock.expect_get(ProductId(1)).return_ok(Some(product));
///
/// let client = ProductClient::new(mock.client());
/// // Use client in tests...
/// mock.verify(); // Ensures all expectations were met
/// ```
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Expectations<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Expectations<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let next = queue.lock().map(|mut exps| exps.pop_front()).unwrap_or(None);
                Self::answer(request, next);
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    fn answer(request: ResourceRequest<T>, expectation: Option<Expectation<T>>) {
        match (request, expectation) {
            (ResourceRequest::Get { id, respond_to }, Some(Expectation::Get { id: expected, response })) => {
                reply_if(id == expected, respond_to, response);
            }
            (ResourceRequest::Create { respond_to, .. }, Some(Expectation::Create { response })) => {
                let _ = respond_to.send(response);
            }
            (ResourceRequest::List { respond_to, .. }, Some(Expectation::List { response })) => {
                let _ = respond_to.send(response);
            }
            (ResourceRequest::Update { id, respond_to, .. }, Some(Expectation::Update { id: expected, response })) => {
                reply_if(id == expected, respond_to, response);
            }
            (ResourceRequest::Delete { id, respond_to }, Some(Expectation::Delete { id: expected, response })) => {
                reply_if(id == expected, respond_to, response);
            }
            (ResourceRequest::Action { id, respond_to, .. }, Some(Expectation::Action { id: expected, response })) => {
                reply_if(id == expected, respond_to, response);
            }
            (ResourceRequest::Transaction { respond_to, .. }, Some(Expectation::Transaction { response })) => {
                let _ = respond_to.send(response);
            }
            (request, expectation) => {
                tracing::error!(
                    ?request,
                    expected = expectation.as_ref().map(Expectation::name),
                    "Unexpected request or expectation mismatch"
                );
            }
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    /// Expects a `get` operation.
    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        self.builder(move |response| Expectation::Get { id, response })
    }

    /// Expects a `create` operation.
    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T> {
        self.builder(|response| Expectation::Create { response })
    }

    /// Expects a `list` operation.
    pub fn expect_list(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        self.builder(|response| Expectation::List { response })
    }

    /// Expects an `update` operation.
    pub fn expect_update(&mut self, id: T::Id) -> ExpectationBuilder<T, T> {
        self.builder(move |response| Expectation::Update { id, response })
    }

    /// Expects a `delete` operation.
    pub fn expect_delete(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        self.builder(move |response| Expectation::Delete { id, response })
    }

    /// Expects an `action` operation.
    pub fn expect_action(&mut self, id: T::Id) -> ExpectationBuilder<T, T::ActionResult> {
        self.builder(move |response| Expectation::Action { id, response })
    }

    /// Expects a `transaction` operation.
    pub fn expect_transaction(&mut self) -> ExpectationBuilder<T, Vec<T::ActionResult>> {
        self.builder(|response| Expectation::Transaction { response })
    }

    fn builder<R: 'static>(
        &self,
        make: impl FnOnce(Result<R, FrameworkError<T>>) -> Expectation<T> + Send + 'static,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            make: Box::new(make),
            expectations: self.expectations.clone(),
        }
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().map(|exps| exps.len()).unwrap_or(0);
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn reply_if<T: ActorEntity, R>(matches: bool, respond_to: Response<T, R>, response: Result<R, FrameworkError<T>>) {
    if matches {
        let _ = respond_to.send(response);
    } else {
        tracing::error!("Request id does not match the expectation");
    }
}

/// Builder completing an expectation with the reply to send.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    make: Box<dyn FnOnce(Result<R, FrameworkError<T>>) -> Expectation<T> + Send>,
    expectations: Expectations<T>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError<T>) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, FrameworkError<T>>) {
        let expectation = (self.make)(response);
        if let Ok(mut exps) = self.expectations.lock() {
            exps.push_back(expectation);
        }
    }
}

// =============================================================================
// RAW RECEIVER HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
///
/// # Testing Strategy
/// When a test needs to inspect the exact payload a client sends (the action, the
/// transaction batch), answer the requests by hand from `receiver` instead of spinning
/// up a real `ResourceActor`.
pub fn create_mock_client<T: ActorEntity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Create, Response<T, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<T, Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Response<T, T::ActionResult>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Transaction request
pub async fn expect_transaction<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Vec<(T::Id, T::Action)>, Response<T, Vec<T::ActionResult>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Transaction { actions, respond_to }) => Some((actions, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Product, ProductCreate, ProductId};

    fn widget(id: u32) -> Product {
        Product::new(ProductId(id), "Widget", 10.0, "tools", 5)
    }

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Product>(10);

        let create_task = tokio::spawn(async move {
            client
                .create(ProductCreate::new("Widget", 10.0, "tools", 5))
                .await
        });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.name, "Widget");
        responder.send(Ok(widget(1))).unwrap();

        let result = create_task.await.unwrap().unwrap();
        assert_eq!(result.id, ProductId(1));
    }

    #[tokio::test]
    async fn test_mock_client_with_expectations() {
        let mut mock = MockClient::<Product>::new();
        mock.expect_create().return_ok(widget(1));
        mock.expect_get(ProductId(1)).return_ok(Some(widget(1)));

        let client = mock.client();

        let created = client
            .create(ProductCreate::new("Widget", 10.0, "tools", 5))
            .await
            .unwrap();
        assert_eq!(created.id, ProductId(1));

        let fetched = client.get(ProductId(1)).await.unwrap();
        assert_eq!(fetched.unwrap().name, "Widget");

        mock.verify();
    }

    #[tokio::test]
    async fn test_mismatched_id_is_not_answered() {
        let mut mock = MockClient::<Product>::new();
        mock.expect_get(ProductId(1)).return_ok(None);

        let result = mock.client().get(ProductId(2)).await;
        assert!(matches!(result, Err(FrameworkError::ActorDropped)));
    }
}
