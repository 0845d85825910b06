//! # Core Actor Framework
//!
//! This module defines the generic building blocks for the resource actors.
//!
//! ## Key Types
//!
//! - [`ActorEntity`]: The trait that all resource types must implement.
//! - [`ResourceActor`]: The generic actor that owns a [`Repository`] and serves requests.
//! - [`ResourceClient`]: The generic client for communicating with actors.
//! - [`Query`]: A named predicate executed inside the actor (the `findBy…` family).
//! - [`FrameworkError`]: Transport errors plus the entity's own typed error.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::store::{MemoryRepository, Repository};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, DTOs, and Actions)
// =============================================================================

/// Trait that any resource entity must implement to be managed by [`ResourceActor`].
///
/// # Architecture Note
/// By defining a contract (`ActorEntity`) that all our resource types (Product, Order)
/// must satisfy, we write the `ResourceActor` logic *once* and reuse it everywhere.
/// Associated types keep payloads apart: a `Product` only accepts a `ProductCreate`.
///
/// # Async & Context
/// The hooks are `#[async_trait]` so they can call other actors. The `Context` type is
/// injected into every hook when the actor starts (`run(context)`), not at construction.
///
/// # Copy-on-write
/// Hooks always run against a clone of the stored entity. The actor writes the clone back
/// only when the hook returns `Ok`, so a failing hook never leaves a partial mutation.
#[async_trait]
pub trait ActorEntity: Clone + Debug + Send + Sync + 'static {
    /// The unique identifier. Ordered so that stores list deterministically and
    /// transactions visit entities in a fixed order.
    type Id: Eq + Ord + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Enum representing resource-specific operations (e.g., `Decrement`).
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The per-actor error type, carried back to clients unchanged.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The identifier the entity is stored under.
    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the ID and Payload.
    /// This is called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks (Async) ---

    /// Called after construction and before the entity is stored.
    /// Use this hook for validation that needs other actors.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(&mut self, update: Self::Update, ctx: &Self::Context) -> Result<(), Self::Error>;

    /// Called immediately before the entity is removed from the store.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a custom resource-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}

// =============================================================================
// 2. THE GENERIC MESSAGES & ERRORS
// =============================================================================

/// Errors that can occur between a client and its actor.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError<T: ActorEntity> {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(T::Id),
    #[error("Entity error: {0}")]
    Entity(T::Error),
}

/// Type alias for the one-shot response channel used by actors.
pub type Response<T, R> = oneshot::Sender<Result<R, FrameworkError<T>>>;

/// A named predicate evaluated against every stored entity inside the actor.
///
/// The label only exists for logs; two queries with the same label may match
/// different entities.
pub struct Query<T> {
    label: String,
    predicate: Box<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Query<T> {
    pub fn new(label: impl Into<String>, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Matches every entity.
    pub fn all() -> Self {
        Self::new("all", |_| true)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matches(&self, item: &T) -> bool {
        (self.predicate)(item)
    }
}

impl<T> Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Query").field(&self.label).finish()
    }
}

/// Internal message type sent to the actor to request operations.
///
/// # Resource-Oriented Architecture
/// The variants map to the CRUD lifecycle of a stored resource plus two extensions:
///
/// - **Create / Get / Update / Delete**: standard lifecycle operations.
/// - **List**: filtered reads via a [`Query`].
/// - **Action**: a resource-specific [`ActorEntity::Action`] on one entity.
/// - **Transaction**: several actions on several entities, applied all-or-nothing.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T, T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<T, Option<T>>,
    },
    List {
        query: Query<T>,
        respond_to: Response<T, Vec<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T, T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<T, Option<T>>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T, T::ActionResult>,
    },
    Transaction {
        actions: Vec<(T::Id, T::Action)>,
        respond_to: Response<T, Vec<T::ActionResult>>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// The generic actor that manages a collection of entities.
///
/// # Architecture Note
/// This struct is the "Server" half of the actor. It owns the repository and the
/// receiver end of the channel.
///
/// **Concurrency Model**:
/// Each actor processes its messages *sequentially*. A read-modify-write inside one
/// message is therefore atomic with respect to every other request, and no `Mutex` is
/// needed around the repository.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: Box<dyn Repository<T>>,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates an actor backed by an in-memory repository.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        Self::with_repository(buffer_size, MemoryRepository::new())
    }

    /// Creates an actor backed by the given repository.
    pub fn with_repository(buffer_size: usize, store: impl Repository<T>) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: Box::new(store),
        };
        (actor, ResourceClient::new(sender))
    }

    /// Runs the actor's event loop, processing messages until the channel closes.
    ///
    /// The `context` argument is injected into every entity hook.
    pub async fn run(mut self, context: T::Context) {
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let id = self.store.next_id();
                    let mut item = match T::from_create_params(id, params) {
                        Ok(item) => item,
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::Entity(e)));
                            continue;
                        }
                    };
                    if let Err(e) = item.on_create(&context).await {
                        warn!(entity_type, error = %e, "on_create failed");
                        let _ = respond_to.send(Err(FrameworkError::Entity(e)));
                        continue;
                    }
                    let saved = self.store.save(item);
                    info!(entity_type, id = %saved.id(), size = self.store.count(), "Created");
                    let _ = respond_to.send(Ok(saved));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.find_by_id(&id);
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { query, respond_to } => {
                    let items = self.store.find_by(&query);
                    debug!(entity_type, query = query.label(), matched = items.len(), "List");
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update { id, update, respond_to } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let Some(mut item) = self.store.find_by_id(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id)));
                        continue;
                    };
                    match item.on_update(update, &context).await {
                        Ok(()) => {
                            let saved = self.store.save(item);
                            info!(entity_type, %id, "Updated");
                            let _ = respond_to.send(Ok(saved));
                        }
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Update failed");
                            let _ = respond_to.send(Err(FrameworkError::Entity(e)));
                        }
                    }
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    let Some(item) = self.store.find_by_id(&id) else {
                        debug!(entity_type, %id, "Nothing to delete");
                        let _ = respond_to.send(Ok(None));
                        continue;
                    };
                    if let Err(e) = item.on_delete(&context).await {
                        warn!(entity_type, %id, error = %e, "on_delete failed");
                        let _ = respond_to.send(Err(FrameworkError::Entity(e)));
                        continue;
                    }
                    let removed = self.store.delete_by_id(&id);
                    info!(entity_type, %id, size = self.store.count(), "Deleted");
                    let _ = respond_to.send(Ok(removed));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let Some(mut item) = self.store.find_by_id(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id)));
                        continue;
                    };
                    match item.handle_action(action, &context).await {
                        Ok(result) => {
                            self.store.save(item);
                            info!(entity_type, %id, "Action ok");
                            let _ = respond_to.send(Ok(result));
                        }
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Action failed");
                            let _ = respond_to.send(Err(FrameworkError::Entity(e)));
                        }
                    }
                }
                ResourceRequest::Transaction { actions, respond_to } => {
                    debug!(entity_type, ?actions, "Transaction");
                    let result = self.apply_all(actions, &context).await;
                    match &result {
                        Ok(results) => info!(entity_type, applied = results.len(), "Transaction committed"),
                        Err(e) => warn!(entity_type, error = %e, "Transaction rolled back"),
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(entity_type, size = self.store.count(), "Shutdown");
    }

    /// Applies every action to a staged copy of its entity, visiting ids in ascending
    /// order (stable for repeated ids). Staged copies are written back only when all
    /// actions succeed; the first failure discards the whole batch.
    async fn apply_all(
        &mut self,
        mut actions: Vec<(T::Id, T::Action)>,
        context: &T::Context,
    ) -> Result<Vec<T::ActionResult>, FrameworkError<T>> {
        actions.sort_by(|a, b| a.0.cmp(&b.0));

        let mut staged: BTreeMap<T::Id, T> = BTreeMap::new();
        let mut results = Vec::with_capacity(actions.len());

        for (id, action) in actions {
            let item = match staged.entry(id.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => match self.store.find_by_id(&id) {
                    Some(found) => entry.insert(found),
                    None => return Err(FrameworkError::NotFound(id)),
                },
            };
            let result = item
                .handle_action(action, context)
                .await
                .map_err(FrameworkError::Entity)?;
            results.push(result);
        }

        for (_, item) in staged {
            self.store.save(item);
        }
        Ok(results)
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

/// A type-safe client for interacting with a `ResourceActor`.
pub struct ResourceClient<T: ActorEntity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

// Manual impl: deriving would demand `T: Clone` on the wrapper for no reason.
impl<T: ActorEntity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: ActorEntity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<T, R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError<T>> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::Create) -> Result<T, FrameworkError<T>> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError<T>> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self, query: Query<T>) -> Result<Vec<T>, FrameworkError<T>> {
        self.request(|respond_to| ResourceRequest::List { query, respond_to }).await
    }

    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<T, FrameworkError<T>> {
        self.request(|respond_to| ResourceRequest::Update { id, update, respond_to })
            .await
    }

    /// Removes the entity; `Ok(None)` when nothing was stored under `id`.
    pub async fn delete(&self, id: T::Id) -> Result<Option<T>, FrameworkError<T>> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError<T>> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to })
            .await
    }

    /// Applies all actions or none. Results come back in ascending id order.
    pub async fn transaction(
        &self,
        actions: Vec<(T::Id, T::Action)>,
    ) -> Result<Vec<T::ActionResult>, FrameworkError<T>> {
        self.request(|respond_to| ResourceRequest::Transaction { actions, respond_to })
            .await
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // --- Domain Definition ---

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        id: u32,
        label: String,
        value: u32,
    }

    #[derive(Debug)]
    struct CounterCreate {
        label: String,
        value: u32,
    }

    #[derive(Debug)]
    struct CounterUpdate {
        label: Option<String>,
    }

    #[derive(Debug)]
    enum CounterAction {
        Take(u32),
    }

    #[derive(Debug, thiserror::Error)]
    enum CounterError {
        #[error("label must not be empty")]
        EmptyLabel,
        #[error("counter {0} exhausted")]
        Exhausted(u32),
    }

    #[async_trait]
    impl ActorEntity for Counter {
        type Id = u32;
        type Create = CounterCreate;
        type Update = CounterUpdate;
        type Action = CounterAction;
        type ActionResult = u32;
        type Context = ();
        type Error = CounterError;

        fn id(&self) -> &u32 {
            &self.id
        }

        fn from_create_params(id: u32, params: CounterCreate) -> Result<Self, CounterError> {
            if params.label.is_empty() {
                return Err(CounterError::EmptyLabel);
            }
            Ok(Self {
                id,
                label: params.label,
                value: params.value,
            })
        }

        async fn on_update(&mut self, update: CounterUpdate, _ctx: &()) -> Result<(), CounterError> {
            if let Some(label) = update.label {
                if label.is_empty() {
                    return Err(CounterError::EmptyLabel);
                }
                self.label = label;
            }
            Ok(())
        }

        async fn handle_action(&mut self, action: CounterAction, _ctx: &()) -> Result<u32, CounterError> {
            match action {
                CounterAction::Take(n) => {
                    // Mutate first, then fail: the actor must still discard the copy.
                    self.label.push('!');
                    if self.value < n {
                        return Err(CounterError::Exhausted(self.id));
                    }
                    self.value -= n;
                    Ok(self.value)
                }
            }
        }
    }

    fn spawn_counter_actor() -> ResourceClient<Counter> {
        let (actor, client) = ResourceActor::<Counter>::new(10);
        tokio::spawn(actor.run(()));
        client
    }

    async fn new_counter(client: &ResourceClient<Counter>, label: &str, value: u32) -> Counter {
        client
            .create(CounterCreate { label: label.into(), value })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let client = spawn_counter_actor();

        let created = new_counter(&client, "apples", 5).await;
        assert_eq!(created.id, 1);

        let updated = client
            .update(1, CounterUpdate { label: Some("pears".into()) })
            .await
            .unwrap();
        assert_eq!(updated.label, "pears");

        let removed = client.delete(1).await.unwrap();
        assert_eq!(removed.map(|c| c.label), Some("pears".to_string()));
        assert!(client.get(1).await.unwrap().is_none());
        assert!(client.delete(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_create_returns_entity_error() {
        let client = spawn_counter_actor();
        let result = client
            .create(CounterCreate { label: String::new(), value: 1 })
            .await;
        assert!(matches!(result, Err(FrameworkError::Entity(CounterError::EmptyLabel))));
        assert!(client.list(Query::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_action_leaves_entity_untouched() {
        let client = spawn_counter_actor();
        new_counter(&client, "apples", 1).await;

        let result = client.perform_action(1, CounterAction::Take(2)).await;
        assert!(matches!(result, Err(FrameworkError::Entity(CounterError::Exhausted(1)))));

        let stored = client.get(1).await.unwrap().unwrap();
        assert_eq!(stored.label, "apples");
        assert_eq!(stored.value, 1);
    }

    #[tokio::test]
    async fn test_missing_entity_reports_not_found() {
        let client = spawn_counter_actor();
        let result = client.perform_action(7, CounterAction::Take(1)).await;
        assert!(matches!(result, Err(FrameworkError::NotFound(7))));
    }

    #[tokio::test]
    async fn test_list_applies_query() {
        let client = spawn_counter_actor();
        new_counter(&client, "apples", 1).await;
        new_counter(&client, "pears", 10).await;
        new_counter(&client, "plums", 20).await;

        let big = client
            .list(Query::new("value >= 10", |c: &Counter| c.value >= 10))
            .await
            .unwrap();
        let labels: Vec<_> = big.into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["pears", "plums"]);
    }

    #[tokio::test]
    async fn test_transaction_commits_all() {
        let client = spawn_counter_actor();
        new_counter(&client, "apples", 5).await;
        new_counter(&client, "pears", 5).await;

        let results = client
            .transaction(vec![(2, CounterAction::Take(1)), (1, CounterAction::Take(2)), (2, CounterAction::Take(3))])
            .await
            .unwrap();
        // Ascending id order, stable for repeated ids.
        assert_eq!(results, vec![3, 4, 1]);

        assert_eq!(client.get(1).await.unwrap().unwrap().value, 3);
        assert_eq!(client.get(2).await.unwrap().unwrap().value, 1);
    }

    #[tokio::test]
    async fn test_transaction_rolls_back_on_failure() {
        let client = spawn_counter_actor();
        new_counter(&client, "apples", 5).await;
        new_counter(&client, "pears", 1).await;

        let result = client
            .transaction(vec![(1, CounterAction::Take(5)), (2, CounterAction::Take(2))])
            .await;
        assert!(matches!(result, Err(FrameworkError::Entity(CounterError::Exhausted(2)))));

        let first = client.get(1).await.unwrap().unwrap();
        assert_eq!(first.value, 5);
        assert_eq!(first.label, "apples");
        assert_eq!(client.get(2).await.unwrap().unwrap().value, 1);
    }

    #[tokio::test]
    async fn test_transaction_with_unknown_id_applies_nothing() {
        let client = spawn_counter_actor();
        new_counter(&client, "apples", 5).await;

        let result = client
            .transaction(vec![(1, CounterAction::Take(1)), (9, CounterAction::Take(1))])
            .await;
        assert!(matches!(result, Err(FrameworkError::NotFound(9))));
        assert_eq!(client.get(1).await.unwrap().unwrap().value, 5);
    }
}
