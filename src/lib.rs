//! # Storefront
//!
//! > **Order lifecycle and inventory consistency on resource-oriented actors.**
//!
//! A product catalog with stock levels and customer orders made of line items against
//! that catalog. Orders move from `pending` to `confirmed` or `cancelled`; confirming
//! takes stock for every line at once or not at all.
//!
//! ## 🏗️ Design
//!
//! Each resource type lives in its own actor (a Tokio task owning its repository and
//! processing one message at a time), reached through typed clients:
//!
//! - The **catalog actor** owns products. Single-product read-modify-writes are atomic
//!   because the actor is sequential; multi-product decrements go through the actor's
//!   `transaction` request, which stages copies and commits all or none.
//! - The **order actor** owns orders and runs the state machine. On confirm it calls the
//!   catalog and waits for the answer before handling anything else, so two confirms can
//!   never interleave on the same order.
//! - The catalog never calls the order actor, so the dependency graph is acyclic.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! The generic [`ResourceActor`](framework::ResourceActor), the
//! [`ActorEntity`](framework::ActorEntity) trait entities implement, the
//! [`Repository`](framework::Repository) storage collaborator and the
//! [`mock`](framework::mock) test utilities.
//!
//! ### 2. The Implementation ([`model`], [`product_actor`], [`order_actor`])
//! Entities, their payloads, actions and typed errors.
//!
//! ### 3. The Interface ([`clients`], [`service`], [`api`])
//! [`ProductClient`](clients::ProductClient) is the catalog API;
//! [`OrderService`](service::OrderService) orchestrates orders over both actors;
//! [`api::dispatch`] maps transport-agnostic requests to them and errors to statuses.
//!
//! ### 4. The Orchestrator ([`lifecycle`])
//! [`OrderSystem`](lifecycle::OrderSystem) spawns and wires the actors,
//! [`SystemConfig`](lifecycle::SystemConfig) holds the settings and
//! [`setup_tracing`](lifecycle::setup_tracing) installs the subscriber.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod api;
pub mod clients;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod product_actor;
pub mod service;
