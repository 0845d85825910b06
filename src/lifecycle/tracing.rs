//! # Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging with the `tracing` crate.
//! Log levels come from the `RUST_LOG` environment variable.
//!
//! ## What Gets Traced
//!
//! - **Actor Lifecycle**: startup, shutdown and final store size (`info`)
//! - **Entity Operations**: create, get, list, update, delete, actions and transactions,
//!   with full payloads at `debug`
//! - **Rejections**: failed validation, insufficient stock and invalid transitions (`warn`)
//! - **Boundary Failures**: internal errors surfaced to API callers (`error`)
//!
//! Client methods carry `#[instrument]`. Actors run in their own tasks, so their events
//! are not nested under the caller's span; `entity_type` and `id` tie them together.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Compact logs
//! RUST_LOG=info cargo run
//!
//! # Payloads, queries and transaction batches
//! RUST_LOG=debug cargo run
//!
//! # Only the actor engine
//! RUST_LOG=storefront::framework=debug cargo run
//! ```
//!
//! ## Confirm Trace Example
//!
//! ```text
//! DEBUG Action entity_type="Order" id=order_1 action=Confirm
//! DEBUG Transaction entity_type="Product" actions=[(ProductId(1), Decrement(3))]
//!  INFO Transaction committed entity_type="Product" applied=1
//!  INFO Order confirmed order_id=order_1 total=30.0
//!  INFO Action ok entity_type="Order" id=order_1
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // entity_type identifies the actor instead
        .compact()
        .init();
}
