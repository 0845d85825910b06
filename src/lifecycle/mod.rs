//! # System Lifecycle
//!
//! Starting, wiring and stopping the actors, plus the process-wide configuration and
//! tracing setup.
//!
//! Dependencies are injected late: actors are constructed without them and receive
//! their context in `run(context)`. Only the order actor has one (the catalog client).

pub mod config;
pub mod order_system;
pub mod tracing;

pub use self::config::SystemConfig;
pub use self::order_system::OrderSystem;
pub use self::tracing::setup_tracing;
