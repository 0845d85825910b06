//! Generic actor framework for resource management.
//!
//! This module provides the building blocks the catalog and order actors are made of.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that resource types implement to be managed by actors
//! - [`ResourceActor`] - Generic actor that owns a [`Repository`] and serves requests
//! - [`ResourceClient`] - Typed handle for sending requests to an actor
//! - [`Repository`] / [`MemoryRepository`] - The storage collaborator
//! - [`FrameworkError`] - Channel errors plus the entity's own error
//!
//! # Testing
//!
//! See [`mock`] module for utilities to test clients without spawning full actors.

pub mod core;
pub mod mock;
pub mod store;

// Re-export core types for convenience
pub use self::core::*;
pub use self::store::{MemoryRepository, Repository};
