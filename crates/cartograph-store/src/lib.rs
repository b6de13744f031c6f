//! Document store for Cartograph state.
//!
//! Cartograph treats persistence as an opaque key-value store of JSON
//! documents. This crate defines that boundary ([`KvStore`]) and provides
//! two backends.
//!
//! # Modules
//!
//! - [`backend`] -- The [`KvStore`] trait, JSON helpers, and [`AnyStore`]
//!   for picking a backend at runtime
//! - [`dragonfly`] -- `Dragonfly` (Redis-compatible) backend via `fred`
//! - [`memory`] -- In-memory backend
//! - [`error`] -- Shared error types

pub mod backend;
pub mod dragonfly;
pub mod error;
pub mod memory;

// Re-export primary types for convenience.
pub use backend::{AnyStore, KvStore};
pub use dragonfly::DragonflyStore;
pub use error::StoreError;
pub use memory::MemoryStore;
