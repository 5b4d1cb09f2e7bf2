//! Persistence boundary for targets, check logs and alert records
//!
//! The engine talks to a trait-based store abstraction so the hosted data
//! store stays an external collaborator:
//!
//! - **Trait-based**: `TargetStore` allows swapping implementations
//! - **Async**: all operations are async for compatibility with Tokio
//! - **Append-only history**: log and alert rows are only ever inserted
//!
//! ## Backends
//!
//! - **SQLite** (default feature): embedded database for self-hosted setups
//! - **In-Memory**: no persistence, for tests and throwaway deployments

pub mod backend;
pub mod error;
pub mod memory;
pub mod schema;
#[cfg(feature = "storage-sqlite")]
pub mod sqlite;

pub use backend::TargetStore;
pub use error::{StoreError, StoreResult};
pub use schema::{AlertChannel, AlertRecord, AlertSettings, DeliveryOutcome, LogEntry, TargetUpdate};
