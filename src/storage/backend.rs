//! Store trait definition
//!
//! This module defines the `TargetStore` trait every store implementation
//! must provide. The engine performs exactly five operations per cycle:
//! two reads up front (settings snapshot, active targets) and up to three
//! writes per target (target update, log append, optional alert record).
//!
//! ## Thread safety
//!
//! Implementations must be `Send + Sync`; the engine checks targets
//! concurrently and the per-target writes may interleave across targets.
//! Writes for a *single* target are issued sequentially by the engine.

use async_trait::async_trait;

use super::error::StoreResult;
use super::schema::{AlertRecord, AlertSettings, LogEntry, TargetUpdate};
use crate::Target;

/// Trait for the persistent store behind the engine
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// All targets with the active flag set, in no particular order
    async fn active_targets(&self) -> StoreResult<Vec<Target>>;

    /// Current alert settings snapshot.
    ///
    /// `Ok(None)` means no settings row exists; the engine falls back to
    /// its configured defaults rather than failing the cycle.
    async fn alert_settings(&self) -> StoreResult<Option<AlertSettings>>;

    /// Apply the per-cycle mutation to a target record.
    ///
    /// Consecutive cycles are serialized by the external trigger cadence;
    /// if cycles ever overlap, last write wins.
    async fn update_target(&self, update: TargetUpdate) -> StoreResult<()>;

    /// Append one check-history row. Never updated or deleted afterwards.
    async fn append_log(&self, entry: LogEntry) -> StoreResult<()>;

    /// Append one alert-audit row.
    async fn append_alert(&self, record: AlertRecord) -> StoreResult<()>;
}
