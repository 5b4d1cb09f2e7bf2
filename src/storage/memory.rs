//! In-memory store (no persistence)
//!
//! Useful for tests and throwaway deployments. All data is lost on restart;
//! log and alert history grow unbounded, which is acceptable for the short
//! lifetimes this backend is meant for.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::backend::TargetStore;
use super::error::{StoreError, StoreResult};
use super::schema::{AlertRecord, AlertSettings, LogEntry, TargetUpdate};
use crate::Target;

#[derive(Debug, Default)]
struct Inner {
    targets: HashMap<String, Target>,
    settings: Option<AlertSettings>,
    logs: Vec<LogEntry>,
    alerts: Vec<AlertRecord>,
}

/// In-memory implementation of [`TargetStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a target (registration is otherwise outside the engine's scope)
    pub async fn insert_target(&self, target: Target) {
        self.inner.write().await.targets.insert(target.id.clone(), target);
    }

    /// Replace the alert settings snapshot
    pub async fn put_settings(&self, settings: AlertSettings) {
        self.inner.write().await.settings = Some(settings);
    }

    /// Current state of a target, if present
    pub async fn target(&self, id: &str) -> Option<Target> {
        self.inner.read().await.targets.get(id).cloned()
    }

    /// All log rows appended so far, oldest first
    pub async fn logs(&self) -> Vec<LogEntry> {
        self.inner.read().await.logs.clone()
    }

    /// All alert-audit rows appended so far, oldest first
    pub async fn alert_records(&self) -> Vec<AlertRecord> {
        self.inner.read().await.alerts.clone()
    }
}

#[async_trait]
impl TargetStore for MemoryStore {
    async fn active_targets(&self) -> StoreResult<Vec<Target>> {
        let inner = self.inner.read().await;
        Ok(inner
            .targets
            .values()
            .filter(|target| target.is_active)
            .cloned()
            .collect())
    }

    async fn alert_settings(&self) -> StoreResult<Option<AlertSettings>> {
        Ok(self.inner.read().await.settings.clone())
    }

    async fn update_target(&self, update: TargetUpdate) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let target = inner
            .targets
            .get_mut(&update.id)
            .ok_or_else(|| StoreError::QueryFailed(format!("no such target: {}", update.id)))?;

        target.status = update.status;
        target.response_time_ms = Some(update.response_time_ms);
        target.uptime = update.uptime;
        target.last_checked = Some(update.last_checked);
        target.down_since = update.down_since;

        Ok(())
    }

    async fn append_log(&self, entry: LogEntry) -> StoreResult<()> {
        debug!("appending log entry for {}", entry.url_id);
        self.inner.write().await.logs.push(entry);
        Ok(())
    }

    async fn append_alert(&self, record: AlertRecord) -> StoreResult<()> {
        self.inner.write().await.alerts.push(record);
        Ok(())
    }
}
