//! SQLite store implementation
//!
//! Embedded database for self-hosted deployments: no separate server, WAL
//! journal mode for concurrent reads during the cycle's writes, connection
//! pooling, and automatic schema versioning with sqlx migrations.
//!
//! The engine's write volume is tiny (three rows per target per cycle), so
//! no batching is needed; every write is a single statement.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info, instrument};

use super::backend::TargetStore;
use super::error::{StoreError, StoreResult};
use super::schema::{AlertChannel, AlertRecord, AlertSettings, DeliveryOutcome, LogEntry, TargetUpdate};
use crate::{Target, TargetStatus};

/// SQLite-backed implementation of [`TargetStore`]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `db_path` and run
    /// migrations.
    #[instrument(skip_all)]
    pub async fn new(db_path: impl AsRef<Path>) -> StoreResult<Self> {
        let db_path_str = db_path.as_ref().to_string_lossy().to_string();

        info!("initializing SQLite store at: {}", db_path_str);

        let options = SqliteConnectOptions::new()
            .filename(&db_path_str)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        debug!("running database migrations");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;

        Ok(Self { pool })
    }

    fn timestamp_to_millis(dt: &DateTime<Utc>) -> i64 {
        dt.timestamp_millis()
    }

    fn millis_to_timestamp(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
    }

    fn parse_status(raw: &str) -> StoreResult<TargetStatus> {
        TargetStatus::from_str(raw).map_err(StoreError::SerializationError)
    }

    fn row_to_target(row: &sqlx::sqlite::SqliteRow) -> StoreResult<Target> {
        let status: String = row.try_get("status")?;
        let last_checked: Option<i64> = row.try_get("last_checked")?;
        let down_since: Option<i64> = row.try_get("down_since")?;
        let response_time: Option<i64> = row.try_get("response_time")?;

        Ok(Target {
            id: row.try_get("id")?,
            url: row.try_get("url")?,
            name: row.try_get("name")?,
            is_active: row.try_get::<i64, _>("is_active")? != 0,
            status: Self::parse_status(&status)?,
            uptime: row.try_get("uptime")?,
            response_time_ms: response_time.map(|ms| ms as u64),
            last_checked: last_checked.map(Self::millis_to_timestamp),
            down_since: down_since.map(Self::millis_to_timestamp),
        })
    }

    /// Seed a target row (registration is owned by the surrounding app;
    /// this exists for provisioning and tests)
    pub async fn insert_target(&self, target: &Target) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO urls (id, url, name, is_active, status, uptime, response_time, last_checked, down_since)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&target.id)
        .bind(&target.url)
        .bind(&target.name)
        .bind(target.is_active as i64)
        .bind(target.status.as_str())
        .bind(target.uptime)
        .bind(target.response_time_ms.map(|ms| ms as i64))
        .bind(target.last_checked.as_ref().map(Self::timestamp_to_millis))
        .bind(target.down_since.as_ref().map(Self::timestamp_to_millis))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replace the alert settings snapshot
    pub async fn put_settings(&self, settings: &AlertSettings) -> StoreResult<()> {
        let recipients = serde_json::to_string(&settings.recipients)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO settings (id, alert_threshold, recipients)
            VALUES (1, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                alert_threshold = excluded.alert_threshold,
                recipients = excluded.recipients
            "#,
        )
        .bind(settings.alert_threshold)
        .bind(recipients)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The N most recent log rows for a target, newest first
    pub async fn recent_logs(&self, url_id: &str, limit: usize) -> StoreResult<Vec<LogEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT url_id, url_name, status, response_time, status_code, uptime, details, timestamp
            FROM logs
            WHERE url_id = ?
            ORDER BY timestamp DESC
            LIMIT ?
            "#,
        )
        .bind(url_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let status: String = row.try_get("status")?;
                Ok(LogEntry {
                    url_id: row.try_get("url_id")?,
                    url_name: row.try_get("url_name")?,
                    status: Self::parse_status(&status)?,
                    response_time_ms: row.try_get::<i64, _>("response_time")? as u64,
                    status_code: row.try_get::<i64, _>("status_code")? as u16,
                    uptime: row.try_get("uptime")?,
                    details: row.try_get("details")?,
                    timestamp: Self::millis_to_timestamp(row.try_get("timestamp")?),
                })
            })
            .collect()
    }

    /// All alert-audit rows for a target, newest first
    pub async fn alerts_for(&self, url_id: &str) -> StoreResult<Vec<AlertRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT url_id, channel, outcome, details, timestamp
            FROM alerts
            WHERE url_id = ?
            ORDER BY timestamp DESC
            "#,
        )
        .bind(url_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let channel: String = row.try_get("channel")?;
                let outcome: String = row.try_get("outcome")?;
                Ok(AlertRecord {
                    url_id: row.try_get("url_id")?,
                    channel: match channel.as_str() {
                        "email" => AlertChannel::Email,
                        other => {
                            return Err(StoreError::SerializationError(format!(
                                "unknown alert channel: {other}"
                            )));
                        }
                    },
                    outcome: match outcome.as_str() {
                        "sent" => DeliveryOutcome::Sent,
                        "failed" => DeliveryOutcome::Failed,
                        other => {
                            return Err(StoreError::SerializationError(format!(
                                "unknown delivery outcome: {other}"
                            )));
                        }
                    },
                    details: row.try_get("details")?,
                    timestamp: Self::millis_to_timestamp(row.try_get("timestamp")?),
                })
            })
            .collect()
    }
}

#[async_trait]
impl TargetStore for SqliteStore {
    async fn active_targets(&self) -> StoreResult<Vec<Target>> {
        let rows = sqlx::query(
            r#"
            SELECT id, url, name, is_active, status, uptime, response_time, last_checked, down_since
            FROM urls
            WHERE is_active = 1
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_target).collect()
    }

    async fn alert_settings(&self) -> StoreResult<Option<AlertSettings>> {
        let row = sqlx::query("SELECT alert_threshold, recipients FROM settings WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let recipients_raw: String = row.try_get("recipients")?;
        let recipients = serde_json::from_str(&recipients_raw)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;

        Ok(Some(AlertSettings {
            alert_threshold: row.try_get("alert_threshold")?,
            recipients,
        }))
    }

    #[instrument(skip(self, update), fields(url_id = %update.id))]
    async fn update_target(&self, update: TargetUpdate) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE urls
            SET status = ?, response_time = ?, uptime = ?, last_checked = ?, down_since = ?
            WHERE id = ?
            "#,
        )
        .bind(update.status.as_str())
        .bind(update.response_time_ms as i64)
        .bind(update.uptime)
        .bind(Self::timestamp_to_millis(&update.last_checked))
        .bind(update.down_since.as_ref().map(Self::timestamp_to_millis))
        .bind(&update.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::QueryFailed(format!(
                "no such target: {}",
                update.id
            )));
        }

        Ok(())
    }

    async fn append_log(&self, entry: LogEntry) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO logs (url_id, url_name, status, response_time, status_code, uptime, details, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.url_id)
        .bind(&entry.url_name)
        .bind(entry.status.as_str())
        .bind(entry.response_time_ms as i64)
        .bind(entry.status_code as i64)
        .bind(entry.uptime)
        .bind(&entry.details)
        .bind(Self::timestamp_to_millis(&entry.timestamp))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn append_alert(&self, record: AlertRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO alerts (url_id, channel, outcome, details, timestamp)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.url_id)
        .bind(record.channel.to_string())
        .bind(record.outcome.to_string())
        .bind(&record.details)
        .bind(Self::timestamp_to_millis(&record.timestamp))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
