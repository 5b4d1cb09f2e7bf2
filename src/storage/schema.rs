//! Row types written by the engine
//!
//! The target table is the only mutable surface, and only through
//! [`TargetUpdate`], one update per target per cycle. Log and alert rows
//! are append-only history; the engine never updates or deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::monitors::status::StatusTransition;
use crate::{CheckOutcome, Target, TargetStatus};

/// The per-cycle mutation of a target record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetUpdate {
    pub id: String,
    pub status: TargetStatus,
    pub response_time_ms: u64,
    pub uptime: f64,
    pub last_checked: DateTime<Utc>,
    pub down_since: Option<DateTime<Utc>>,
}

impl TargetUpdate {
    pub fn from_check(
        target: &Target,
        outcome: &CheckOutcome,
        new_uptime: f64,
        transition: &StatusTransition,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: target.id.clone(),
            status: transition.status,
            response_time_ms: outcome.elapsed_ms,
            uptime: new_uptime,
            last_checked: now,
            down_since: transition.down_since,
        }
    }
}

/// One append-only history row per (target, cycle)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub url_id: String,

    /// Display name denormalized at write time
    pub url_name: String,

    pub status: TargetStatus,
    pub response_time_ms: u64,
    pub status_code: u16,

    /// Uptime score at the time of the check
    pub uptime: f64,

    /// Free-text detail for the dashboard's log view
    pub details: String,

    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn from_check(
        target: &Target,
        outcome: &CheckOutcome,
        new_uptime: f64,
        status: TargetStatus,
        now: DateTime<Utc>,
    ) -> Self {
        let details = if outcome.ok {
            String::from("Site is up")
        } else if outcome.status_code > 0 {
            format!("Site is down (HTTP {})", outcome.status_code)
        } else {
            String::from("Site is down (no response)")
        };

        Self {
            url_id: target.id.clone(),
            url_name: target.display_name().to_string(),
            status,
            response_time_ms: outcome.elapsed_ms,
            status_code: outcome.status_code,
            uptime: new_uptime,
            details,
            timestamp: now,
        }
    }
}

/// Shared alert configuration, read as a snapshot once per cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSettings {
    /// Uptime percentage below which a down target triggers notification
    pub alert_threshold: f64,

    /// Destination addresses; empty disables dispatch (checks still run)
    pub recipients: Vec<String>,
}

/// Notification channel of an alert attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertChannel {
    Email,
}

impl std::fmt::Display for AlertChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertChannel::Email => write!(f, "email"),
        }
    }
}

/// Result of an alert dispatch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOutcome {
    Sent,
    Failed,
}

impl std::fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryOutcome::Sent => write!(f, "sent"),
            DeliveryOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Audit row appended after every dispatch attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub url_id: String,
    pub channel: AlertChannel,
    pub outcome: DeliveryOutcome,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}
