pub mod alerts;
pub mod api;
pub mod config;
pub mod email;
pub mod engine;
pub mod monitors;
pub mod storage;
pub mod util;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reachability state of a monitored URL.
///
/// `Pending` is the state of a freshly registered target that has not been
/// checked yet; the first completed check moves it to `Up` or `Down`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    Up,
    Down,
    Pending,
}

impl TargetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetStatus::Up => "up",
            TargetStatus::Down => "down",
            TargetStatus::Pending => "pending",
        }
    }
}

impl std::fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TargetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(TargetStatus::Up),
            "down" => Ok(TargetStatus::Down),
            "pending" => Ok(TargetStatus::Pending),
            other => Err(format!("unknown target status: {other}")),
        }
    }
}

/// A URL registered for periodic reachability monitoring.
///
/// Invariants maintained by the engine:
/// - `uptime` stays within `[0, 100]`
/// - `down_since` is `Some` iff `status` is `Down`, and is cleared the
///   moment the target comes back up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// Store-assigned identifier
    pub id: String,

    /// The URL to check
    pub url: String,

    /// Optional display name (falls back to the URL)
    pub name: Option<String>,

    /// Inactive targets are skipped by the cycle
    pub is_active: bool,

    /// Current reachability state
    pub status: TargetStatus,

    /// Smoothed uptime percentage (0-100)
    pub uptime: f64,

    /// Response time of the most recent check, in milliseconds
    pub response_time_ms: Option<u64>,

    /// When the target was last checked
    pub last_checked: Option<DateTime<Utc>>,

    /// Start of the current continuous outage, if any
    pub down_since: Option<DateTime<Utc>>,
}

impl Target {
    /// Name used in logs, alerts and reports
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.url)
    }
}

/// Result of a single reachability check.
///
/// Ephemeral: produced by the prober, folded into the target update and the
/// log entry, then discarded. A network-level failure (timeout, DNS error,
/// refused connection) is represented as `ok = false, status_code = 0` with
/// `elapsed_ms` holding the time spent before the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Whether the check counts as a success (response with a 2xx-3xx status)
    pub ok: bool,

    /// HTTP status code, 0 if no response was received
    pub status_code: u16,

    /// Elapsed wall-clock time of the check in milliseconds
    pub elapsed_ms: u64,
}
