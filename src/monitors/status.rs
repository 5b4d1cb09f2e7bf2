//! Status transition and alert-condition tracking
//!
//! The legal transitions are:
//!
//! ```text
//! up      ──ok──▶ up          down    ──ok──▶ up   (down_since cleared)
//! up      ──!ok─▶ down        down    ──!ok─▶ down (down_since retained)
//! pending ──ok──▶ up          pending ──!ok─▶ down
//! ```
//!
//! `should_alert` is the level condition "down and below threshold"; how
//! often that condition actually results in an email is decided by the
//! engine's [`AlertPolicy`](crate::engine::AlertPolicy).

use chrono::{DateTime, Utc};

use crate::TargetStatus;

/// Outcome of evaluating one check against the previous target state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    /// Status after this check
    pub status: TargetStatus,

    /// Start of the current outage; `None` whenever the target is up
    pub down_since: Option<DateTime<Utc>>,

    /// Whether the alert condition holds for this cycle
    pub should_alert: bool,
}

/// Evaluate a check result against the previous state. Pure decision
/// function, no side effects.
///
/// - the new status follows the check alone (`ok` → up, otherwise down)
/// - `down_since` is stamped `now` when the target *enters* the down state
///   and carried unchanged while it stays down
/// - the alert condition requires both being down and a smoothed uptime
///   below `threshold`, so a single blip on a healthy target never alerts
pub fn evaluate(
    prev_status: TargetStatus,
    prev_down_since: Option<DateTime<Utc>>,
    ok: bool,
    new_uptime: f64,
    threshold: f64,
    now: DateTime<Utc>,
) -> StatusTransition {
    if ok {
        return StatusTransition {
            status: TargetStatus::Up,
            down_since: None,
            should_alert: false,
        };
    }

    let down_since = match prev_status {
        TargetStatus::Down => prev_down_since.or(Some(now)),
        TargetStatus::Up | TargetStatus::Pending => Some(now),
    };

    StatusTransition {
        status: TargetStatus::Down,
        down_since,
        should_alert: new_uptime < threshold,
    }
}
