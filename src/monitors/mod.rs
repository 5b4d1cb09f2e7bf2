//! Decision logic for the check cycle
//!
//! Three small pieces, wired together by the engine:
//!
//! ```text
//! Prober ──▶ CheckOutcome ──▶ next_uptime ──▶ evaluate ──▶ StatusTransition
//! ```
//!
//! `next_uptime` and `evaluate` are pure functions; all I/O lives in the
//! prober and in the engine around them.

pub mod prober;
pub mod status;
pub mod uptime;
