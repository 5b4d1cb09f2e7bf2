//! Rolling uptime score
//!
//! The uptime score is an exponentially smoothed percentage: each check moves
//! the score a fixed fraction of the remaining distance toward 100 (success)
//! or 0 (failure). A single missed check therefore barely dents a healthy
//! score, which keeps the alert threshold from flapping, while a sustained
//! outage decays the score toward 0 at the same proportional rate as
//! recovery climbs it back.

/// Smoothing weight applied per check (1% of the distance to the extreme)
pub const DEFAULT_SMOOTHING_WEIGHT: f64 = 0.01;

/// Compute the uptime score after one check.
///
/// `next = prev * (1 - weight) + (ok ? 100 : 0) * weight`, clamped to
/// `[0, 100]`. Pure function, no side effects.
pub fn next_uptime(prev: f64, ok: bool, weight: f64) -> f64 {
    let pull = if ok { 100.0 } else { 0.0 };
    let next = prev * (1.0 - weight) + pull * weight;
    next.clamp(0.0, 100.0)
}
