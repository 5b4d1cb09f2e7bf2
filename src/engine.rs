//! Cycle orchestrator
//!
//! One invocation of [`Engine::run_cycle`] is a complete, independent pass
//! over all active targets. The engine owns no timer; an external trigger
//! (cron-driven worker hitting the HTTP endpoint) decides the cadence.
//!
//! ## Per-target flow
//!
//! ```text
//! store ──active targets──▶ Prober ──▶ next_uptime ──▶ evaluate
//!                                                        │
//!                              target update ◀───────────┤
//!                              log append    ◀───────────┤
//!                              AlertDispatcher ◀─(policy)─┘
//! ```
//!
//! Targets are checked concurrently with a bounded pool; the three writes
//! for a single target are serialized relative to each other. A failure on
//! one target (probe or store write) is logged and never aborts the cycle
//! for the others.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::{StreamExt, stream};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::alerts::AlertDispatcher;
use crate::config::MonitorConfig;
use crate::email::EmailTransport;
use crate::monitors::prober::Prober;
use crate::monitors::status::evaluate;
use crate::monitors::uptime::next_uptime;
use crate::storage::{AlertSettings, LogEntry, TargetStore, TargetUpdate};
use crate::{Target, TargetStatus};

/// How often a target that stays down (and below threshold) is re-alerted.
///
/// `EveryCycle` reproduces the legacy level-triggered behavior; `Cooldown`
/// alerts when the condition is entered and then suppresses repeats until
/// the window elapses. Recovery clears the suppression state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertPolicy {
    EveryCycle,
    Cooldown(chrono::Duration),
}

impl AlertPolicy {
    pub fn from_cooldown_secs(secs: u64) -> Self {
        if secs == 0 {
            AlertPolicy::EveryCycle
        } else {
            AlertPolicy::Cooldown(chrono::Duration::seconds(secs as i64))
        }
    }
}

/// Summary of one completed cycle, returned to the trigger caller
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub timestamp: DateTime<Utc>,
    pub checked: usize,
    pub results: Vec<TargetReport>,
}

/// Per-target slice of a [`CycleReport`]
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub url_id: String,
    pub url_name: String,
    pub status: TargetStatus,
    pub uptime: f64,
    pub response_time_ms: u64,
    pub status_code: u16,
    pub alerted: bool,
}

/// The monitoring engine: prober, estimator, tracker and dispatcher wired
/// around the store
pub struct Engine {
    store: Arc<dyn TargetStore>,
    prober: Prober,
    dispatcher: Option<AlertDispatcher>,
    config: MonitorConfig,
    policy: AlertPolicy,

    /// Last dispatch time per target, for cooldown suppression. In-process
    /// state: a restart may re-send one alert early, keeping delivery
    /// at-least-once.
    last_alerts: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl Engine {
    /// Build an engine around a store and an optional email transport.
    /// Without a transport the engine still checks and logs, it just never
    /// dispatches.
    pub fn new(
        store: Arc<dyn TargetStore>,
        transport: Option<Arc<dyn EmailTransport>>,
        config: MonitorConfig,
    ) -> Result<Self> {
        let prober = Prober::new(Duration::from_millis(config.check_timeout_ms))?;
        let dispatcher =
            transport.map(|transport| AlertDispatcher::new(transport, Arc::clone(&store)));
        let policy = AlertPolicy::from_cooldown_secs(config.realert_cooldown_secs);

        Ok(Self {
            store,
            prober,
            dispatcher,
            config,
            policy,
            last_alerts: Mutex::new(HashMap::new()),
        })
    }

    /// Run one complete check cycle over all active targets.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> CycleReport {
        let started = Instant::now();
        let timestamp = Utc::now();

        let settings = self.settings_snapshot().await;

        let targets = match self.store.active_targets().await {
            Ok(targets) => targets,
            Err(e) => {
                error!("failed to load active targets, skipping cycle: {e}");
                return CycleReport {
                    timestamp,
                    checked: 0,
                    results: vec![],
                };
            }
        };

        debug!("checking {} active targets", targets.len());

        let results: Vec<TargetReport> = stream::iter(targets)
            .map(|target| self.process_target(target, &settings))
            .buffer_unordered(self.config.max_concurrent_checks.max(1))
            .collect()
            .await;

        let elapsed = started.elapsed();
        let interval = Duration::from_millis(self.config.recheck_interval_ms);
        if elapsed > interval.mul_f64(0.8) {
            warn!(
                "cycle took {}ms, approaching the {}ms recheck interval",
                elapsed.as_millis(),
                interval.as_millis()
            );
        }

        info!(
            "cycle complete: {} targets checked in {}ms",
            results.len(),
            elapsed.as_millis()
        );

        CycleReport {
            timestamp,
            checked: results.len(),
            results,
        }
    }

    /// Read the alert settings snapshot, falling back to configured
    /// defaults so a settings outage never stops the checks.
    async fn settings_snapshot(&self) -> AlertSettings {
        let fallback = AlertSettings {
            alert_threshold: self.config.alert_threshold,
            recipients: vec![],
        };

        match self.store.alert_settings().await {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                debug!("no alert settings stored, using defaults");
                fallback
            }
            Err(e) => {
                warn!("failed to load alert settings, using defaults: {e}");
                fallback
            }
        }
    }

    /// Check one target and persist the results. Infallible by design:
    /// every failure mode ends up in the logs, not in the return path.
    #[instrument(skip(self, target, settings), fields(target = %target.display_name()))]
    async fn process_target(&self, target: Target, settings: &AlertSettings) -> TargetReport {
        let now = Utc::now();

        let outcome = self.prober.check(&target.url).await;
        let new_uptime = next_uptime(target.uptime, outcome.ok, self.config.smoothing_weight);
        let transition = evaluate(
            target.status,
            target.down_since,
            outcome.ok,
            new_uptime,
            settings.alert_threshold,
            now,
        );

        let update = TargetUpdate::from_check(&target, &outcome, new_uptime, &transition, now);
        if let Err(e) = self.store.update_target(update).await {
            error!("failed to persist target update: {e}");
        }

        let entry = LogEntry::from_check(&target, &outcome, new_uptime, transition.status, now);
        if let Err(e) = self.store.append_log(entry).await {
            error!("failed to append log entry: {e}");
        }

        let mut alerted = false;
        if transition.should_alert {
            match &self.dispatcher {
                Some(dispatcher) if !settings.recipients.is_empty() => {
                    if self.should_dispatch(&target.id, now).await {
                        let detected_at = transition.down_since.unwrap_or(now);
                        dispatcher
                            .dispatch(&target, new_uptime, &outcome, settings, detected_at)
                            .await;
                        alerted = true;
                    } else {
                        debug!("alert suppressed by cooldown");
                    }
                }
                Some(_) => debug!("no alert recipients configured, skipping dispatch"),
                None => debug!("no email transport configured, skipping dispatch"),
            }
        } else if transition.status == TargetStatus::Up {
            self.clear_suppression(&target.id).await;
        }

        TargetReport {
            url_id: target.id.clone(),
            url_name: target.display_name().to_string(),
            status: transition.status,
            uptime: new_uptime,
            response_time_ms: outcome.elapsed_ms,
            status_code: outcome.status_code,
            alerted,
        }
    }

    /// Apply the alert policy; a `true` return also stamps the dispatch
    /// time so the next cycle sees it.
    async fn should_dispatch(&self, target_id: &str, now: DateTime<Utc>) -> bool {
        match self.policy {
            AlertPolicy::EveryCycle => true,
            AlertPolicy::Cooldown(window) => {
                let mut last_alerts = self.last_alerts.lock().await;
                let due = last_alerts
                    .get(target_id)
                    .is_none_or(|last| now.signed_duration_since(*last) >= window);

                if due {
                    last_alerts.insert(target_id.to_string(), now);
                }

                due
            }
        }
    }

    async fn clear_suppression(&self, target_id: &str) {
        if matches!(self.policy, AlertPolicy::Cooldown(_)) {
            self.last_alerts.lock().await.remove(target_id);
        }
    }
}
