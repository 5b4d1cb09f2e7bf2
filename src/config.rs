use std::path::PathBuf;

use tracing::trace;

/// Storage backend configuration
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (no persistence)
    #[serde(rename = "none")]
    None,

    /// SQLite database (default for most deployments)
    Sqlite {
        /// Path to the SQLite database file
        #[serde(default = "default_sqlite_path")]
        path: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Sqlite {
            path: default_sqlite_path(),
        }
    }
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("./monitor.db")
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Check loop tuning (optional - every field has a documented default)
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Storage configuration (optional - defaults to SQLite)
    pub storage: Option<StorageConfig>,

    /// Outbound email transport; alert dispatch is disabled when absent
    pub email: Option<EmailConfig>,

    #[serde(default)]
    pub trigger: TriggerConfig,
}

/// Tuning knobs for the check cycle.
///
/// The alert threshold here is the fallback used when the store holds no
/// alert settings snapshot.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct MonitorConfig {
    /// Uptime percentage below which a down target triggers notification
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: f64,

    /// Exponential smoothing weight applied per check
    #[serde(default = "default_smoothing_weight")]
    pub smoothing_weight: f64,

    /// Per-check timeout in milliseconds
    #[serde(default = "default_check_timeout_ms")]
    pub check_timeout_ms: u64,

    /// Cadence the external trigger is expected to fire at, in milliseconds.
    /// Only used to warn when a cycle runs long enough to risk overlap.
    #[serde(default = "default_recheck_interval_ms")]
    pub recheck_interval_ms: u64,

    /// Seconds to suppress repeat alerts for a target that stays down.
    /// 0 re-sends on every qualifying cycle.
    #[serde(default = "default_realert_cooldown_secs")]
    pub realert_cooldown_secs: u64,

    /// Upper bound on concurrently running checks within one cycle
    #[serde(default = "default_max_concurrent_checks")]
    pub max_concurrent_checks: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            alert_threshold: default_alert_threshold(),
            smoothing_weight: default_smoothing_weight(),
            check_timeout_ms: default_check_timeout_ms(),
            recheck_interval_ms: default_recheck_interval_ms(),
            realert_cooldown_secs: default_realert_cooldown_secs(),
            max_concurrent_checks: default_max_concurrent_checks(),
        }
    }
}

/// Outbound email transport configuration (HTTP mail API)
#[derive(Debug, Clone, serde::Deserialize)]
pub struct EmailConfig {
    /// Transactional email API endpoint
    #[serde(default = "default_email_endpoint")]
    pub endpoint: String,

    pub api_key: String,

    /// Sender address alerts are mailed from
    pub sender: String,

    pub sender_name: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct TriggerConfig {
    /// Shared secret the trigger endpoint requires; falls back to the
    /// MONITOR_SECRET environment variable when absent
    pub secret: Option<String>,
}

fn default_alert_threshold() -> f64 {
    90.0
}

fn default_smoothing_weight() -> f64 {
    0.01
}

fn default_check_timeout_ms() -> u64 {
    30_000
}

fn default_recheck_interval_ms() -> u64 {
    120_000
}

fn default_realert_cooldown_secs() -> u64 {
    900
}

fn default_max_concurrent_checks() -> usize {
    8
}

fn default_email_endpoint() -> String {
    String::from("https://api.brevo.com/v3/smtp/email")
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|_| anyhow::anyhow!("Invalid configuration file provided!"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
