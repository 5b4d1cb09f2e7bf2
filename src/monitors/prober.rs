//! HTTP reachability prober
//!
//! One GET per check, bounded by the configured timeout. The prober never
//! surfaces network conditions as errors: timeouts, DNS failures and refused
//! connections all fold into a `CheckOutcome` with `ok = false` and
//! `status_code = 0`, so a flaky target can never abort the cycle loop.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{instrument, trace, warn};

use crate::CheckOutcome;

/// Identifies the monitor in target access logs
const CLIENT_IDENT: &str = concat!("vigil/", env!("CARGO_PKG_VERSION"));

/// Performs reachability checks against target URLs.
///
/// The underlying client is reused across checks; redirects are followed,
/// so the classified status code is the one of the final response.
#[derive(Debug, Clone)]
pub struct Prober {
    client: reqwest::Client,
}

impl Prober {
    /// Create a prober with the given per-check timeout.
    ///
    /// Fails only on client construction (programmer error), never for
    /// network conditions.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(CLIENT_IDENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }

    /// Check a single URL.
    ///
    /// `ok` is true iff a response arrived with a status in the 2xx-3xx
    /// range. Elapsed time is measured up to the failure point when the
    /// request does not complete.
    #[instrument(skip(self))]
    pub async fn check(&self, url: &str) -> CheckOutcome {
        trace!("checking {url}");

        let start = Instant::now();

        match self.client.get(url).send().await {
            Ok(response) => {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                let status_code = response.status().as_u16();

                CheckOutcome {
                    ok: (200..400).contains(&status_code),
                    status_code,
                    elapsed_ms,
                }
            }
            Err(e) => {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                warn!("check failed after {elapsed_ms}ms: {e}");

                CheckOutcome {
                    ok: false,
                    status_code: 0,
                    elapsed_ms,
                }
            }
        }
    }
}
