//! Alert dispatch
//!
//! Formats a downtime notification and submits it through the email
//! transport. Every attempt, successful or not, leaves an [`AlertRecord`]
//! in the store; transport failures are recorded and swallowed so the
//! caller's cycle loop is never interrupted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument, warn};

use crate::email::{EmailMessage, EmailTransport};
use crate::storage::{AlertChannel, AlertRecord, AlertSettings, DeliveryOutcome, TargetStore};
use crate::{CheckOutcome, Target};

pub struct AlertDispatcher {
    transport: Arc<dyn EmailTransport>,
    store: Arc<dyn TargetStore>,
}

impl AlertDispatcher {
    pub fn new(transport: Arc<dyn EmailTransport>, store: Arc<dyn TargetStore>) -> Self {
        Self { transport, store }
    }

    /// Send a downtime alert for `target` and record the attempt.
    #[instrument(skip(self, target, outcome, settings), fields(target = %target.display_name()))]
    pub async fn dispatch(
        &self,
        target: &Target,
        uptime: f64,
        outcome: &CheckOutcome,
        settings: &AlertSettings,
        detected_at: DateTime<Utc>,
    ) -> DeliveryOutcome {
        let message = self.build_message(target, uptime, outcome, settings, detected_at);

        let (delivery, details) = match self.transport.send(&message).await {
            Ok(()) => {
                info!(
                    "downtime alert sent for {} (uptime {:.2}%)",
                    target.display_name(),
                    uptime
                );
                (
                    DeliveryOutcome::Sent,
                    format!("Downtime alert sent to {}", settings.recipients.join(", ")),
                )
            }
            Err(e) => {
                error!("failed to send downtime alert: {e}");
                (DeliveryOutcome::Failed, e.to_string())
            }
        };

        let record = AlertRecord {
            url_id: target.id.clone(),
            channel: AlertChannel::Email,
            outcome: delivery,
            details,
            timestamp: Utc::now(),
        };

        if let Err(e) = self.store.append_alert(record).await {
            warn!("failed to record alert attempt: {e}");
        }

        delivery
    }

    fn build_message(
        &self,
        target: &Target,
        uptime: f64,
        outcome: &CheckOutcome,
        settings: &AlertSettings,
        detected_at: DateTime<Utc>,
    ) -> EmailMessage {
        let name = target.display_name();
        let detected = detected_at.to_rfc3339();

        let subject = format!("🚨 ALERT: {name} is DOWN");

        let text = format!(
            "Your website {name} is currently down.\n\
             \n\
             URL: {url}\n\
             Current uptime: {uptime:.2}%\n\
             Alert threshold: {threshold:.0}%\n\
             Response time: {elapsed}ms\n\
             Detected at: {detected}\n",
            url = target.url,
            threshold = settings.alert_threshold,
            elapsed = outcome.elapsed_ms,
        );

        let html = format!(
            r#"<h2>🚨 Website Down Alert</h2>
<div style="padding: 20px; border: 1px solid #ff4444; border-radius: 5px; margin: 20px 0;">
  <h3 style="color: #ff4444; margin: 0;">Website is Currently DOWN</h3>
  <p><strong>URL:</strong> {url}</p>
  <p><strong>Detected At:</strong> {detected}</p>
  <p><strong>Current Uptime:</strong> {uptime:.2}%</p>
  <p><strong>Alert Threshold:</strong> {threshold:.0}%</p>
</div>
<p>Please check your website and take necessary action.</p>
<hr>
<p><small>Sent by URL Monitor</small></p>"#,
            url = target.url,
            threshold = settings.alert_threshold,
        );

        EmailMessage {
            to: settings.recipients.clone(),
            subject,
            text,
            html,
        }
    }
}
