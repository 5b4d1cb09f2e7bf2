//! Outbound email boundary
//!
//! The engine only knows the [`EmailTransport`] trait; the shipped
//! implementation submits messages to a transactional email HTTP API
//! (Brevo-compatible payload shape). Transport failures surface as
//! [`EmailError`] so the dispatcher can record them without ever letting
//! them abort a cycle.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::config::EmailConfig;

/// A rendered alert notification, ready for submission
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Errors surfaced by an email transport
#[derive(Debug)]
pub enum EmailError {
    /// The request never completed (connect failure, timeout, TLS, ...)
    Transport(String),

    /// The API answered with a non-success status
    Rejected { status: u16, body: String },
}

impl fmt::Display for EmailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmailError::Transport(msg) => write!(f, "email transport error: {}", msg),
            EmailError::Rejected { status, body } => {
                write!(f, "email API rejected message with status {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for EmailError {}

/// Trait for the external email collaborator
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

/// HTTP mail-API transport
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: Client,
    endpoint: String,
    api_key: String,
    sender: String,
    sender_name: Option<String>,
}

impl HttpMailer {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            sender: config.sender.clone(),
            sender_name: config.sender_name.clone(),
        }
    }
}

#[async_trait]
impl EmailTransport for HttpMailer {
    #[instrument(skip(self, message), fields(subject = %message.subject))]
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let payload = json!({
            "sender": {
                "email": self.sender,
                "name": self.sender_name.as_deref().unwrap_or("URL Monitor"),
            },
            "to": message
                .to
                .iter()
                .map(|email| json!({ "email": email }))
                .collect::<Vec<_>>(),
            "subject": message.subject,
            "textContent": message.text,
            "htmlContent": message.html,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected { status, body });
        }

        info!("email submitted to {} recipient(s)", message.to.len());
        Ok(())
    }
}
