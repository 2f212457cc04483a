use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, instrument};

use super::ContactError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub text: String,
    pub reply_to: String,
}

/// Delivers an [`EmailMessage`]. SMTP and friends live behind this trait.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), ContactError>;
}

/// Logs the message instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), ContactError> {
        info!(
            to = %message.to,
            reply_to = %message.reply_to,
            subject = %message.subject,
            "Contact email (not sent, no mail relay configured)"
        );
        Ok(())
    }
}

/// POSTs the message as JSON to a mail relay.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: Client,
    url: String,
}

impl HttpMailer {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ContactError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    #[instrument(name = "Mail relay", skip_all, fields(to = %message.to))]
    async fn send(&self, message: &EmailMessage) -> Result<(), ContactError> {
        let response = self.client.post(&self.url).json(message).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContactError::Rejected(format!("{status}: {body}")));
        }
        Ok(())
    }
}
