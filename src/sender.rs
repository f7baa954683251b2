//! Outbound delivery to the messaging provider.
//!
//! Pure I/O behind a trait — the engine never knows which transport it
//! is talking to, and tests substitute recording doubles.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::SendError;
use crate::outbound::OutboundMessage;

/// Delivers structured outbound messages to the messaging provider.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, to: &str, message: &OutboundMessage) -> Result<(), SendError>;
}

/// Production sender for the WhatsApp Cloud API.
pub struct CloudApiSender {
    client: reqwest::Client,
    api_base: String,
    phone_number_id: String,
    access_token: SecretString,
}

impl CloudApiSender {
    pub fn new(api_base: String, phone_number_id: String, access_token: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
            phone_number_id,
            access_token,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/{}/messages",
            self.api_base.trim_end_matches('/'),
            self.phone_number_id
        )
    }
}

#[async_trait]
impl MessageSender for CloudApiSender {
    async fn send(&self, to: &str, message: &OutboundMessage) -> Result<(), SendError> {
        let payload = message.to_provider_payload(to);

        let resp = self
            .client
            .post(self.messages_url())
            .bearer_auth(self.access_token.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| SendError::Request {
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SendError::Rejected { status, body });
        }

        debug!(to, kind = message.label(), "outbound message delivered");
        Ok(())
    }
}
