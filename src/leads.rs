//! Lead capture — forwards normalized interaction records to a collector.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::LeadError;

/// Interaction kind recorded on a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadKind {
    Button,
    Text,
}

impl LeadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Text => "text",
        }
    }
}

/// Normalized snapshot of one recognized inbound interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadRecord {
    pub phone: String,
    /// Profile name; empty when unknown.
    pub name: String,
    pub kind: LeadKind,
    /// Button id for button interactions.
    pub button_id: Option<String>,
    /// Button title or trimmed text body.
    pub message: String,
    /// Provider timestamp of the triggering message.
    pub received_at: Option<DateTime<Utc>>,
}

impl LeadRecord {
    /// Collector wire body. Absent fields serialize as empty strings.
    pub fn to_collector_payload(&self) -> Value {
        json!({
            "phone": self.phone,
            "name": self.name,
            "type": self.kind.as_str(),
            "button": self.button_id.as_deref().unwrap_or(""),
            "message": self.message,
        })
    }
}

/// Forwards lead records to an external collector.
#[async_trait]
pub trait LeadRecorder: Send + Sync {
    async fn record(&self, lead: &LeadRecord) -> Result<(), LeadError>;
}

/// POSTs lead records to the configured collector endpoint.
pub struct HttpLeadRecorder {
    client: reqwest::Client,
    url: String,
}

impl HttpLeadRecorder {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl LeadRecorder for HttpLeadRecorder {
    async fn record(&self, lead: &LeadRecord) -> Result<(), LeadError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&lead.to_collector_payload())
            .send()
            .await
            .map_err(|e| LeadError::Request {
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(LeadError::Rejected {
                status: resp.status().as_u16(),
            });
        }

        debug!(phone = %lead.phone, kind = lead.kind.as_str(), "lead forwarded");
        Ok(())
    }
}

/// Used when no collector is configured — logs the lead and drops it.
pub struct NoopLeadRecorder;

#[async_trait]
impl LeadRecorder for NoopLeadRecorder {
    async fn record(&self, lead: &LeadRecord) -> Result<(), LeadError> {
        info!(
            phone = %lead.phone,
            kind = lead.kind.as_str(),
            message = %lead.message,
            "no lead collector configured; lead logged only"
        );
        Ok(())
    }
}
