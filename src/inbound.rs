//! Inbound webhook envelope parsing and event normalization.
//!
//! The provider wraps every delivery in `entry[0].changes[0].value`;
//! status callbacks and read receipts arrive through the same endpoint
//! with no `messages` array, so "no message in this delivery" is a
//! normal outcome, not an error.

use chrono::{DateTime, Utc};
use serde::Deserialize;

// ── Envelope model ──────────────────────────────────────────────────

/// Top-level webhook delivery envelope.
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
pub struct Change {
    pub value: Option<ChangeValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<RawMessage>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

#[derive(Debug, Deserialize)]
pub struct Contact {
    pub profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub name: Option<String>,
}

/// One message object as delivered by the provider.
#[derive(Debug, Deserialize)]
pub struct RawMessage {
    pub from: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Unix seconds, as a string.
    pub timestamp: Option<String>,
    pub text: Option<TextBody>,
    pub interactive: Option<Interactive>,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct Interactive {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub button_reply: Option<ButtonReplyBody>,
}

#[derive(Debug, Deserialize)]
pub struct ButtonReplyBody {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
}

// ── Normalized event ────────────────────────────────────────────────

/// A normalized inbound event.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    /// Opaque sender id (the user's phone number).
    pub sender: String,
    /// Profile name from the envelope's contact block, when present.
    pub profile_name: Option<String>,
    /// Provider timestamp of the message, when parseable.
    pub received_at: Option<DateTime<Utc>>,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// The user tapped a reply button we previously sent.
    ButtonReply { id: String, title: String },
    /// A plain text message (body is trimmed).
    Text { body: String },
    /// Media, location, unsupported interactive subtypes. Acknowledged
    /// with no further processing.
    Unrecognized,
}

/// Parse the raw request body into the provider envelope.
pub fn parse_envelope(raw: &[u8]) -> Result<WebhookEnvelope, serde_json::Error> {
    serde_json::from_slice(raw)
}

/// Extract the first message from the envelope as a normalized event.
///
/// Returns `None` when the delivery carries no message (status updates,
/// read receipts) or when the message has no sender. Missing optional
/// fields never fail normalization.
pub fn normalize(envelope: &WebhookEnvelope) -> Option<InboundEvent> {
    let value = envelope
        .entry
        .first()?
        .changes
        .first()?
        .value
        .as_ref()?;

    let message = value.messages.first()?;
    let sender = message.from.clone().filter(|s| !s.is_empty())?;

    let profile_name = value
        .contacts
        .first()
        .and_then(|c| c.profile.as_ref())
        .and_then(|p| p.name.clone())
        .filter(|n| !n.is_empty());

    let received_at = message
        .timestamp
        .as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0));

    let kind = match message.kind.as_deref() {
        Some("interactive") => match message.interactive.as_ref() {
            Some(i) if i.kind.as_deref() == Some("button_reply") => match i.button_reply.as_ref() {
                Some(reply) => EventKind::ButtonReply {
                    id: reply.id.clone(),
                    title: reply.title.clone(),
                },
                None => EventKind::Unrecognized,
            },
            _ => EventKind::Unrecognized,
        },
        Some("text") => EventKind::Text {
            body: message
                .text
                .as_ref()
                .map(|t| t.body.trim().to_string())
                .unwrap_or_default(),
        },
        _ => EventKind::Unrecognized,
    };

    Some(InboundEvent {
        sender,
        profile_name,
        received_at,
        kind,
    })
}
