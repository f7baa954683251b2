//! Outbound message model and provider wire payloads.
//!
//! The engine produces `OutboundMessage` values; only the sender cares
//! about the Cloud API JSON they serialize into.

use serde_json::{Value, json};
use tracing::warn;

/// Provider cap on interactive reply buttons per message.
pub const MAX_BUTTONS: usize = 3;

/// An interactive reply button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub id: String,
    pub title: String,
}

impl Button {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// A structured outbound message.
///
/// When one inbound event produces several of these, they are delivered
/// sequentially in production order (the user reads them top to bottom).
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// Plain text.
    Text { body: String },
    /// Interactive menu with up to [`MAX_BUTTONS`] reply buttons.
    ButtonMenu { body: String, buttons: Vec<Button> },
    /// Interactive call-to-action link.
    LinkAction {
        body: String,
        url_text: String,
        url: String,
    },
}

impl OutboundMessage {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text { body: body.into() }
    }

    /// Build a button menu, truncating to the provider cap.
    pub fn button_menu(body: impl Into<String>, mut buttons: Vec<Button>) -> Self {
        if buttons.len() > MAX_BUTTONS {
            warn!(
                count = buttons.len(),
                "button menu exceeds provider cap; truncating"
            );
            buttons.truncate(MAX_BUTTONS);
        }
        Self::ButtonMenu {
            body: body.into(),
            buttons,
        }
    }

    pub fn link_action(
        body: impl Into<String>,
        url_text: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::LinkAction {
            body: body.into(),
            url_text: url_text.into(),
            url: url.into(),
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::ButtonMenu { .. } => "button_menu",
            Self::LinkAction { .. } => "link_action",
        }
    }

    /// Serialize into the provider's message payload, addressed to `to`.
    pub fn to_provider_payload(&self, to: &str) -> Value {
        match self {
            Self::Text { body } => json!({
                "messaging_product": "whatsapp",
                "to": to,
                "type": "text",
                "text": { "body": body },
            }),
            Self::ButtonMenu { body, buttons } => {
                let buttons: Vec<Value> = buttons
                    .iter()
                    .map(|b| {
                        json!({
                            "type": "reply",
                            "reply": { "id": b.id, "title": b.title },
                        })
                    })
                    .collect();
                json!({
                    "messaging_product": "whatsapp",
                    "to": to,
                    "type": "interactive",
                    "interactive": {
                        "type": "button",
                        "body": { "text": body },
                        "action": { "buttons": buttons },
                    },
                })
            }
            Self::LinkAction {
                body,
                url_text,
                url,
            } => json!({
                "messaging_product": "whatsapp",
                "to": to,
                "type": "interactive",
                "interactive": {
                    "type": "cta_url",
                    "body": { "text": body },
                    "action": {
                        "name": "cta_url",
                        "parameters": { "display_text": url_text, "url": url },
                    },
                },
            }),
        }
    }
}
