//! FAQ topics, canned answers, and menu templates.

use crate::outbound::{Button, OutboundMessage};

/// Button ids on the welcome menu.
pub const BUTTON_PRICE: &str = "PRICE";
pub const BUTTON_LEGAL: &str = "LEGAL";
pub const BUTTON_FAQ: &str = "FAQ";

/// FAQ page linked from the fallback answer.
const FAQ_URL: &str = "https://www.propcheck.in/faq";

/// FAQ topics, addressable by topic id or numeric selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaqTopic {
    What,
    Why,
    Free,
    Coverage,
}

impl FaqTopic {
    /// Resolve a button id (named or numeric) to a topic.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "WHAT" => Some(Self::What),
            "WHY" => Some(Self::Why),
            "FREE" => Some(Self::Free),
            "COVER" => Some(Self::Coverage),
            _ => Self::from_selector(key),
        }
    }

    /// Resolve a numeric selector typed by the user. Only the literal
    /// strings "1" through "4" match; anything else is silently ignored
    /// by the caller.
    pub fn from_selector(body: &str) -> Option<Self> {
        match body {
            "1" => Some(Self::What),
            "2" => Some(Self::Why),
            "3" => Some(Self::Free),
            "4" => Some(Self::Coverage),
            _ => None,
        }
    }

    /// Canned answer text for this topic.
    pub fn answer(&self) -> &'static str {
        match self {
            Self::What => {
                "We run independent checks on residential projects — price \
                 benchmarks against recent transactions, plus legal title and \
                 approval status — so you know what you are buying before you pay."
            }
            Self::Why => {
                "Most buyers discover pricing or title problems only after \
                 booking. Checking before you commit costs you nothing and can \
                 save the entire booking amount."
            }
            Self::Free => {
                "Price and legal checks are free for individual home buyers. \
                 Reports are usually ready within two working days."
            }
            Self::Coverage => {
                "We currently cover projects in Bengaluru, Pune and Hyderabad, \
                 and add cities based on demand. Send us your project's city and \
                 we will confirm."
            }
        }
    }
}

// ── Message templates ───────────────────────────────────────────────

/// Interactive welcome menu, personalized when the profile name is known.
pub fn welcome_menu(name: Option<&str>) -> OutboundMessage {
    let greeting = match name {
        Some(n) => format!(
            "Hi {n}! I can help you verify a property before you buy. \
             What would you like to check?"
        ),
        None => "Hi! I can help you verify a property before you buy. \
                 What would you like to check?"
            .to_string(),
    };
    OutboundMessage::button_menu(
        greeting,
        vec![
            Button::new(BUTTON_PRICE, "Check a price"),
            Button::new(BUTTON_LEGAL, "Legal check"),
            Button::new(BUTTON_FAQ, "FAQs"),
        ],
    )
}

/// Text menu listing the numeric FAQ selectors.
pub fn faq_numbers_menu() -> OutboundMessage {
    OutboundMessage::text(
        "You can also reply with a number:\n\
         1. What does the service do?\n\
         2. Why check before buying?\n\
         3. Is it free?\n\
         4. Which cities are covered?",
    )
}

/// Prompt sent after a PRICE or LEGAL button tap.
pub fn inquiry_prompt() -> OutboundMessage {
    OutboundMessage::text(
        "Great — share the project name or its location and we will start the check.",
    )
}

/// Fallback for FAQ keys we do not recognize.
pub fn faq_fallback() -> OutboundMessage {
    OutboundMessage::link_action(
        "We may already answer that on our site.",
        "Browse FAQs",
        FAQ_URL,
    )
}

/// Canned answer for a button key: a known topic's text, or the generic
/// fallback for ids we do not recognize.
pub fn answer_for(key: &str) -> OutboundMessage {
    match FaqTopic::from_key(key) {
        Some(topic) => OutboundMessage::text(topic.answer()),
        None => faq_fallback(),
    }
}
