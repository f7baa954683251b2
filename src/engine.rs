//! Conversation engine — decides replies and state updates per inbound event.
//!
//! The decision table lives in [`plan`], a pure function over the event
//! and the sender's state; [`ConversationEngine::handle`] owns the
//! per-user lock and the collaborator I/O around it. Collaborator
//! failures are logged and swallowed — nothing here may prevent the
//! webhook from acknowledging the delivery.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::faq::{self, BUTTON_FAQ, BUTTON_LEGAL, BUTTON_PRICE, FaqTopic};
use crate::inbound::{EventKind, InboundEvent};
use crate::leads::{LeadKind, LeadRecord, LeadRecorder};
use crate::outbound::OutboundMessage;
use crate::sender::MessageSender;
use crate::store::{ConversationState, ConversationStore};

/// Behavioral switches for the dispatch rules.
#[derive(Debug, Clone, Default)]
pub struct EnginePolicy {
    /// Resend the FAQ numeric menu after a PRICE/LEGAL inquiry prompt.
    pub resend_faq_after_inquiry: bool,
}

/// What one inbound event produces: an optional lead plus ordered replies.
#[derive(Debug)]
pub struct ResponsePlan {
    pub lead: Option<LeadRecord>,
    pub replies: Vec<OutboundMessage>,
}

/// Decide the replies and state update for one event.
///
/// Precedence: unrecognized events short-circuit with no side effects;
/// the profile name is captured before any branch; a user's first text
/// message triggers the welcome sequence and fully pre-empts numeric
/// FAQ lookup, even when the body happens to be a selector.
///
/// Callers must hold the sender's state lock — `state` is mutated in
/// place and the mutation commits when the lock is released.
pub fn plan(
    event: &InboundEvent,
    state: &mut ConversationState,
    policy: &EnginePolicy,
) -> ResponsePlan {
    let (lead_kind, button_id, message) = match &event.kind {
        EventKind::Unrecognized => {
            return ResponsePlan {
                lead: None,
                replies: Vec::new(),
            };
        }
        EventKind::ButtonReply { id, title } => (LeadKind::Button, Some(id.clone()), title.clone()),
        EventKind::Text { body } => (LeadKind::Text, None, body.clone()),
    };

    if let Some(name) = event.profile_name.as_deref() {
        state.set_name_if_absent(name);
    }

    let lead = Some(LeadRecord {
        phone: event.sender.clone(),
        name: state.display_name.clone().unwrap_or_default(),
        kind: lead_kind,
        button_id,
        message,
        received_at: event.received_at,
    });

    let mut replies = Vec::new();
    match &event.kind {
        EventKind::ButtonReply { id, .. } => match id.as_str() {
            BUTTON_PRICE | BUTTON_LEGAL => {
                replies.push(faq::inquiry_prompt());
                if policy.resend_faq_after_inquiry {
                    replies.push(faq::faq_numbers_menu());
                }
            }
            BUTTON_FAQ => replies.push(faq::faq_numbers_menu()),
            other => replies.push(faq::answer_for(other)),
        },
        EventKind::Text { body } => {
            if !state.welcomed {
                // First-message gate: welcome strictly precedes the
                // numeric menu, and both pre-empt selector lookup.
                state.welcomed = true;
                replies.push(faq::welcome_menu(state.display_name.as_deref()));
                replies.push(faq::faq_numbers_menu());
            } else if let Some(topic) = FaqTopic::from_selector(body) {
                replies.push(OutboundMessage::text(topic.answer()));
            }
        }
        EventKind::Unrecognized => unreachable!("handled above"),
    }

    ResponsePlan { lead, replies }
}

/// Drives the dispatch rules against the store and collaborators.
pub struct ConversationEngine {
    store: Arc<ConversationStore>,
    sender: Arc<dyn MessageSender>,
    recorder: Arc<dyn LeadRecorder>,
    policy: EnginePolicy,
}

impl ConversationEngine {
    pub fn new(
        store: Arc<ConversationStore>,
        sender: Arc<dyn MessageSender>,
        recorder: Arc<dyn LeadRecorder>,
        policy: EnginePolicy,
    ) -> Self {
        Self {
            store,
            sender,
            recorder,
            policy,
        }
    }

    /// Handle one normalized inbound event end to end.
    ///
    /// Holds the sender's state lock for the whole call, so overlapping
    /// deliveries for one user serialize. Replies go out sequentially,
    /// each awaited, to preserve read order on the user's device.
    pub async fn handle(&self, event: InboundEvent) {
        if matches!(event.kind, EventKind::Unrecognized) {
            // No state row, no lead, no reply.
            debug!(sender = %event.sender, "unrecognized event kind; acknowledging only");
            return;
        }

        let entry = self.store.entry(&event.sender).await;
        let mut state = entry.lock().await;
        let plan = plan(&event, &mut state, &self.policy);

        if let Some(ref lead) = plan.lead {
            if let Err(e) = self.recorder.record(lead).await {
                error!(sender = %event.sender, error = %e, "lead recording failed");
            }
        }

        for reply in &plan.replies {
            if let Err(e) = self.sender.send(&event.sender, reply).await {
                error!(
                    sender = %event.sender,
                    kind = reply.label(),
                    error = %e,
                    "outbound send failed"
                );
            }
        }

        info!(
            sender = %event.sender,
            replies = plan.replies.len(),
            welcomed = state.welcomed,
            "inbound event handled"
        );
    }
}
