//! Integration tests for the webhook boundary.
//!
//! Each test spins up an Axum server on a random port and exercises the
//! real HTTP contract with recording collaborator doubles.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::time::timeout;

use secrecy::SecretString;

use lead_assist::engine::{ConversationEngine, EnginePolicy};
use lead_assist::error::{LeadError, SendError};
use lead_assist::faq;
use lead_assist::leads::{LeadKind, LeadRecord, LeadRecorder};
use lead_assist::outbound::OutboundMessage;
use lead_assist::sender::MessageSender;
use lead_assist::store::ConversationStore;
use lead_assist::webhook::{WebhookState, webhook_routes};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

const VERIFY_TOKEN: &str = "lead-assist-verify-123";

// ── Collaborator doubles ────────────────────────────────────────────

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<(String, OutboundMessage)>>,
}

impl RecordingSender {
    fn messages(&self) -> Vec<(String, OutboundMessage)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, to: &str, message: &OutboundMessage) -> Result<(), SendError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), message.clone()));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingRecorder {
    leads: Mutex<Vec<LeadRecord>>,
}

impl RecordingRecorder {
    fn records(&self) -> Vec<LeadRecord> {
        self.leads.lock().unwrap().clone()
    }
}

#[async_trait]
impl LeadRecorder for RecordingRecorder {
    async fn record(&self, lead: &LeadRecord) -> Result<(), LeadError> {
        self.leads.lock().unwrap().push(lead.clone());
        Ok(())
    }
}

// ── Server bootstrap ────────────────────────────────────────────────

/// Start the webhook server on a random port; return the port plus the
/// recording doubles.
async fn start_server() -> (u16, Arc<RecordingSender>, Arc<RecordingRecorder>) {
    let store = Arc::new(ConversationStore::new());
    let sender = Arc::new(RecordingSender::default());
    let recorder = Arc::new(RecordingRecorder::default());

    let engine = Arc::new(ConversationEngine::new(
        store,
        Arc::clone(&sender) as Arc<dyn MessageSender>,
        Arc::clone(&recorder) as Arc<dyn LeadRecorder>,
        EnginePolicy::default(),
    ));
    let state = WebhookState {
        engine,
        verify_token: Arc::new(SecretString::from(VERIFY_TOKEN.to_string())),
    };
    let app = webhook_routes(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (port, sender, recorder)
}

fn webhook_url(port: u16) -> String {
    format!("http://127.0.0.1:{port}/webhook")
}

/// Provider envelope carrying one text message.
fn text_envelope(from: &str, name: &str, body: &str) -> serde_json::Value {
    envelope(
        from,
        name,
        json!({
            "from": from,
            "id": "wamid.test",
            "timestamp": "1723200000",
            "type": "text",
            "text": { "body": body },
        }),
    )
}

/// Provider envelope carrying one button reply.
fn button_envelope(from: &str, name: &str, id: &str, title: &str) -> serde_json::Value {
    envelope(
        from,
        name,
        json!({
            "from": from,
            "id": "wamid.test",
            "timestamp": "1723200000",
            "type": "interactive",
            "interactive": {
                "type": "button_reply",
                "button_reply": { "id": id, "title": title },
            },
        }),
    )
}

fn envelope(from: &str, name: &str, message: serde_json::Value) -> serde_json::Value {
    json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "123",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "metadata": { "phone_number_id": "555000111" },
                    "contacts": [{ "profile": { "name": name }, "wa_id": from }],
                    "messages": [message],
                },
            }],
        }],
    })
}

// ── Verification handshake ──────────────────────────────────────────

#[tokio::test]
async fn handshake_echoes_challenge_on_match() {
    timeout(TEST_TIMEOUT, async {
        let (port, _, _) = start_server().await;

        let resp = reqwest::get(format!(
            "{}?hub.mode=subscribe&hub.verify_token={VERIFY_TOKEN}&hub.challenge=4815162342",
            webhook_url(port)
        ))
        .await
        .unwrap();

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.text().await.unwrap(), "4815162342");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn handshake_rejects_wrong_token() {
    timeout(TEST_TIMEOUT, async {
        let (port, _, _) = start_server().await;

        let resp = reqwest::get(format!(
            "{}?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=x",
            webhook_url(port)
        ))
        .await
        .unwrap();

        assert_eq!(resp.status(), 403);
        assert!(resp.text().await.unwrap().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn handshake_rejects_wrong_mode() {
    timeout(TEST_TIMEOUT, async {
        let (port, _, _) = start_server().await;

        let resp = reqwest::get(format!(
            "{}?hub.mode=unsubscribe&hub.verify_token={VERIFY_TOKEN}&hub.challenge=x",
            webhook_url(port)
        ))
        .await
        .unwrap();

        assert_eq!(resp.status(), 403);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn handshake_rejects_missing_params() {
    timeout(TEST_TIMEOUT, async {
        let (port, _, _) = start_server().await;

        let resp = reqwest::get(webhook_url(port)).await.unwrap();
        assert_eq!(resp.status(), 403);
    })
    .await
    .expect("test timed out");
}

// ── Ingest ──────────────────────────────────────────────────────────

#[tokio::test]
async fn first_contact_gets_welcome_sequence() {
    timeout(TEST_TIMEOUT, async {
        let (port, sender, recorder) = start_server().await;
        let client = reqwest::Client::new();

        let resp = client
            .post(webhook_url(port))
            .json(&text_envelope("919800000001", "Asha", "hello"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let sent = sender.messages();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, "919800000001");
        assert_eq!(sent[0].1, faq::welcome_menu(Some("Asha")));
        assert_eq!(sent[1].1, faq::faq_numbers_menu());

        let records = recorder.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, LeadKind::Text);
        assert_eq!(records[0].name, "Asha");
        assert_eq!(records[0].message, "hello");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn button_reply_records_lead_and_prompts() {
    timeout(TEST_TIMEOUT, async {
        let (port, sender, recorder) = start_server().await;
        let client = reqwest::Client::new();

        let resp = client
            .post(webhook_url(port))
            .json(&button_envelope(
                "919800000002",
                "Ravi",
                "PRICE",
                "Check a price",
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let sent = sender.messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, faq::inquiry_prompt());

        let records = recorder.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, LeadKind::Button);
        assert_eq!(records[0].button_id.as_deref(), Some("PRICE"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn malformed_body_is_still_acknowledged() {
    timeout(TEST_TIMEOUT, async {
        let (port, sender, recorder) = start_server().await;
        let client = reqwest::Client::new();

        let resp = client
            .post(webhook_url(port))
            .header("content-type", "application/json")
            .body("this is not json")
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        assert!(sender.messages().is_empty());
        assert!(recorder.records().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn status_only_delivery_is_acknowledged_without_side_effects() {
    timeout(TEST_TIMEOUT, async {
        let (port, sender, recorder) = start_server().await;
        let client = reqwest::Client::new();

        let body = json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "123",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "statuses": [{ "id": "wamid.x", "status": "delivered" }],
                    },
                }],
            }],
        });

        let resp = client
            .post(webhook_url(port))
            .json(&body)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        assert!(sender.messages().is_empty());
        assert!(recorder.records().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn media_message_is_acknowledged_without_side_effects() {
    timeout(TEST_TIMEOUT, async {
        let (port, sender, recorder) = start_server().await;
        let client = reqwest::Client::new();

        let resp = client
            .post(webhook_url(port))
            .json(&envelope(
                "919800000003",
                "Meera",
                json!({ "from": "919800000003", "type": "image" }),
            ))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        assert!(sender.messages().is_empty());
        assert!(recorder.records().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn full_conversation_flow() {
    timeout(TEST_TIMEOUT, async {
        let (port, sender, recorder) = start_server().await;
        let client = reqwest::Client::new();
        let url = webhook_url(port);
        let user = "919800000004";

        // First contact: welcome + numeric menu.
        client
            .post(&url)
            .json(&text_envelope(user, "Asha", "hi"))
            .send()
            .await
            .unwrap();

        // Numeric selector now resolves.
        client
            .post(&url)
            .json(&text_envelope(user, "Asha", "3"))
            .send()
            .await
            .unwrap();

        // Button tap records a lead and prompts for the project.
        client
            .post(&url)
            .json(&button_envelope(user, "Asha", "LEGAL", "Legal check"))
            .send()
            .await
            .unwrap();

        let sent: Vec<OutboundMessage> = sender.messages().into_iter().map(|(_, m)| m).collect();
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[0], faq::welcome_menu(Some("Asha")));
        assert_eq!(sent[1], faq::faq_numbers_menu());
        assert!(matches!(sent[2], OutboundMessage::Text { .. }));
        assert_eq!(sent[3], faq::inquiry_prompt());

        let kinds: Vec<LeadKind> = recorder.records().iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![LeadKind::Text, LeadKind::Text, LeadKind::Button]);
    })
    .await
    .expect("test timed out");
}
