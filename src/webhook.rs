//! HTTP boundary — provider handshake and event ingest.
//!
//! Policy: the provider must never see a non-200 for a delivery it made,
//! or it will redeliver. The only non-200 in the whole service is the
//! 403 on a failed subscription handshake.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::engine::ConversationEngine;
use crate::inbound;

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct WebhookState {
    pub engine: Arc<ConversationEngine>,
    pub verify_token: Arc<SecretString>,
}

/// Query parameters of the provider's subscription handshake.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

/// GET /webhook — subscription handshake.
///
/// Echoes the challenge with 200 when the mode is "subscribe" and the
/// token matches; 403 with an empty body otherwise.
async fn verify(
    State(state): State<WebhookState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    let token_matches =
        params.verify_token.as_deref() == Some(state.verify_token.expose_secret());

    if params.mode.as_deref() == Some("subscribe") && token_matches {
        info!("webhook subscription verified");
        (StatusCode::OK, params.challenge.unwrap_or_default()).into_response()
    } else {
        warn!(
            mode = params.mode.as_deref().unwrap_or(""),
            "webhook verification rejected"
        );
        StatusCode::FORBIDDEN.into_response()
    }
}

/// POST /webhook — inbound event ingest. Always acknowledges 200.
///
/// The body is read as raw bytes and parsed leniently: a `Json`
/// extractor would turn malformed payloads into a 400, which the
/// always-acknowledge policy forbids.
async fn ingest(State(state): State<WebhookState>, body: Bytes) -> StatusCode {
    let envelope = match inbound::parse_envelope(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "unparseable webhook body; acknowledging anyway");
            return StatusCode::OK;
        }
    };

    match inbound::normalize(&envelope) {
        Some(event) => {
            debug!(sender = %event.sender, "inbound event received");
            state.engine.handle(event).await;
        }
        None => debug!("delivery carried no message; acknowledging"),
    }

    StatusCode::OK
}

/// Build the webhook routes.
pub fn webhook_routes(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", get(verify).post(ingest))
        .with_state(state)
}
