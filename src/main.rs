use std::sync::Arc;

use anyhow::Context;
use tower_http::trace::TraceLayer;

use lead_assist::config::AppConfig;
use lead_assist::engine::{ConversationEngine, EnginePolicy};
use lead_assist::leads::{HttpLeadRecorder, LeadRecorder, NoopLeadRecorder};
use lead_assist::sender::CloudApiSender;
use lead_assist::store::ConversationStore;
use lead_assist::webhook::{WebhookState, webhook_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  required: WA_VERIFY_TOKEN, WA_PHONE_NUMBER_ID, WA_ACCESS_TOKEN");
        std::process::exit(1);
    });

    eprintln!("💬 Lead Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Webhook: http://0.0.0.0:{}/webhook", config.port);
    eprintln!(
        "   Provider: {} (line {})",
        config.api_base, config.phone_number_id
    );
    eprintln!(
        "   Lead collector: {}",
        config.collector_url.as_deref().unwrap_or("disabled (log only)")
    );
    eprintln!(
        "   FAQ resend after inquiry: {}\n",
        if config.resend_faq_after_inquiry {
            "on"
        } else {
            "off"
        }
    );

    let store = Arc::new(ConversationStore::new());
    let sender = Arc::new(CloudApiSender::new(
        config.api_base.clone(),
        config.phone_number_id.clone(),
        config.access_token,
    ));
    let recorder: Arc<dyn LeadRecorder> = match config.collector_url {
        Some(url) => Arc::new(HttpLeadRecorder::new(url)),
        None => Arc::new(NoopLeadRecorder),
    };

    let engine = Arc::new(ConversationEngine::new(
        store,
        sender,
        recorder,
        EnginePolicy {
            resend_faq_after_inquiry: config.resend_faq_after_inquiry,
        },
    ));

    let state = WebhookState {
        engine,
        verify_token: Arc::new(config.verify_token),
    };
    let app = webhook_routes(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "webhook server started");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
