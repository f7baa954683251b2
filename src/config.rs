//! Configuration loaded from the environment.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default Cloud API base when `WA_API_BASE` is not set.
pub const DEFAULT_API_BASE: &str = "https://graph.facebook.com/v19.0";

/// Runtime configuration for the webhook service.
#[derive(Debug)]
pub struct AppConfig {
    /// Port the webhook server binds on.
    pub port: u16,
    /// Shared secret for the provider's subscription handshake.
    pub verify_token: SecretString,
    /// Base URL of the messaging provider's API.
    pub api_base: String,
    /// Provider id of the business phone line.
    pub phone_number_id: String,
    /// Bearer token for outbound sends.
    pub access_token: SecretString,
    /// Lead collector endpoint. Leads are logged and dropped when unset.
    pub collector_url: Option<String>,
    /// Resend the FAQ numeric menu after a PRICE/LEGAL inquiry prompt.
    pub resend_faq_after_inquiry: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// `WA_VERIFY_TOKEN`, `WA_PHONE_NUMBER_ID` and `WA_ACCESS_TOKEN` are
    /// required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port: u16 = std::env::var("LEAD_ASSIST_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let verify_token = require("WA_VERIFY_TOKEN")?;
        let api_base =
            std::env::var("WA_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let phone_number_id = require("WA_PHONE_NUMBER_ID")?;
        let access_token = require("WA_ACCESS_TOKEN")?;

        let collector_url = std::env::var("LEAD_COLLECTOR_URL")
            .ok()
            .filter(|s| !s.is_empty());

        let resend_faq_after_inquiry = std::env::var("LEAD_ASSIST_RESEND_FAQ")
            .map(|s| parse_flag(&s))
            .unwrap_or(false);

        Ok(Self {
            port,
            verify_token: SecretString::from(verify_token),
            api_base,
            phone_number_id,
            access_token: SecretString::from(access_token),
            collector_url,
            resend_faq_after_inquiry,
        })
    }
}

/// Read a required environment variable; empty counts as missing.
fn require(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Parse a boolean flag the way operators actually set them.
fn parse_flag(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
