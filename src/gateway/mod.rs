//! Text-generation gateway client
//!
//! The gateway answers free-form questions. Its reply format varies by
//! version and configuration, so everything that comes back goes
//! through the defensive decoder. Unavailability is a transport
//! concern: it short-circuits decoding entirely and is folded into the
//! answer so callers can render a graceful message.

mod decode;

pub use decode::decode_bytes;

use std::time::Duration;

use serde::Serialize;

use crate::config::GatewayConfig;
use crate::{Error, Result};

/// Decoded gateway reply
///
/// `ok = false` means the gateway was unreachable or returned an
/// unusable status; the text then carries a bracketed diagnostic
/// suitable for display.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Answer {
    /// Best-effort answer text
    pub text: String,
    /// Whether the gateway actually answered
    pub ok: bool,
}

impl Answer {
    fn unavailable(detail: impl std::fmt::Display) -> Self {
        Self {
            text: format!("[gateway unavailable: {detail}]"),
            ok: false,
        }
    }
}

/// Generation request body
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
}

/// Client for the text-generation gateway
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl GatewayClient {
    /// Create a gateway client
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be constructed
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("cannot build gateway client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Ask the gateway a free-form question
    ///
    /// Never fails: transport problems come back as an unavailable
    /// answer, and any reply body decodes to a best-effort string.
    /// Failed calls are not retried; the caller decides whether to.
    pub async fn ask(&self, question: &str) -> Answer {
        let request = GenerateRequest {
            model: &self.model,
            prompt: format!(
                "You are a helpful assistant. Answer concisely:\n\n{question}"
            ),
        };

        let url = format!("{}/api/generate", self.base_url);
        tracing::debug!(model = %self.model, "asking gateway");

        let response = match self.client.post(&url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "gateway request failed");
                return Answer::unavailable(e);
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = %status, "gateway returned unusable status");
            return Answer::unavailable(status);
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "gateway reply truncated");
                return Answer::unavailable(e);
            }
        };

        let text = decode_bytes(&body);
        tracing::debug!(answer_len = text.len(), "gateway answered");
        Answer { text, ok: true }
    }
}
