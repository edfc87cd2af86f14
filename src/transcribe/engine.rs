//! HTTP client for a local recognizer service
//!
//! Each engine is a faster-whisper-style service on the local network:
//! audio goes up as multipart WAV, ordered segments come back as JSON.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{DecodeOptions, SpeechEngine, TranscriptSegment};
use crate::config::EngineConfig;
use crate::{Error, Result};

/// Response from the recognizer service
#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    segments: Vec<TranscriptSegment>,
}

/// Recognizer service client
pub struct HttpEngine {
    client: reqwest::Client,
    base_url: String,
    model: String,
    name: String,
}

impl HttpEngine {
    /// Create a client for one recognizer endpoint
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be constructed
    pub fn new(name: &str, config: &EngineConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Engine(format!("cannot build engine client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            name: name.to_string(),
        })
    }

    /// Warm up the engine
    ///
    /// Asks the service to load its model weights; called once behind
    /// the engine handle's init guard.
    ///
    /// # Errors
    ///
    /// Returns error if the service is unreachable or reports a failure
    pub async fn warm_up(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Engine(format!("{} unreachable: {e}", self.name)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Engine(format!(
                "{} health check failed: {status}",
                self.name
            )));
        }

        tracing::debug!(engine = %self.name, "engine warmed up");
        Ok(())
    }
}

#[async_trait]
impl SpeechEngine for HttpEngine {
    async fn transcribe(
        &self,
        wav: &[u8],
        options: &DecodeOptions,
    ) -> Result<Vec<TranscriptSegment>> {
        tracing::debug!(
            engine = %self.name,
            audio_bytes = wav.len(),
            beam_size = options.beam_size,
            "starting transcription"
        );

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(wav.to_vec())
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Engine(e.to_string()))?,
            )
            .text("model", self.model.clone())
            .text("language", options.language.clone())
            .text("beam_size", options.beam_size.to_string())
            .text("temperature", options.temperature.to_string())
            .text(
                "condition_on_previous_text",
                options.condition_on_previous_text.to_string(),
            );

        let url = format!("{}/transcribe", self.base_url);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(engine = %self.name, error = %e, "engine request failed");
                Error::Engine(format!("{} request failed: {e}", self.name))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(engine = %self.name, status = %status, body = %body, "engine error");
            return Err(Error::Engine(format!(
                "{} returned {status}: {body}",
                self.name
            )));
        }

        let result: RecognizeResponse = response.json().await.map_err(|e| {
            tracing::error!(engine = %self.name, error = %e, "cannot parse engine response");
            Error::Engine(format!("{} sent an unparseable response: {e}", self.name))
        })?;

        tracing::debug!(
            engine = %self.name,
            segments = result.segments.len(),
            "transcription complete"
        );
        Ok(result.segments)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
