//! Dual-engine transcription orchestration
//!
//! The primary engine runs first with low-latency decoding; the
//! fallback is strictly a correctness fallback, never run
//! speculatively, so resource use stays bounded on constrained hosts.

use std::sync::Arc;

use tokio::sync::{OnceCell, Semaphore};

use super::{DecodeOptions, GatePolicy, HttpEngine, SpeechEngine, Transcript, Verdict};
use crate::config::{EngineConfig, SttConfig};
use crate::{Error, Result};

/// Lazily-initialized shared engine
///
/// The engine behind a handle is a process-wide resource; the init
/// guard makes model load idempotent under concurrent first use. A
/// failed init leaves the cell empty so the next call retries.
pub struct EngineHandle {
    name: String,
    config: Option<EngineConfig>,
    cell: OnceCell<Arc<dyn SpeechEngine>>,
}

impl EngineHandle {
    /// Handle that will construct and warm up an HTTP engine on first use
    #[must_use]
    pub fn new(name: impl Into<String>, config: EngineConfig) -> Self {
        Self {
            name: name.into(),
            config: Some(config),
            cell: OnceCell::new(),
        }
    }

    /// Handle wrapping an already-constructed engine (used by tests and
    /// embedders that manage engine lifetime themselves)
    #[must_use]
    pub fn with_engine(name: impl Into<String>, engine: Arc<dyn SpeechEngine>) -> Self {
        Self {
            name: name.into(),
            config: None,
            cell: OnceCell::new_with(Some(engine)),
        }
    }

    /// Get the engine, initializing it exactly once
    async fn get(&self) -> Result<Arc<dyn SpeechEngine>> {
        let engine = self
            .cell
            .get_or_try_init(|| async {
                let config = self
                    .config
                    .as_ref()
                    .ok_or_else(|| Error::Config(format!("engine {} has no config", self.name)))?;

                let engine = HttpEngine::new(&self.name, config)?;
                engine.warm_up().await?;
                tracing::info!(engine = %self.name, url = %config.url, "engine loaded");
                Ok::<Arc<dyn SpeechEngine>, Error>(Arc::new(engine))
            })
            .await?;

        Ok(Arc::clone(engine))
    }
}

/// Outcome of a single engine attempt
enum Attempt {
    Accepted(Transcript),
    Rejected(Verdict),
}

/// Drives one or two engines and gates their output
pub struct Orchestrator {
    primary: Option<EngineHandle>,
    fallback: EngineHandle,
    gate: GatePolicy,
    options: DecodeOptions,
    permits: Semaphore,
}

impl Orchestrator {
    /// Build an orchestrator from transcription config
    #[must_use]
    pub fn new(config: &SttConfig) -> Self {
        Self {
            primary: config
                .primary
                .clone()
                .map(|c| EngineHandle::new("primary", c)),
            fallback: EngineHandle::new("fallback", config.fallback.clone()),
            gate: config.gate.clone(),
            options: DecodeOptions::default(),
            permits: Semaphore::new(config.workers.max(1)),
        }
    }

    /// Build an orchestrator over pre-constructed engines
    #[must_use]
    pub fn with_engines(
        primary: Option<Arc<dyn SpeechEngine>>,
        fallback: Arc<dyn SpeechEngine>,
        gate: GatePolicy,
        workers: usize,
    ) -> Self {
        Self {
            primary: primary.map(|e| EngineHandle::with_engine("primary", e)),
            fallback: EngineHandle::with_engine("fallback", fallback),
            gate,
            options: DecodeOptions::default(),
            permits: Semaphore::new(workers.max(1)),
        }
    }

    /// Transcribe WAV audio to a gated transcript
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSpeech`] when every configured engine either
    /// raised or produced output the quality gate rejected
    pub async fn transcribe(&self, wav: &[u8]) -> Result<Transcript> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| Error::Engine("transcription pool closed".to_string()))?;

        let mut last_verdict = None;

        if let Some(handle) = &self.primary {
            match self.attempt(handle, wav).await {
                Ok(Attempt::Accepted(transcript)) => return Ok(transcript),
                Ok(Attempt::Rejected(verdict)) => last_verdict = Some(verdict),
                Err(e) => {
                    tracing::warn!(error = %e, "primary engine failed, trying fallback");
                }
            }
        }

        match self.attempt(&self.fallback, wav).await {
            Ok(Attempt::Accepted(transcript)) => Ok(transcript),
            Ok(Attempt::Rejected(verdict)) => Err(Error::NoSpeech {
                reason: Some(verdict),
            }),
            Err(e) => {
                tracing::warn!(error = %e, "fallback engine failed");
                Err(Error::NoSpeech {
                    reason: last_verdict,
                })
            }
        }
    }

    /// Run one engine and gate its reduced output
    async fn attempt(&self, handle: &EngineHandle, wav: &[u8]) -> Result<Attempt> {
        let engine = handle.get().await?;
        let segments = engine.transcribe(wav, &self.options).await?;
        let transcript = Transcript::reduce(&segments);
        let verdict = self.gate.evaluate(&transcript.text);

        if verdict.is_accept() {
            tracing::info!(
                engine = engine.name(),
                text = %transcript.text,
                confidence = transcript.mean_confidence,
                "transcript accepted"
            );
            Ok(Attempt::Accepted(transcript))
        } else {
            tracing::warn!(
                engine = engine.name(),
                verdict = verdict.reason(),
                text = %transcript.text,
                "transcript rejected by quality gate"
            );
            Ok(Attempt::Rejected(verdict))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::transcribe::TranscriptSegment;

    /// Engine returning a fixed script, counting invocations
    struct ScriptedEngine {
        name: &'static str,
        result: std::result::Result<Vec<&'static str>, &'static str>,
        calls: AtomicUsize,
    }

    impl ScriptedEngine {
        fn ok(name: &'static str, segments: &[&'static str]) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Ok(segments.to_vec()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str, message: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Err(message),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SpeechEngine for ScriptedEngine {
        async fn transcribe(
            &self,
            _wav: &[u8],
            _options: &DecodeOptions,
        ) -> Result<Vec<TranscriptSegment>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(texts) => Ok(texts
                    .iter()
                    .map(|t| TranscriptSegment {
                        text: (*t).to_string(),
                        confidence: Some(0.9),
                    })
                    .collect()),
                Err(message) => Err(Error::Engine((*message).to_string())),
            }
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn orchestrator(
        primary: Option<Arc<ScriptedEngine>>,
        fallback: Arc<ScriptedEngine>,
    ) -> Orchestrator {
        Orchestrator::with_engines(
            primary.map(|e| e as Arc<dyn SpeechEngine>),
            fallback as Arc<dyn SpeechEngine>,
            GatePolicy::default(),
            2,
        )
    }

    #[tokio::test]
    async fn test_primary_accepted_without_fallback() {
        let primary = ScriptedEngine::ok("primary", &["open the browser"]);
        let fallback = ScriptedEngine::ok("fallback", &["should not run"]);

        let result = orchestrator(Some(Arc::clone(&primary)), Arc::clone(&fallback))
            .transcribe(b"wav")
            .await
            .unwrap();

        assert_eq!(result.text, "open the browser");
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_repetitive_primary_falls_back() {
        let primary = ScriptedEngine::ok("primary", &["the the", "the the"]);
        let fallback = ScriptedEngine::ok("fallback", &["open the calculator"]);

        let result = orchestrator(Some(Arc::clone(&primary)), Arc::clone(&fallback))
            .transcribe(b"wav")
            .await
            .unwrap();

        assert_eq!(result.text, "open the calculator");
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_erroring_primary_falls_back() {
        let primary = ScriptedEngine::failing("primary", "connection refused");
        let fallback = ScriptedEngine::ok("fallback", &["what time is it"]);

        let result = orchestrator(Some(primary), Arc::clone(&fallback))
            .transcribe(b"wav")
            .await
            .unwrap();

        assert_eq!(result.text, "what time is it");
    }

    #[tokio::test]
    async fn test_both_gated_is_no_speech_with_reason() {
        let primary = ScriptedEngine::ok("primary", &["the the the the"]);
        let fallback = ScriptedEngine::ok("fallback", &["uh uh uh uh uh"]);

        let err = orchestrator(Some(primary), fallback)
            .transcribe(b"wav")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::NoSpeech {
                reason: Some(Verdict::TooRepetitive)
            }
        ));
    }

    #[tokio::test]
    async fn test_fallback_error_keeps_primary_verdict() {
        let primary = ScriptedEngine::ok("primary", &[""]);
        let fallback = ScriptedEngine::failing("fallback", "timeout");

        let err = orchestrator(Some(primary), fallback)
            .transcribe(b"wav")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::NoSpeech {
                reason: Some(Verdict::Empty)
            }
        ));
    }

    #[tokio::test]
    async fn test_no_primary_goes_straight_to_fallback() {
        let fallback = ScriptedEngine::ok("fallback", &["hello there"]);

        let result = orchestrator(None, Arc::clone(&fallback))
            .transcribe(b"wav")
            .await
            .unwrap();

        assert_eq!(result.text, "hello there");
        assert_eq!(fallback.calls(), 1);
    }
}
