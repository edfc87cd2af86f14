//! End-to-end voice pipeline
//!
//! One pipeline instance is shared across requests; per-request state
//! is limited to the clip being processed. Recognized commands
//! short-circuit before the gateway is ever contacted.

use serde::Serialize;

use crate::audio::{AudioClip, Preprocessor};
use crate::command::{self, ParsedCommand};
use crate::config::Config;
use crate::gateway::{Answer, GatewayClient};
use crate::launcher::Launcher;
use crate::transcribe::Orchestrator;
use crate::Result;

/// Reply for one processed clip
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReply {
    /// Answer text or action result message
    pub text: String,
    /// The recognized utterance
    pub question: String,
}

/// Outcome of running command-only text
#[derive(Debug, Clone)]
pub enum ExecOutcome {
    /// A command was recognized and its launch succeeded
    Launched { message: String },
    /// A command was recognized but could not be carried out
    Failed { message: String },
    /// The text is not an app or website command
    Unrecognized { text: String },
}

/// Shared voice processing pipeline
pub struct VoicePipeline {
    preprocessor: Preprocessor,
    orchestrator: Orchestrator,
    gateway: GatewayClient,
    launcher: Launcher,
}

impl VoicePipeline {
    /// Build the pipeline from configuration
    ///
    /// # Errors
    ///
    /// Returns error if a client cannot be constructed
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            preprocessor: Preprocessor::new(config.audio.clone()),
            orchestrator: Orchestrator::new(&config.stt),
            gateway: GatewayClient::new(&config.gateway)?,
            launcher: Launcher::new(),
        })
    }

    /// Build a pipeline over pre-constructed components
    #[must_use]
    pub const fn with_components(
        preprocessor: Preprocessor,
        orchestrator: Orchestrator,
        gateway: GatewayClient,
        launcher: Launcher,
    ) -> Self {
        Self {
            preprocessor,
            orchestrator,
            gateway,
            launcher,
        }
    }

    /// Process one uploaded clip end to end
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidAudio`] before any engine runs,
    /// or [`crate::Error::NoSpeech`] when transcription is exhausted
    pub async fn handle_clip(&self, clip: AudioClip) -> Result<PipelineReply> {
        self.preprocessor.validate(&clip)?;

        let wav = match self.preprocessor.normalize(&clip).await {
            Ok(normalized) => normalized.wav,
            Err(e) => {
                // Conversion is an optimization, not a precondition
                tracing::warn!(error = %e, "conversion failed, transcribing raw clip");
                clip.data
            }
        };

        let transcript = self.orchestrator.transcribe(&wav).await?;
        Ok(self.dispatch(transcript.text).await)
    }

    /// Route recognized text to an action or the gateway
    pub async fn dispatch(&self, text: String) -> PipelineReply {
        match command::parse(&text) {
            ParsedCommand::Website { url, label } => {
                let outcome = self.launcher.open_url(&url, &label);
                PipelineReply {
                    text: outcome.message,
                    question: text,
                }
            }
            ParsedCommand::App { name } => {
                let outcome = self.launcher.launch(&name);
                PipelineReply {
                    text: outcome.message,
                    question: text,
                }
            }
            ParsedCommand::Unrecognized { .. } => {
                // Ask with the transcript as recognized, not the
                // normalized parser input
                let answer = self.gateway.ask(&text).await;
                if !answer.ok {
                    tracing::info!(detail = %answer.text, "gateway unavailable");
                }
                PipelineReply {
                    text: answer.text,
                    question: text,
                }
            }
        }
    }

    /// Run command-only text without transcription
    #[must_use]
    pub fn execute(&self, text: &str) -> ExecOutcome {
        match command::parse(text) {
            ParsedCommand::Website { url, label } => {
                let outcome = self.launcher.open_url(&url, &label);
                if outcome.ok {
                    ExecOutcome::Launched {
                        message: outcome.message,
                    }
                } else {
                    ExecOutcome::Failed {
                        message: outcome.message,
                    }
                }
            }
            ParsedCommand::App { name } => {
                let outcome = self.launcher.launch(&name);
                if outcome.ok {
                    ExecOutcome::Launched {
                        message: outcome.message,
                    }
                } else {
                    ExecOutcome::Failed {
                        message: outcome.message,
                    }
                }
            }
            ParsedCommand::Unrecognized { text } => ExecOutcome::Unrecognized { text },
        }
    }

    /// Ask the gateway a text question directly
    pub async fn ask(&self, question: &str) -> Answer {
        self.gateway.ask(question).await
    }
}
