//! Herald Gateway - voice command gateway for local assistants
//!
//! This library turns a spoken clip into an executed command or an
//! answered question:
//! - Audio validation and speech-band normalization
//! - Dual-engine transcription with quality gating
//! - Priority-ordered command parsing
//! - Defensive decoding of the text-generation gateway's replies
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                HTTP ingress (axum)                │
//! │   /transcribe  │  /api/execute  │  /ask          │
//! └───────────────────────┬──────────────────────────┘
//!                         │
//! ┌───────────────────────▼──────────────────────────┐
//! │                  VoicePipeline                    │
//! │  Preprocessor → Orchestrator → CommandParser     │
//! └───────┬───────────────────┬──────────────┬───────┘
//!         │                   │              │
//!    recognizer          text-generation   launcher
//!    services (HTTP)     gateway (HTTP)    (OS)
//! ```

pub mod api;
pub mod audio;
pub mod command;
pub mod config;
pub mod error;
pub mod gateway;
pub mod launcher;
pub mod pipeline;
pub mod transcribe;

pub use config::Config;
pub use error::{Error, InvalidAudio, Result};
pub use pipeline::{PipelineReply, VoicePipeline};
