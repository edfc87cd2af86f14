//! Configuration management for Herald gateway
//!
//! Configuration is layered: compiled defaults, then an optional TOML
//! file, then environment variable overrides.

use std::path::Path;

use serde::Deserialize;

use crate::transcribe::GatePolicy;
use crate::{Error, Result};

/// Herald gateway configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Audio validation and conversion settings
    pub audio: AudioConfig,

    /// Transcription engine settings
    pub stt: SttConfig,

    /// Text-generation gateway settings
    pub gateway: GatewayConfig,
}

/// Audio validation and conversion settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Minimum clip size in bytes; smaller uploads are rejected outright
    pub min_clip_bytes: usize,

    /// Minimum converted output size in bytes (a bare WAV header is 44)
    pub min_wav_bytes: u64,

    /// Conversion utility binary
    pub ffmpeg: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            min_clip_bytes: 100,
            min_wav_bytes: 44,
            ffmpeg: "ffmpeg".to_string(),
        }
    }
}

/// A single recognizer service endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the recognizer service
    pub url: String,

    /// Model identifier passed to the service
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8091".to_string(),
            model: "whisper-tiny".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Transcription settings
///
/// Field-level defaults so that an `[stt]` section without a
/// `[stt.primary]` table disables the primary engine.
#[derive(Debug, Clone, Deserialize)]
pub struct SttConfig {
    /// Fast primary engine; omit to always use the fallback
    #[serde(default)]
    pub primary: Option<EngineConfig>,

    /// Fallback engine, used when the primary fails or is gated
    #[serde(default)]
    pub fallback: EngineConfig,

    /// Maximum concurrent transcriptions
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Transcript quality gate thresholds
    #[serde(default)]
    pub gate: GatePolicy,
}

fn default_workers() -> usize {
    2
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            primary: Some(EngineConfig {
                url: "http://127.0.0.1:8090".to_string(),
                model: "whisper-tiny-int8".to_string(),
                timeout_secs: 30,
            }),
            fallback: EngineConfig::default(),
            workers: 2,
            gate: GatePolicy::default(),
        }
    }
}

/// Text-generation gateway settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the gateway (e.g. an Ollama host)
    pub url: String,

    /// Model identifier sent with each prompt
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "llama3:latest".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file plus environment overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p).map_err(|e| {
                    Error::Config(format!("cannot read config file {}: {e}", p.display()))
                })?;
                toml::from_str(&raw)?
            }
            None => Self::default(),
        };

        config.apply_env();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("HERALD_GATEWAY_URL") {
            self.gateway.url = url;
        }
        if let Ok(model) = std::env::var("HERALD_GATEWAY_MODEL") {
            self.gateway.model = model;
        }
        if let Ok(url) = std::env::var("HERALD_STT_PRIMARY_URL") {
            self.stt.primary.get_or_insert_with(EngineConfig::default).url = url;
        }
        if let Ok(url) = std::env::var("HERALD_STT_FALLBACK_URL") {
            self.stt.fallback.url = url;
        }
        if let Ok(workers) = std::env::var("HERALD_STT_WORKERS") {
            match workers.parse() {
                Ok(n) if n > 0 => self.stt.workers = n,
                _ => tracing::warn!(value = %workers, "ignoring invalid HERALD_STT_WORKERS"),
            }
        }
        if let Ok(ffmpeg) = std::env::var("HERALD_FFMPEG") {
            self.audio.ffmpeg = ffmpeg;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.audio.min_clip_bytes, 100);
        assert_eq!(config.audio.min_wav_bytes, 44);
        assert_eq!(config.stt.workers, 2);
        assert!(config.stt.primary.is_some());
        assert_eq!(config.gateway.timeout_secs, 60);
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [gateway]
            url = "http://10.0.0.5:11434"

            [stt.gate]
            min_distinct_ratio = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.gateway.url, "http://10.0.0.5:11434");
        // Untouched sections keep their defaults
        assert_eq!(config.gateway.model, "llama3:latest");
        assert!((config.stt.gate.min_distinct_ratio - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.stt.gate.min_words, 2);
    }

    #[test]
    fn test_no_primary() {
        let config: Config = toml::from_str(
            r#"
            [stt]
            workers = 4

            [stt.fallback]
            url = "http://127.0.0.1:9000"
            "#,
        )
        .unwrap();

        // An [stt] section without a primary table disables the primary engine
        assert!(config.stt.primary.is_none());
        assert_eq!(config.stt.workers, 4);
        assert_eq!(config.stt.fallback.url, "http://127.0.0.1:9000");
    }
}
