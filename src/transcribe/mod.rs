//! Speech-to-text orchestration
//!
//! Engines are opaque recognizer services behind the [`SpeechEngine`]
//! trait. The orchestrator drives a fast primary engine with a more
//! careful fallback, and a quality gate decides whether output is
//! trustworthy enough to act on.

mod engine;
mod orchestrator;
mod quality;

pub use engine::HttpEngine;
pub use orchestrator::{EngineHandle, Orchestrator};
pub use quality::{GatePolicy, Verdict};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// One decoded segment from a recognition attempt
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptSegment {
    /// Segment text
    pub text: String,
    /// Per-segment confidence in [0, 1], when the engine reports one
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Reduced result of one recognition attempt
#[derive(Debug, Clone)]
pub struct Transcript {
    /// Segment texts joined with single spaces
    pub text: String,
    /// Mean of the confidences that were present
    pub mean_confidence: f32,
    /// Whitespace-delimited word count
    pub word_count: usize,
}

impl Transcript {
    /// Reduce engine segments to one transcript
    ///
    /// Empty segments are dropped; segments without a confidence score
    /// are excluded from the average rather than counted as zero.
    #[must_use]
    pub fn reduce(segments: &[TranscriptSegment]) -> Self {
        let mut parts = Vec::new();
        let mut confidence_sum = 0.0f32;
        let mut confidence_count = 0usize;

        for segment in segments {
            let text = segment.text.trim();
            if text.is_empty() {
                continue;
            }
            parts.push(text);
            if let Some(confidence) = segment.confidence {
                confidence_sum += confidence;
                confidence_count += 1;
            }
        }

        let text = parts.join(" ");
        let word_count = text.split_whitespace().count();
        let mean_confidence = if confidence_count > 0 {
            confidence_sum / confidence_count as f32
        } else {
            0.0
        };

        Self {
            text,
            mean_confidence,
            word_count,
        }
    }
}

/// Decoding discipline shared by both engines
///
/// Minimal search width and deterministic decoding keep latency low;
/// decoding each utterance independently prevents hallucinated
/// continuation from prior audio.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeOptions {
    /// Beam search width
    pub beam_size: u32,
    /// Sampling temperature; zero disables sampling
    pub temperature: f32,
    /// Pinned source language
    pub language: String,
    /// Carry decoded context across segments
    pub condition_on_previous_text: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            beam_size: 1,
            temperature: 0.0,
            language: "en".to_string(),
            condition_on_previous_text: false,
        }
    }
}

/// Trait for recognizer engine implementations
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Transcribe WAV audio to ordered segments
    ///
    /// # Errors
    ///
    /// Returns error if the engine cannot be reached or rejects the audio
    async fn transcribe(
        &self,
        wav: &[u8],
        options: &DecodeOptions,
    ) -> Result<Vec<TranscriptSegment>>;

    /// Engine name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str, confidence: Option<f32>) -> TranscriptSegment {
        TranscriptSegment {
            text: text.to_string(),
            confidence,
        }
    }

    #[test]
    fn test_reduce_joins_with_single_spaces() {
        let transcript = Transcript::reduce(&[
            segment(" open ", Some(0.9)),
            segment("the browser", Some(0.7)),
        ]);
        assert_eq!(transcript.text, "open the browser");
        assert_eq!(transcript.word_count, 3);
    }

    #[test]
    fn test_reduce_skips_empty_segments() {
        let transcript = Transcript::reduce(&[
            segment("hello", None),
            segment("   ", Some(0.2)),
            segment("world", None),
        ]);
        assert_eq!(transcript.text, "hello world");
    }

    #[test]
    fn test_reduce_averages_present_confidences_only() {
        let transcript = Transcript::reduce(&[
            segment("a", Some(0.8)),
            segment("b", None),
            segment("c", Some(0.6)),
        ]);
        // The missing score is excluded, not treated as zero
        assert!((transcript.mean_confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_reduce_empty_input() {
        let transcript = Transcript::reduce(&[]);
        assert_eq!(transcript.text, "");
        assert_eq!(transcript.word_count, 0);
        assert!(transcript.mean_confidence.abs() < f32::EPSILON);
    }
}
