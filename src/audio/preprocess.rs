//! Clip validation and speech-band normalization
//!
//! Conversion shells out to ffmpeg; the input spool and the converted
//! output are both temp-file guards, so they are deleted on every exit
//! path including errors.

use std::io::{Read, Write};
use std::process::Stdio;

use tempfile::NamedTempFile;
use tokio::process::Command;

use super::{AudioClip, NormalizedAudio};
use crate::config::AudioConfig;
use crate::error::InvalidAudio;
use crate::{Error, Result};

/// Band-pass toward the speech band, lift gain, and normalize levels
/// before resampling. Speech content sits in roughly 300-3400 Hz.
const SPEECH_FILTER: &str = "highpass=f=200,lowpass=f=3000,volume=1.5,dynaudnorm=f=75:g=25:p=0.95";

/// Sample rate the recognizers expect
const TARGET_SAMPLE_RATE: &str = "16000";

/// Validates and normalizes uploaded clips
#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: AudioConfig,
}

impl Preprocessor {
    /// Create a preprocessor with the given audio settings
    #[must_use]
    pub const fn new(config: AudioConfig) -> Self {
        Self { config }
    }

    /// Validate an uploaded clip before any engine runs
    ///
    /// Rejects clips below the size floor, and clips whose first bytes
    /// cannot be read back once spooled to disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAudio`] describing the rejection
    pub fn validate(&self, clip: &AudioClip) -> Result<()> {
        let size = clip.len();
        if size < self.config.min_clip_bytes {
            tracing::warn!(size, "uploaded clip too small to contain speech");
            return Err(InvalidAudio::TooSmall {
                size,
                min: self.config.min_clip_bytes,
            }
            .into());
        }

        // I/O sanity check: spool and read the header back
        let spool = spool_clip(clip).map_err(|e| {
            tracing::error!(error = %e, "failed to spool clip for validation");
            Error::InvalidAudio(InvalidAudio::Unreadable)
        })?;

        let mut header = [0u8; 16];
        let read = std::fs::File::open(spool.path())
            .and_then(|mut f| f.read(&mut header))
            .map_err(|e| {
                tracing::error!(error = %e, "cannot read back spooled clip");
                Error::InvalidAudio(InvalidAudio::Unreadable)
            })?;

        if read < header.len() {
            return Err(InvalidAudio::Unreadable.into());
        }

        tracing::debug!(size, header = ?&header[..8], "clip validated");
        Ok(())
    }

    /// Convert a clip to mono 16 kHz linear-PCM WAV
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conversion`] if ffmpeg cannot be run, exits
    /// non-zero, or produces a header-only file. Callers should fall
    /// back to the unconverted clip; conversion is an optimization,
    /// not a precondition.
    pub async fn normalize(&self, clip: &AudioClip) -> Result<NormalizedAudio> {
        let src = spool_clip(clip)?;
        let dst = tempfile::Builder::new()
            .prefix("herald-norm-")
            .suffix(".wav")
            .tempfile()?;

        tracing::debug!(
            src = %src.path().display(),
            input_bytes = clip.len(),
            "converting clip"
        );

        let output = Command::new(&self.config.ffmpeg)
            .arg("-y")
            .arg("-i")
            .arg(src.path())
            .args(["-af", SPEECH_FILTER])
            .args(["-ar", TARGET_SAMPLE_RATE])
            .args(["-ac", "1"])
            .args(["-acodec", "pcm_s16le"])
            .args(["-f", "wav"])
            .arg(dst.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::Conversion(format!("cannot run {}: {e}", self.config.ffmpeg)))?;

        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(stderr = %stderr, "ffmpeg stderr");
        }

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            return Err(Error::Conversion(format!(
                "{} exited with code {code}",
                self.config.ffmpeg
            )));
        }

        let wav = tokio::fs::read(dst.path()).await?;
        if wav.len() as u64 <= self.config.min_wav_bytes {
            return Err(Error::Conversion(format!(
                "converted output is {} bytes, header only",
                wav.len()
            )));
        }

        tracing::debug!(output_bytes = wav.len(), "conversion complete");
        Ok(NormalizedAudio { wav })
    }
}

/// Write a clip to a named temp file with the right extension
fn spool_clip(clip: &AudioClip) -> std::io::Result<NamedTempFile> {
    let mut spool = tempfile::Builder::new()
        .prefix("herald-clip-")
        .suffix(&format!(".{}", clip.format.extension()))
        .tempfile()?;
    spool.write_all(&clip.data)?;
    spool.flush()?;
    Ok(spool)
}
