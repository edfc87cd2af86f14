//! Audio ingress types and preprocessing

mod preprocess;

pub use preprocess::Preprocessor;

/// Container format declared by the uploader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// WebM/Opus, the browser recorder default
    Webm,
    /// Ogg/Opus
    Ogg,
    /// Already-decoded WAV
    Wav,
    /// MP3
    Mp3,
}

impl AudioFormat {
    /// Map a MIME type to a format, defaulting to WebM
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime.split(';').next().unwrap_or(mime).trim();
        match essence {
            "audio/ogg" | "application/ogg" => Self::Ogg,
            "audio/wav" | "audio/x-wav" | "audio/wave" => Self::Wav,
            "audio/mpeg" | "audio/mp3" => Self::Mp3,
            _ => Self::Webm,
        }
    }

    /// File extension used for the spooled temp file
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Ogg => "ogg",
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
        }
    }
}

/// A raw uploaded audio clip
///
/// Created on ingress, consumed by one transcription attempt, never
/// persisted.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Raw container bytes as uploaded
    pub data: Vec<u8>,
    /// Declared container format
    pub format: AudioFormat,
}

impl AudioClip {
    /// Wrap uploaded bytes
    #[must_use]
    pub const fn new(data: Vec<u8>, format: AudioFormat) -> Self {
        Self { data, format }
    }

    /// Clip size in bytes
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the clip is empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Mono 16 kHz linear-PCM audio produced by conversion
///
/// Owned exclusively by the transcription call that requested it; the
/// temp files backing the conversion are deleted before this value is
/// returned.
#[derive(Debug)]
pub struct NormalizedAudio {
    /// WAV bytes (16 kHz, mono, s16le)
    pub wav: Vec<u8>,
}
