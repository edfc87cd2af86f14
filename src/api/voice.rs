//! Voice ingress endpoint
//!
//! Accepts a recorded clip as either a multipart `file` field or a raw
//! request body, runs the full pipeline, and answers with the action
//! result or gateway reply.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use super::ApiState;
use crate::audio::{AudioClip, AudioFormat};
use crate::pipeline::PipelineReply;
use crate::transcribe::Verdict;
use crate::Error;

/// Build voice router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/transcribe", post(transcribe))
        .with_state(state)
}

/// Transcribe an uploaded clip and act on it
async fn transcribe(
    State(state): State<Arc<ApiState>>,
    request: Request,
) -> Result<Json<PipelineReply>, VoiceError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let clip = if content_type.starts_with("multipart/form-data") {
        clip_from_multipart(request).await?
    } else {
        let body = Bytes::from_request(request, &())
            .await
            .map_err(|e| VoiceError::BadRequest(format!("cannot read body: {e}")))?;
        if body.is_empty() {
            return Err(VoiceError::BadRequest("no file provided".to_string()));
        }
        AudioClip::new(body.to_vec(), AudioFormat::from_mime(&content_type))
    };

    tracing::info!(
        bytes = clip.len(),
        format = ?clip.format,
        "received clip"
    );

    let reply = state.pipeline.handle_clip(clip).await?;
    Ok(Json(reply))
}

/// Pull the audio clip out of a multipart upload
async fn clip_from_multipart(request: Request) -> Result<AudioClip, VoiceError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| VoiceError::BadRequest(format!("malformed multipart body: {e}")))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| VoiceError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let format = field
            .content_type()
            .map_or(AudioFormat::Webm, AudioFormat::from_mime);
        let data = field
            .bytes()
            .await
            .map_err(|e| VoiceError::BadRequest(format!("cannot read file field: {e}")))?;

        return Ok(AudioClip::new(data.to_vec(), format));
    }

    Err(VoiceError::BadRequest("no file provided".to_string()))
}

/// Voice API errors
#[derive(Debug)]
enum VoiceError {
    BadRequest(String),
    InvalidAudio(String),
    NoSpeech(Option<Verdict>),
    Internal(String),
}

impl From<Error> for VoiceError {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidAudio(inner) => Self::InvalidAudio(inner.to_string()),
            Error::NoSpeech { reason } => Self::NoSpeech(reason),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for VoiceError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        let (status, error, details) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message, None),
            Self::InvalidAudio(message) => {
                (StatusCode::BAD_REQUEST, format!("invalid audio file: {message}"), None)
            }
            Self::NoSpeech(reason) => (
                StatusCode::BAD_REQUEST,
                "no speech detected".to_string(),
                Some(match reason {
                    Some(verdict) => format!(
                        "the transcript was rejected as {}",
                        verdict.reason()
                    ),
                    None => {
                        "the audio may be too quiet, too short, or contain no clear speech"
                            .to_string()
                    }
                }),
            ),
            Self::Internal(message) => {
                tracing::error!(error = %message, "transcribe handler error");
                (StatusCode::INTERNAL_SERVER_ERROR, message, None)
            }
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}
