//! Voice pipeline integration tests
//!
//! Tests the pipeline and HTTP surface with in-process mock engines;
//! no recognizer service, gateway, or audio hardware required.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use herald_gateway::api::{self, ApiState};
use herald_gateway::audio::{AudioClip, AudioFormat, Preprocessor};
use herald_gateway::config::{AudioConfig, GatewayConfig};
use herald_gateway::gateway::GatewayClient;
use herald_gateway::launcher::Launcher;
use herald_gateway::transcribe::{
    DecodeOptions, GatePolicy, Orchestrator, SpeechEngine, TranscriptSegment,
};
use herald_gateway::{Error, VoicePipeline};

/// Engine returning a fixed transcript, counting invocations
struct FixedEngine {
    name: &'static str,
    text: &'static str,
    calls: AtomicUsize,
}

impl FixedEngine {
    fn new(name: &'static str, text: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            text,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechEngine for FixedEngine {
    async fn transcribe(
        &self,
        _wav: &[u8],
        _options: &DecodeOptions,
    ) -> herald_gateway::Result<Vec<TranscriptSegment>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![TranscriptSegment {
            text: self.text.to_string(),
            confidence: Some(0.9),
        }])
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Pipeline with mock engines, a broken converter, and an unreachable
/// gateway: validation, orchestration, parsing, and decoding all run
/// for real
fn build_pipeline(
    primary: Option<Arc<FixedEngine>>,
    fallback: Arc<FixedEngine>,
) -> VoicePipeline {
    // A nonexistent converter forces the raw-clip fallback path
    let audio = AudioConfig {
        ffmpeg: "/nonexistent/ffmpeg".to_string(),
        ..AudioConfig::default()
    };

    let gateway = GatewayConfig {
        url: "http://127.0.0.1:1".to_string(),
        model: "test".to_string(),
        timeout_secs: 2,
    };

    let orchestrator = Orchestrator::with_engines(
        primary.map(|e| e as Arc<dyn SpeechEngine>),
        fallback as Arc<dyn SpeechEngine>,
        GatePolicy::default(),
        2,
    );

    VoicePipeline::with_components(
        Preprocessor::new(audio),
        orchestrator,
        GatewayClient::new(&gateway).unwrap(),
        Launcher::new(),
    )
}

fn clip(bytes: usize) -> AudioClip {
    AudioClip::new(vec![0x42; bytes], AudioFormat::Webm)
}

#[tokio::test]
async fn test_tiny_clip_rejected_before_any_engine() {
    let primary = FixedEngine::new("primary", "should not run");
    let fallback = FixedEngine::new("fallback", "should not run");
    let pipeline = build_pipeline(Some(Arc::clone(&primary)), Arc::clone(&fallback));

    let err = pipeline.handle_clip(clip(30)).await.unwrap_err();

    assert!(matches!(err, Error::InvalidAudio(_)));
    assert_eq!(primary.calls(), 0);
    assert_eq!(fallback.calls(), 0);
}

#[tokio::test]
async fn test_repetitive_primary_uses_fallback_transcript() {
    let primary = FixedEngine::new("primary", "the the the the");
    let fallback = FixedEngine::new("fallback", "open visual studio code");
    let pipeline = build_pipeline(Some(Arc::clone(&primary)), Arc::clone(&fallback));

    let reply = pipeline.handle_clip(clip(500)).await.unwrap();

    // The fallback's accepted transcript is what gets acted on
    assert_eq!(reply.question, "open visual studio code");
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.calls(), 1);
}

#[tokio::test]
async fn test_question_reaches_gateway_and_reports_unavailability() {
    let fallback = FixedEngine::new("fallback", "what is the capital of france");
    let pipeline = build_pipeline(None, fallback);

    let reply = pipeline.handle_clip(clip(500)).await.unwrap();

    assert_eq!(reply.question, "what is the capital of france");
    // Transport failure is a graceful answer, not an error
    assert!(reply.text.starts_with("[gateway unavailable:"));
}

fn router(primary: Option<Arc<FixedEngine>>, fallback: Arc<FixedEngine>) -> axum::Router {
    let state = Arc::new(ApiState {
        pipeline: build_pipeline(primary, fallback),
    });
    api::router(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = router(None, FixedEngine::new("fallback", "unused"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_transcribe_rejects_empty_body() {
    let app = router(None, FixedEngine::new("fallback", "unused"));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/transcribe")
                .header(header::CONTENT_TYPE, "audio/webm")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "no file provided");
}

#[tokio::test]
async fn test_transcribe_rejects_small_clip_with_400() {
    let fallback = FixedEngine::new("fallback", "unused");
    let app = router(None, Arc::clone(&fallback));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/transcribe")
                .header(header::CONTENT_TYPE, "audio/webm")
                .body(Body::from(vec![0u8; 30]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .starts_with("invalid audio file")
    );
    assert_eq!(fallback.calls(), 0);
}

#[tokio::test]
async fn test_transcribe_raw_body_end_to_end() {
    let fallback = FixedEngine::new("fallback", "how tall is everest");
    let app = router(None, Arc::clone(&fallback));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/transcribe")
                .header(header::CONTENT_TYPE, "audio/webm")
                .body(Body::from(vec![0x42u8; 500]))
                .unwrap(),
        )
        .await
        .unwrap();

    // Gateway unavailability still answers 200 with a displayable message
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["question"], "how tall is everest");
    assert!(
        json["text"]
            .as_str()
            .unwrap()
            .starts_with("[gateway unavailable:")
    );
    assert_eq!(fallback.calls(), 1);
}

#[tokio::test]
async fn test_transcribe_multipart_upload() {
    let fallback = FixedEngine::new("fallback", "what day is it");
    let app = router(None, Arc::clone(&fallback));

    let boundary = "herald-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"file\"; filename=\"clip.webm\"\r\n",
    );
    body.extend_from_slice(b"Content-Type: audio/webm\r\n\r\n");
    body.extend_from_slice(&vec![0x42u8; 500]);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/transcribe")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["question"], "what day is it");
    assert_eq!(fallback.calls(), 1);
}

#[tokio::test]
async fn test_execute_unrecognized_command_is_info() {
    let app = router(None, FixedEngine::new("fallback", "unused"));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/execute")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"text": "please stop"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "info");
    assert_eq!(json["ok"], false);
}

#[tokio::test]
async fn test_execute_blank_text_is_bad_request() {
    let app = router(None, FixedEngine::new("fallback", "unused"));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/execute")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"text": "   "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ask_unavailable_gateway_is_503() {
    let app = router(None, FixedEngine::new("fallback", "unused"));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ask")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"message": "hello"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["error"], "AI service unavailable");
}
