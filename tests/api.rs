//! HTTP-level tests for `POST /api/process-paper`.
//!
//! The router runs in-process through `tower::ServiceExt::oneshot`, with a
//! scripted generation client in place of a real LLM provider. No network,
//! no API keys, no pdfium.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use edgequake_studyplan::{
    server, GenerationClient, PlannerConfig, StudyPlanError, StudyPlanner,
};
use futures::future::BoxFuture;
use futures::{stream, FutureExt};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

// ── Test helpers ─────────────────────────────────────────────────────────────

const BOUNDARY: &str = "----studyplan-test-boundary";

/// Answers every prompt with the same text and counts calls.
struct FakeClient {
    answer: Result<String, String>,
    calls: AtomicUsize,
}

impl FakeClient {
    fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(reason.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GenerationClient for FakeClient {
    fn generate<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String, StudyPlanError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = self
            .answer
            .clone()
            .map_err(|reason| StudyPlanError::GenerationFailed { reason });
        async move { answer }.boxed()
    }
}

fn app(client: Arc<FakeClient>) -> Router {
    let planner = StudyPlanner::new(PlannerConfig::default(), client);
    server::router(Arc::new(planner))
}

fn section(topic: &str) -> String {
    format!(
        r#"{{"topic":"{topic}","timeRequired":"2 hours","description":"About {topic}",
            "prerequisites":["Linear algebra"],
            "resources":[{{"title":"Notes","url":"https://example.org/{topic}","difficulty":"beginner"}}],
            "exercises":[{{"question":"Explain {topic}","type":"conceptual","hint":"Start small"}}]}}"#
    )
}

fn plan_json(sections: usize) -> String {
    let body: Vec<String> = (0..sections).map(|i| section(&format!("S{i}"))).collect();
    format!(r#"{{"title":"T","sections":[{}]}}"#, body.join(","))
}

/// Hand-built `multipart/form-data` body with one part.
fn multipart_body(field: &str, file_name: &str, mime: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {mime}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    let len = body.len().to_string();
    Request::builder()
        .method("POST")
        .uri("/api/process-paper")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::CONTENT_LENGTH, len)
        .body(Body::from(body))
        .unwrap()
}

/// Same single-part form, delivered in `chunk`-sized pieces with no
/// `Content-Length` header.
fn streamed_upload(file_name: &str, mime: &str, content: &[u8], chunk: usize) -> Request<Body> {
    let body = multipart_body("file", file_name, mime, content);
    let pieces: Vec<Result<Vec<u8>, std::io::Error>> =
        body.chunks(chunk).map(|c| Ok(c.to_vec())).collect();

    Request::builder()
        .method("POST")
        .uri("/api/process-paper")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from_stream(stream::iter(pieces)))
        .unwrap()
}

fn upload(file_name: &str, mime: &str, content: &[u8]) -> Request<Body> {
    upload_request(multipart_body("file", file_name, mime, content))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn paper_text() -> Vec<u8> {
    b"Attention is all you need. We propose the Transformer architecture."[..50].to_vec()
}

// ── Success ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn text_upload_returns_plan_from_wrapped_answer() {
    let client = FakeClient::answering(&format!("Here you go:\n{}\nEnjoy!", plan_json(2)));
    let req = upload("paper.txt", "text/plain", &paper_text());
    let (status, json) = send(app(client.clone()), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "T");
    assert_eq!(json["sections"].as_array().unwrap().len(), 2);
    assert_eq!(json["sections"][0]["timeRequired"], "2 hours");
    assert_eq!(json["sections"][0]["exercises"][0]["type"], "conceptual");
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn eight_sections_are_accepted() {
    let client = FakeClient::answering(&plan_json(8));
    let req = upload("paper.txt", "text/plain", &paper_text());
    let (status, json) = send(app(client), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sections"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn octet_stream_with_txt_extension_is_accepted() {
    let client = FakeClient::answering(&plan_json(3));
    let (status, _) = send(
        app(client.clone()),
        upload("notes.txt", "application/octet-stream", &paper_text()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(client.calls(), 1);
}

// ── Client errors ────────────────────────────────────────────────────────────

#[tokio::test]
async fn oversized_upload_is_413_without_generation() {
    let client = FakeClient::answering(&plan_json(2));
    let big = vec![b'a'; 11 * 1024 * 1024];
    let (status, json) = send(app(client.clone()), upload("big.txt", "text/plain", &big)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["error"], "File too large. Maximum size is 10MB");
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn oversized_stream_without_length_is_413_without_generation() {
    let client = FakeClient::answering(&plan_json(2));
    let big = vec![b'a'; 11 * 1024 * 1024];
    let req = streamed_upload("big.txt", "text/plain", &big, 64 * 1024);
    assert!(req.headers().get(header::CONTENT_LENGTH).is_none());

    let (status, json) = send(app(client.clone()), req).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["error"], "File too large. Maximum size is 10MB");
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn streamed_upload_within_limit_is_accepted() {
    let client = FakeClient::answering(&plan_json(2));
    let req = streamed_upload("paper.txt", "text/plain", &paper_text(), 16);

    let (status, json) = send(app(client.clone()), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "T");
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn missing_file_field_is_400() {
    let client = FakeClient::answering(&plan_json(2));
    let body = multipart_body("attachment", "paper.txt", "text/plain", &paper_text());
    let (status, json) = send(app(client.clone()), upload_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No file provided");
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn blank_text_is_400_without_generation() {
    let client = FakeClient::answering(&plan_json(2));
    let req = upload("blank.txt", "text/plain", b"  \n\t \n");
    let (status, json) = send(app(client.clone()), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No content found in file");
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn unsupported_type_is_400_without_generation() {
    let client = FakeClient::answering(&plan_json(2));
    let req = upload("figure.png", "image/png", b"\x89PNG");
    let (status, json) = send(app(client.clone()), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("image/png"));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn non_multipart_request_is_400_json() {
    let client = FakeClient::answering(&plan_json(2));
    let req = Request::builder()
        .method("POST")
        .uri("/api/process-paper")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, json) = send(app(client.clone()), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Malformed multipart upload");
    assert_eq!(client.calls(), 0);
}

// ── Server errors ────────────────────────────────────────────────────────────

#[tokio::test]
async fn prose_answer_is_500_and_raw_text_is_hidden() {
    let prose = "I'm sorry, I cannot produce a study plan for this secret-marker paper.";
    let client = FakeClient::answering(prose);
    let req = upload("paper.txt", "text/plain", &paper_text());
    let (status, json) = send(app(client.clone()), req).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to generate valid study plan");
    assert!(!json.to_string().contains("secret-marker"));
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn too_many_sections_is_500() {
    let client = FakeClient::answering(&plan_json(9));
    let req = upload("paper.txt", "text/plain", &paper_text());
    let (status, json) = send(app(client), req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to generate valid study plan");
}

#[tokio::test]
async fn single_section_is_500() {
    let client = FakeClient::answering(&plan_json(1));
    let req = upload("paper.txt", "text/plain", &paper_text());
    let (status, _) = send(app(client), req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn generation_failure_is_500_and_detail_is_hidden() {
    let client = FakeClient::failing("401 invalid api key sk-test-123");
    let req = upload("paper.txt", "text/plain", &paper_text());
    let (status, json) = send(app(client.clone()), req).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Failed to process paper");
    assert!(!json.to_string().contains("sk-test-123"));
    assert_eq!(client.calls(), 1);
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_route_answers_ok() {
    let client = FakeClient::answering(&plan_json(2));
    let req = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let res = app(client).oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}
