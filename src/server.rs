//! HTTP transport: `POST /api/process-paper`.
//!
//! The handler reads the multipart `file` part into an [`UploadedDocument`],
//! hands it to the shared [`StudyPlanner`] and maps the outcome to a status
//! code and JSON body. Errors always render as `{ "error": "<message>" }`
//! using [`StudyPlanError::public_message`], so model output and provider
//! details never reach the client.
//!
//! Size is enforced three times, cheapest first: the `Content-Length`
//! header, a running byte count while the `file` part streams in, and the
//! validator's own check inside the planner.

use crate::error::StudyPlanError;
use crate::pipeline::validate::{check_size, require_upload, UploadedDocument};
use crate::plan::StudyPlan;
use crate::planner::StudyPlanner;
use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Allowance for multipart boundaries and part headers on top of the file
/// size ceiling.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Name of the multipart part carrying the document.
const FILE_FIELD: &str = "file";

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<StudyPlanner>,
}

/// Build the application router.
pub fn router(planner: Arc<StudyPlanner>) -> Router {
    let limit = body_limit(planner.config().max_file_size);
    let state = AppState { planner };

    Router::new()
        .route("/api/process-paper", post(process_paper))
        .route("/api/health", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Request body ceiling for a given file size ceiling.
fn body_limit(max_file_size: u64) -> usize {
    let limit = max_file_size.saturating_add(MULTIPART_OVERHEAD);
    usize::try_from(limit).unwrap_or(usize::MAX)
}

/// Serve `router` on `listener` until the process receives Ctrl-C.
pub async fn serve(listener: tokio::net::TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await
}

/// `POST /api/process-paper`
async fn process_paper(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<StudyPlan>, StudyPlanError> {
    let limit = state.planner.config().max_file_size;

    if let Some(len) = content_length(&headers) {
        check_size(len.saturating_sub(MULTIPART_OVERHEAD), limit)?;
    }

    let multipart = multipart.map_err(|e| StudyPlanError::MalformedUpload(e.body_text()))?;

    let upload = read_upload(multipart, limit).await?;
    let doc = require_upload(upload)?;
    let plan = state.planner.plan(doc).await?;
    Ok(Json(plan))
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Pull the `file` part out of the form, ignoring any other parts.
async fn read_upload(
    mut multipart: Multipart,
    limit: u64,
) -> Result<Option<UploadedDocument>, StudyPlanError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        return read_file_field(field, limit).await.map(Some);
    }
    Ok(None)
}

/// Read one file part chunk by chunk, stopping as soon as it passes `limit`.
async fn read_file_field(
    mut field: Field<'_>,
    limit: u64,
) -> Result<UploadedDocument, StudyPlanError> {
    let name = field.file_name().unwrap_or("document").to_string();
    let mime = field.content_type().unwrap_or("").to_string();

    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        bytes.extend_from_slice(&chunk);
        check_size(bytes.len() as u64, limit)?;
    }

    debug!("Received upload '{}' ({} bytes, '{}')", name, bytes.len(), mime);
    Ok(UploadedDocument::new(name, mime, bytes))
}

/// A body-limit rejection surfaces as a multipart error; report it as 413.
fn multipart_error(e: MultipartError, limit: u64) -> StudyPlanError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(limit)
    } else {
        StudyPlanError::MalformedUpload(e.body_text())
    }
}

/// The body was cut off past `limit`, so the exact size is unknown.
fn too_large(limit: u64) -> StudyPlanError {
    StudyPlanError::FileTooLarge {
        size: limit.saturating_add(1),
        limit,
    }
}

impl StudyPlanError {
    /// HTTP status for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            StudyPlanError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StudyPlanError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": self.public_message(),
        }));

        (status, body).into_response()
    }
}
