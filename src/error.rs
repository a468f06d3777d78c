//! Error types for the edgequake-studyplan library.
//!
//! Two distinct error types reflect two distinct failure sources:
//!
//! * [`StudyPlanError`] (**request-level**): the pipeline stopped and the
//!   caller gets no plan (missing file, oversized upload, provider failure).
//!   Every variant maps to exactly one HTTP status in [`crate::server`].
//!
//! * [`PlanError`] (**contract**): the model answered, but its text could
//!   not be turned into a well-formed [`crate::plan::StudyPlan`]. Produced by
//!   [`crate::pipeline::response`] and wrapped into
//!   [`StudyPlanError::InvalidPlan`] by the planner.
//!
//! The `Display` output of both types is meant for logs. Callers facing an
//! untrusted client use [`StudyPlanError::public_message`] instead, which never
//! contains model output or provider details.

use thiserror::Error;

/// Generic message for every contract violation of the model's answer.
pub const INVALID_PLAN_MESSAGE: &str = "Failed to generate valid study plan";

/// Generic message for provider failures (network, quota, auth, timeout).
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to process paper";

/// Generic message for unexpected internal failures.
pub const INTERNAL_MESSAGE: &str = "Server error occurred";

/// All fatal errors returned by the study-plan pipeline.
#[derive(Debug, Error)]
pub enum StudyPlanError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The request carried no `file` part.
    #[error("No file provided")]
    NoFile,

    /// The upload exceeds the configured size ceiling.
    #[error("File too large: {size} bytes exceeds the {limit}-byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    /// The declared content type is neither PDF nor plain text.
    #[error("Unsupported content type '{mime}' for '{name}'")]
    InvalidMimeType { name: String, mime: String },

    /// The decoded text is empty after trimming whitespace.
    #[error("No content found in '{name}'")]
    EmptyContent { name: String },

    /// The document could not be decoded (corrupt or encrypted PDF).
    #[error("Could not read '{name}': {detail}")]
    UnreadableDocument { name: String, detail: String },

    /// A local path given to the CLI does not exist or cannot be read.
    #[error("Input file not found: '{path}'")]
    FileNotFound { path: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// The multipart body itself was malformed.
    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The provider call failed, returned a non-success status, or timed out.
    #[error("Generation failed: {reason}")]
    GenerationFailed { reason: String },

    /// The model answered with text that is not a valid study plan.
    #[error(transparent)]
    InvalidPlan(#[from] PlanError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StudyPlanError {
    /// `true` for errors caused by the uploaded input rather than by the
    /// model or the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StudyPlanError::NoFile
                | StudyPlanError::FileTooLarge { .. }
                | StudyPlanError::InvalidMimeType { .. }
                | StudyPlanError::EmptyContent { .. }
                | StudyPlanError::UnreadableDocument { .. }
                | StudyPlanError::MalformedUpload(_)
        )
    }

    /// Message that is safe to hand to an HTTP client.
    ///
    /// Input errors describe what was wrong with the upload. Everything else
    /// collapses to one of three generic strings.
    pub fn public_message(&self) -> String {
        match self {
            StudyPlanError::NoFile => "No file provided".to_string(),
            StudyPlanError::FileTooLarge { limit, .. } => {
                format!("File too large. Maximum size is {}", human_size(*limit))
            }
            StudyPlanError::InvalidMimeType { mime, .. } => format!(
                "Unsupported file type '{}'. Upload a PDF or plain-text file",
                mime
            ),
            StudyPlanError::EmptyContent { .. } => "No content found in file".to_string(),
            StudyPlanError::UnreadableDocument { .. } => {
                "Could not read text from the uploaded document".to_string()
            }
            StudyPlanError::MalformedUpload(_) => "Malformed multipart upload".to_string(),
            StudyPlanError::GenerationFailed { .. } => GENERATION_FAILED_MESSAGE.to_string(),
            StudyPlanError::InvalidPlan(_) => INVALID_PLAN_MESSAGE.to_string(),
            StudyPlanError::FileNotFound { .. }
            | StudyPlanError::DownloadFailed { .. }
            | StudyPlanError::ProviderNotConfigured { .. }
            | StudyPlanError::InvalidConfig(_)
            | StudyPlanError::Internal(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

/// Whole mebibytes as `NMB`, anything else in bytes.
fn human_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Ways the model's answer can violate the study-plan contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// The answer contains no `{` at all.
    #[error("no JSON object found in model output")]
    NoJsonFound,

    /// An opening brace was never balanced before the end of the text.
    #[error("JSON object starting at byte {start} is never closed")]
    UnterminatedJson { start: usize },

    /// The balanced slice is not valid JSON.
    #[error("model output is not valid JSON: {detail}")]
    MalformedJson { detail: String },

    /// Valid JSON, wrong structure.
    #[error("study plan has an invalid shape: {detail}")]
    InvalidShape { detail: String },

    /// `sections` is outside the accepted range.
    #[error("study plan has {count} sections, expected {min}–{max}")]
    InvalidSectionCount { count: usize, min: usize, max: usize },
}
