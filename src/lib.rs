//! # edgequake-studyplan
//!
//! Turn an academic paper (PDF or plain text) into a structured study plan
//! with a Large Language Model.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload
//!  │
//!  ├─ 1. Validate  file present, ≤ 10 MiB, PDF or text
//!  ├─ 2. Extract   decode text (pdfium for PDFs), keep first 8000 chars
//!  ├─ 3. Prompt    render the study-plan template
//!  ├─ 4. Generate  one LLM call via edgequake-llm, bounded by a timeout
//!  ├─ 5. Recover   first balanced JSON object in the answer
//!  └─ 6. Check     title, 2–8 sections, typed StudyPlan
//! ```
//!
//! Every stage fails fast; a caller either gets a complete [`StudyPlan`] or a
//! [`StudyPlanError`] that maps to one HTTP status.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_studyplan::{PlannerConfig, StudyPlanner, UploadedDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY / …
//!     let planner = StudyPlanner::from_config(PlannerConfig::default())?;
//!     let bytes = std::fs::read("paper.txt")?;
//!     let plan = planner
//!         .plan(UploadedDocument::new("paper.txt", "text/plain", bytes))
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&plan)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Serving over HTTP
//!
//! [`server::router`] exposes `POST /api/process-paper` (multipart field
//! `file`). The `studyplan serve` binary wires it to a TCP listener.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `studyplan` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod pipeline;
pub mod plan;
pub mod planner;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PlannerConfig, PlannerConfigBuilder};
pub use error::{PlanError, StudyPlanError};
pub use pipeline::llm::{GenerationClient, LlmGenerationClient};
pub use pipeline::response::{extract_json_object, parse_study_plan};
pub use pipeline::validate::{DocumentKind, UploadedDocument};
pub use plan::{Difficulty, Exercise, ExerciseDetails, Resource, Section, StudyPlan};
pub use planner::{Stage, StudyPlanner};
