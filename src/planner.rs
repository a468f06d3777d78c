//! The study-plan pipeline, end to end.
//!
//! [`StudyPlanner`] owns the configuration and an injected
//! [`GenerationClient`]. It is built once at process start and shared
//! read-only between requests; every call to [`StudyPlanner::plan`] owns its
//! own document, text and plan.
//!
//! One request walks these stages in order and stops at the first failure:
//!
//! ```text
//! ReceivingUpload → Validating → Extracting → Prompting → Generating
//!                 → ExtractingResponse → Validated
//! ```

use crate::config::PlannerConfig;
use crate::error::StudyPlanError;
use crate::pipeline::extract::{extract_text, truncate_chars};
use crate::pipeline::input;
use crate::pipeline::llm::{GenerationClient, LlmGenerationClient};
use crate::pipeline::response::parse_study_plan;
use crate::pipeline::validate::{ensure_content, validate_upload, UploadedDocument};
use crate::plan::StudyPlan;
use crate::prompts::{build_prompt, derive_title};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Characters of a rejected model answer repeated in WARN logs.
const RAW_PREVIEW_CHARS: usize = 500;

/// Default model when a provider is picked without an explicit model.
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";

/// Where a request is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ReceivingUpload,
    Validating,
    Extracting,
    Prompting,
    Generating,
    ExtractingResponse,
    Validated,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::ReceivingUpload => "receiving-upload",
            Stage::Validating => "validating",
            Stage::Extracting => "extracting",
            Stage::Prompting => "prompting",
            Stage::Generating => "generating",
            Stage::ExtractingResponse => "extracting-response",
            Stage::Validated => "validated",
        };
        f.write_str(s)
    }
}

/// Runs the paper → study plan pipeline.
pub struct StudyPlanner {
    config: PlannerConfig,
    generator: Arc<dyn GenerationClient>,
}

impl StudyPlanner {
    /// Build a planner around an explicit generation client.
    pub fn new(config: PlannerConfig, generator: Arc<dyn GenerationClient>) -> Self {
        Self { config, generator }
    }

    /// Build a planner whose generation client is resolved from `config`
    /// and the environment (see [`resolve_provider`]).
    pub fn from_config(config: PlannerConfig) -> Result<Self, StudyPlanError> {
        let provider = resolve_provider(&config)?;
        let generator = Arc::new(LlmGenerationClient::new(provider, &config));
        Ok(Self::new(config, generator))
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Run the full pipeline on one uploaded document.
    ///
    /// # Errors
    /// Input problems (`FileTooLarge`, `InvalidMimeType`, `EmptyContent`,
    /// `UnreadableDocument`) are returned before the model is called.
    /// Provider failures are `GenerationFailed`; an answer that is not a
    /// valid plan is `InvalidPlan`.
    pub async fn plan(&self, doc: UploadedDocument) -> Result<StudyPlan, StudyPlanError> {
        let start = Instant::now();
        info!(
            "Planning '{}' ({} bytes, type '{}')",
            doc.name, doc.size_bytes, doc.declared_mime_type
        );

        let mut stage = Stage::ReceivingUpload;
        let result = self.run(&doc, &mut stage).await;

        match &result {
            Ok(plan) => info!(
                "Study plan for '{}' ready: {} sections in {}ms",
                doc.name,
                plan.sections.len(),
                start.elapsed().as_millis()
            ),
            Err(e) if e.is_client_error() => {
                info!("Rejected '{}' while {}: {}", doc.name, stage, e)
            }
            Err(e) => warn!("Failed '{}' while {}: {}", doc.name, stage, e),
        }

        result
    }

    /// Load a local path or URL and plan it (CLI one-shot mode).
    pub async fn plan_input(
        &self,
        input_str: &str,
        download_timeout_secs: u64,
    ) -> Result<StudyPlan, StudyPlanError> {
        let doc = input::resolve_input(
            input_str,
            self.config.max_file_size,
            download_timeout_secs,
        )
        .await?;
        self.plan(doc).await
    }

    async fn run(
        &self,
        doc: &UploadedDocument,
        stage: &mut Stage,
    ) -> Result<StudyPlan, StudyPlanError> {
        *stage = Stage::Validating;
        let kind = validate_upload(doc, self.config.max_file_size)?;

        *stage = Stage::Extracting;
        let text = extract_text(doc, kind).await?;
        ensure_content(&doc.name, &text)?;
        let content = truncate_chars(&text, self.config.max_content_chars);
        debug!(
            "Extracted {} chars from '{}', keeping {}",
            text.chars().count(),
            doc.name,
            content.chars().count()
        );

        *stage = Stage::Prompting;
        let prompt = build_prompt(&derive_title(&doc.name), content);

        *stage = Stage::Generating;
        let raw = self.generator.generate(&prompt).await?;

        *stage = Stage::ExtractingResponse;
        let plan = parse_study_plan(&raw).map_err(|e| {
            warn!(
                "Model output for '{}' rejected ({}); first {} chars: {:?}",
                doc.name,
                e,
                RAW_PREVIEW_CHARS,
                truncate_chars(&raw, RAW_PREVIEW_CHARS)
            );
            debug!("Full rejected model output: {:?}", raw);
            e
        })?;

        *stage = Stage::Validated;
        Ok(plan)
    }
}

/// Instantiate a named provider with the given model.
fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, StudyPlanError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        StudyPlanError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Resolve the LLM provider, from most-specific to least-specific:
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model`.
/// 3. **Environment pair** `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`.
/// 4. **Gemini** when `GEMINI_API_KEY` is set, then **OpenAI** when
///    `OPENAI_API_KEY` is set.
/// 5. **Full auto-detection** via `ProviderFactory::from_env`.
pub fn resolve_provider(config: &PlannerConfig) -> Result<Arc<dyn LLMProvider>, StudyPlanError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(match name.as_str() {
            "gemini" => DEFAULT_GEMINI_MODEL,
            _ => DEFAULT_OPENAI_MODEL,
        });
        return create_provider(name, model);
    }

    if let (Some(prov), Some(model)) = (
        non_empty_env("EDGEQUAKE_LLM_PROVIDER"),
        non_empty_env("EDGEQUAKE_MODEL"),
    ) {
        return create_provider(&prov, &model);
    }

    if non_empty_env("GEMINI_API_KEY").is_some() {
        let model = config.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
        return create_provider("gemini", model);
    }

    if non_empty_env("OPENAI_API_KEY").is_some() {
        let model = config.model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL);
        return create_provider("openai", model);
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| StudyPlanError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY, OPENAI_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
