//! Configuration for the study-plan pipeline.
//!
//! All pipeline behaviour is controlled through [`PlannerConfig`], built via
//! [`PlannerConfigBuilder`]. The same struct drives the HTTP service and the
//! one-shot CLI mode, so both enforce identical limits.

use crate::error::StudyPlanError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Default upload ceiling: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default number of characters of paper text sent to the model.
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 8000;

/// Configuration for a [`crate::planner::StudyPlanner`].
///
/// # Example
/// ```rust
/// use edgequake_studyplan::PlannerConfig;
///
/// let config = PlannerConfig::builder()
///     .model("gemini-2.0-flash")
///     .generation_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_content_chars, 8000);
/// ```
#[derive(Clone)]
pub struct PlannerConfig {
    /// Upload size ceiling in bytes. Default: 10 MiB.
    pub max_file_size: u64,

    /// Characters of extracted text kept for the prompt. Default: 8000.
    ///
    /// Counted in Unicode scalar values, not tokens. 8000 characters is
    /// roughly 2 000 tokens of English prose, which leaves the model plenty of
    /// room for a multi-section JSON answer.
    pub max_content_chars: usize,

    /// LLM model identifier, e.g. "gemini-2.0-flash", "gpt-4.1-mini".
    /// If None, uses provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "ollama").
    /// If None along with `provider`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.3.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 4096.
    ///
    /// A six-section plan with resources and exercises is usually
    /// 1 500–2 500 tokens. Too low a cap truncates the JSON mid-object, which
    /// then fails extraction as `UnterminatedJson`.
    pub max_tokens: usize,

    /// Upper bound on one generation call in seconds. Default: 60.
    pub generation_timeout_secs: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.3,
            max_tokens: 4096,
            generation_timeout_secs: 60,
        }
    }
}

impl fmt::Debug for PlannerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlannerConfig")
            .field("max_file_size", &self.max_file_size)
            .field("max_content_chars", &self.max_content_chars)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("generation_timeout_secs", &self.generation_timeout_secs)
            .finish()
    }
}

impl PlannerConfig {
    /// Create a new builder for `PlannerConfig`.
    pub fn builder() -> PlannerConfigBuilder {
        PlannerConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PlannerConfig`].
#[derive(Debug)]
pub struct PlannerConfigBuilder {
    config: PlannerConfig,
}

impl PlannerConfigBuilder {
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    pub fn max_content_chars(mut self, n: usize) -> Self {
        self.config.max_content_chars = n;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn generation_timeout_secs(mut self, secs: u64) -> Self {
        self.config.generation_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PlannerConfig, StudyPlanError> {
        let c = &self.config;
        if c.max_file_size == 0 {
            return Err(StudyPlanError::InvalidConfig(
                "max_file_size must be ≥ 1 byte".into(),
            ));
        }
        if c.max_content_chars == 0 {
            return Err(StudyPlanError::InvalidConfig(
                "max_content_chars must be ≥ 1".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(StudyPlanError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.generation_timeout_secs == 0 {
            return Err(StudyPlanError::InvalidConfig(
                "generation timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
