//! Model interaction: send the rendered prompt, get the raw answer back.
//!
//! The pipeline only needs "prompt in, text out", expressed by the
//! [`GenerationClient`] trait. [`LlmGenerationClient`] implements it on top of
//! any `edgequake_llm` provider; tests substitute their own implementation.
//!
//! Exactly one call is made per request. Every failure (network, quota,
//! auth, non-success status, timeout) becomes
//! [`StudyPlanError::GenerationFailed`].

use crate::config::PlannerConfig;
use crate::error::StudyPlanError;
use crate::prompts::SYSTEM_PROMPT;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

/// Anything that can turn a prompt into raw model text.
pub trait GenerationClient: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, StudyPlanError>>;
}

/// [`GenerationClient`] backed by an `edgequake_llm` provider.
pub struct LlmGenerationClient {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    timeout: Duration,
}

impl LlmGenerationClient {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &PlannerConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
            timeout: Duration::from_secs(config.generation_timeout_secs),
        }
    }

    async fn chat(&self, prompt: &str) -> Result<String, StudyPlanError> {
        let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];
        let start = Instant::now();

        let call = self.provider.chat(&messages, Some(&self.options));
        let response = bounded(self.timeout, call).await?;

        debug!(
            "Generation: {} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        Ok(response.content)
    }
}

impl GenerationClient for LlmGenerationClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, StudyPlanError>> {
        self.chat(prompt).boxed()
    }
}

/// Await one provider call under `limit`. Provider errors and expiry both
/// become `GenerationFailed`.
async fn bounded<F, T, E>(limit: Duration, call: F) -> Result<T, StudyPlanError>
where
    F: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    match timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            warn!("Generation call failed: {}", e);
            Err(StudyPlanError::GenerationFailed {
                reason: e.to_string(),
            })
        }
        Err(_) => {
            warn!("Generation call timed out after {:?}", limit);
            Err(StudyPlanError::GenerationFailed {
                reason: format!("timed out after {:?}", limit),
            })
        }
    }
}

/// Build `CompletionOptions` from the planner config.
fn build_options(config: &PlannerConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}
