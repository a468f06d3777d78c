//! Pipeline stages for paper-to-study-plan generation.
//!
//! Each submodule implements exactly one transformation step, so each is
//! testable without the others and without a network.
//!
//! ## Data Flow
//!
//! ```text
//! validate ──▶ extract ──▶ prompts ──▶ llm ──▶ response
//! (size/type)  (text, 8k)  (template)  (model)  (JSON recovery + checks)
//! ```
//!
//! 1. [`validate`]: presence, size ceiling, content type, blank text
//! 2. [`extract`]: decode plain text or PDF, keep the first N characters
//! 3. [`crate::prompts`]: render the instruction template
//! 4. [`llm`]: the single model call, bounded by a timeout
//! 5. [`response`]: find the JSON object in the answer and validate it
//!
//! [`input`] sits outside the request path: it loads paths and URLs for the
//! CLI's one-shot mode.

pub mod extract;
pub mod input;
pub mod llm;
pub mod response;
pub mod validate;
