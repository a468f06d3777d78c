//! Response extraction: recover a study plan from free-form model output.
//!
//! Language models routinely wrap JSON in prose ("Here you go:"), markdown
//! fences or trailing commentary. This stage finds the first balanced
//! top-level `{ … }` in the answer, parses it, and checks it against the
//! study-plan contract.
//!
//! ## Algorithm
//!
//! ```text
//! raw text ──▶ first '{' ──▶ brace-depth scan ──▶ slice ──▶ serde_json ──▶ shape ──▶ StudyPlan
//!             NoJsonFound   UnterminatedJson            MalformedJson   InvalidShape
//!                                                                       InvalidSectionCount
//! ```
//!
//! Depth counting is a plain byte scan: `{` and `}` are counted wherever they
//! appear, including inside JSON strings. Balanced braces in strings are
//! harmless; an unbalanced brace inside a string makes the slice end early and
//! the parse step reports `MalformedJson`.
//!
//! Anything after the first top-level object is ignored. Malformed JSON is
//! never repaired.

use crate::error::PlanError;
use crate::plan::StudyPlan;
use serde_json::Value;

/// Fewest sections a plan may have.
pub const MIN_SECTIONS: usize = 2;

/// Most sections a plan may have.
pub const MAX_SECTIONS: usize = 8;

/// Return the first balanced top-level `{ … }` slice of `text`.
///
/// The slice borrows from `text` and includes both braces. Running this on
/// its own output returns the same slice.
pub fn extract_json_object(text: &str) -> Result<&str, PlanError> {
    let start = text.find('{').ok_or(PlanError::NoJsonFound)?;

    let mut depth = 0usize;
    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset;
                    return Ok(&text[start..=end]);
                }
            }
            _ => {}
        }
    }

    Err(PlanError::UnterminatedJson { start })
}

/// Parse and validate the model's raw answer into a [`StudyPlan`].
pub fn parse_study_plan(raw: &str) -> Result<StudyPlan, PlanError> {
    let slice = extract_json_object(raw)?;

    let value: Value = serde_json::from_str(slice).map_err(|e| PlanError::MalformedJson {
        detail: e.to_string(),
    })?;

    validate_shape(&value)?;

    serde_json::from_value(value).map_err(|e| PlanError::InvalidShape {
        detail: e.to_string(),
    })
}

/// Check the top-level contract: a non-empty `title` string and a `sections`
/// array of acceptable length.
pub fn validate_shape(value: &Value) -> Result<(), PlanError> {
    let obj = value.as_object().ok_or_else(|| PlanError::InvalidShape {
        detail: "top-level value is not an object".into(),
    })?;

    match obj.get("title").and_then(Value::as_str) {
        Some(title) if !title.trim().is_empty() => {}
        Some(_) => {
            return Err(PlanError::InvalidShape {
                detail: "`title` is empty".into(),
            })
        }
        None => {
            return Err(PlanError::InvalidShape {
                detail: "`title` is missing or not a string".into(),
            })
        }
    }

    let sections = obj
        .get("sections")
        .and_then(Value::as_array)
        .ok_or_else(|| PlanError::InvalidShape {
            detail: "`sections` is missing or not an array".into(),
        })?;

    let count = sections.len();
    if !(MIN_SECTIONS..=MAX_SECTIONS).contains(&count) {
        return Err(PlanError::InvalidSectionCount {
            count,
            min: MIN_SECTIONS,
            max: MAX_SECTIONS,
        });
    }

    Ok(())
}
