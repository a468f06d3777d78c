//! The study-plan output contract.
//!
//! These types are what the HTTP endpoint returns and what the presentation
//! layer renders. Field names are serialised in camelCase to match the JSON
//! shape the model is asked to produce (`timeRequired`, `matrixData`, …).
//!
//! Deserialisation is strict: unknown difficulty levels or a string where an
//! array is expected fail the whole plan rather than being dropped silently.

use serde::{Deserialize, Serialize};

/// A complete study plan for one paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyPlan {
    pub title: String,
    pub sections: Vec<Section>,
}

/// One step of the learning path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub topic: String,
    pub time_required: String,
    pub description: String,
    pub prerequisites: Vec<String>,
    pub resources: Vec<Resource>,
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
    pub difficulty: Difficulty,
}

/// Resource difficulty. Models occasionally capitalise these, so the
/// capitalised spellings are accepted on input; output is always lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "Beginner")]
    Beginner,
    #[serde(alias = "Intermediate")]
    Intermediate,
    #[serde(alias = "Advanced")]
    Advanced,
}

/// A practice question attached to a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub question: String,
    /// Free-form kind, e.g. `multiple-choice`, `open-ended`, `coding`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Missing hints are accepted and rendered as empty.
    #[serde(default)]
    pub hint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ExerciseDetails>,
}

/// Optional structured payload for maths and coding exercises.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_data: Option<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_input: Option<String>,
}
