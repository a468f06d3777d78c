//! Prompts for study-plan generation.
//!
//! The user prompt is a static template with exactly two substitution points,
//! `{title}` and `{content}`. [`build_prompt`] is a pure function so prompt
//! regressions can be caught in unit tests without any network call.

use once_cell::sync::Lazy;
use regex::Regex;

/// System message sent ahead of the rendered template.
pub const SYSTEM_PROMPT: &str = "You are an expert tutor who turns research papers into \
study plans. Answer with a single JSON object and nothing else.";

/// Instruction template. `{title}` and `{content}` are replaced verbatim.
pub const STUDY_PLAN_TEMPLATE: &str = r#"You are creating a comprehensive study plan to help a high school graduate understand this research paper.
Break down ALL important concepts and create a complete learning path.

IMPORTANT: Keep your response focused and concise while covering all essential topics.
Generate a study plan with 4-6 core sections that build progressively:

1. Fundamental Prerequisites (math, programming, basic concepts needed)
2. Core Concepts (main ideas and methodologies from the paper)
3. Technical Implementation (how to actually implement the ideas)
4. Advanced Topics & Applications (deeper understanding and practical use)

JSON Structure:
{
  "title": "Study Plan: {title}",
  "sections": [
    {
      "topic": "Clear topic name",
      "timeRequired": "Estimated time",
      "description": "Clear, concise explanation",
      "prerequisites": ["Required knowledge"],
      "resources": [
        {
          "title": "Resource name",
          "url": "URL",
          "difficulty": "beginner/intermediate/advanced"
        }
      ],
      "exercises": [
        {
          "question": "Practice question",
          "type": "multiple-choice/open-ended/coding",
          "hint": "Helpful hint",
          "details": {
            "equations": ["Optional LaTeX equations"],
            "matrixData": [[1, 0], [0, 1]],
            "expectedOutput": "Optional expected output",
            "sampleInput": "Optional sample input"
          }
        }
      ]
    }
  ]
}

The "details" object is optional; include it only for mathematical or coding exercises.

Focus on:
1. Essential concepts only
2. Clear progression of topics
3. Practical understanding
4. Key implementation details
5. Actual paper content

Paper to analyze:
{content}

IMPORTANT:
- Output ONLY the JSON object, with no text before or after it
- Do NOT wrap the JSON in markdown fences
- Include only essential information
- Ensure valid JSON format
- Limit to 4-6 main sections"#;

static RE_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[^/.]+$").unwrap());

/// Derive the plan title from an upload's filename by stripping its final
/// extension: `"attention.pdf"` → `"attention"`, `"a.b.txt"` → `"a.b"`.
pub fn derive_title(file_name: &str) -> String {
    RE_EXTENSION.replace(file_name, "").into_owned()
}

/// Render the study-plan prompt for one paper.
///
/// Both substitutions happen in a single pass over the template, so a paper
/// that itself contains the text `{title}` is embedded unchanged.
pub fn build_prompt(title: &str, content: &str) -> String {
    let mut out = String::with_capacity(STUDY_PLAN_TEMPLATE.len() + title.len() + content.len());
    let mut rest = STUDY_PLAN_TEMPLATE;
    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix("{title}") {
            out.push_str(title);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{content}") {
            out.push_str(content);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}
