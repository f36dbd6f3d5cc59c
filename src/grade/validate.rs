#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fs, path::Path};

use itertools::Itertools;
use jsonschema::JSONSchema;
use regex::RegexBuilder;

use crate::criteria::{FileMatchMethod, ValidationRule};

/// The outcome of validating a single workspace artifact: a partial-credit
/// fraction in `[0, 1]` and a feedback message.
///
/// Artifact problems (missing file, malformed JSON, schema mismatch, unknown
/// rule) are outcomes, never errors; they degrade the item's score without
/// aborting the grading run.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Fraction of the requirement's points earned, in `[0, 1]`.
    pub fraction: f64,
    /// Feedback explaining the fraction.
    pub message:  String,
}

impl Outcome {
    /// Creates an outcome from a fraction and message.
    pub fn new(fraction: f64, message: impl Into<String>) -> Self {
        Self {
            fraction,
            message: message.into(),
        }
    }

    /// The universal missing-file outcome, identical for every validator.
    fn missing_file() -> Self {
        Self::new(0.0, "File not found")
    }

    /// The outcome for an unrecognized validation type or match method.
    fn unknown_method() -> Self {
        Self::new(0.0, "Unknown validation method")
    }
}

/// Dispatches `rule` to the matching validator for the artifact at `path`.
///
/// An unknown rule type scores zero without touching the filesystem.
pub fn run_validation(path: &Path, rule: &ValidationRule) -> Outcome {
    match rule {
        ValidationRule::FileMatch { method } => validate_file_match(path, method),
        ValidationRule::JsonSchema { schema } => validate_json_schema(path, schema),
        ValidationRule::Unknown(_) => Outcome::unknown_method(),
    }
}

/// Validates a text artifact with a pattern or content-subset method.
///
/// The missing-file check runs before any method-specific logic, so an
/// unknown `method` on an absent file still reports "File not found".
pub fn validate_file_match(path: &Path, method: &FileMatchMethod) -> Outcome {
    if !path.exists() {
        return Outcome::missing_file();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Outcome::new(0.0, "File could not be read as text"),
    };

    match method {
        FileMatchMethod::RegexMatch { pattern, lines } => {
            let re = match RegexBuilder::new(pattern).multi_line(true).build() {
                Ok(re) => re,
                Err(e) => return Outcome::new(0.0, format!("Invalid validation pattern: {e}")),
            };

            let found = re.find_iter(&content).count();
            if found == *lines {
                Outcome::new(1.0, "Correct format and content")
            } else {
                // Over- and under-matching score identically; there is no
                // graduated closeness credit.
                Outcome::new(
                    0.5,
                    format!(
                        "Content partially matches format. Found {found} matching lines out of \
                         {lines} expected."
                    ),
                )
            }
        }
        FileMatchMethod::ContentSubset { must_contain } => {
            let missing = must_contain
                .iter()
                .filter(|required| !content.contains(required.as_str()))
                .collect::<Vec<_>>();

            // An empty must_contain list is vacuously satisfied.
            if missing.is_empty() {
                Outcome::new(1.0, "File contains all required elements")
            } else {
                let fraction =
                    (must_contain.len() - missing.len()) as f64 / must_contain.len() as f64;
                Outcome::new(
                    fraction,
                    format!("Missing required elements: {}", missing.iter().join(", ")),
                )
            }
        }
        FileMatchMethod::Unknown(_) => Outcome::unknown_method(),
    }
}

/// Validates a JSON artifact against a schema document.
///
/// A syntactically broken file scores zero outright. On schema failure, only
/// the schema's top-level `required` list drives partial credit: absent
/// required fields earn a proportional fraction, while a document that has
/// every required field but still fails the full schema (wrong types,
/// pattern mismatches) is pinned at 0.5 with the raw validation error.
pub fn validate_json_schema(path: &Path, schema: &serde_json::Value) -> Outcome {
    if !path.exists() {
        return Outcome::missing_file();
    }

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return Outcome::new(0.0, "File could not be read as text"),
    };

    let data: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(data) => data,
        Err(_) => return Outcome::new(0.0, "File is not valid JSON"),
    };

    let compiled = match JSONSchema::compile(schema) {
        Ok(compiled) => compiled,
        Err(e) => return Outcome::new(0.0, format!("JSON schema validation failed: {e}")),
    };

    let first_error = match compiled.validate(&data) {
        Ok(()) => return Outcome::new(1.0, "JSON structure is valid"),
        Err(mut errors) => errors
            .next()
            .map(|e| e.to_string())
            .unwrap_or_else(|| String::from("schema validation failed")),
    };

    let required = schema
        .get("required")
        .and_then(|fields| fields.as_array())
        .map(|fields| {
            fields
                .iter()
                .filter_map(|field| field.as_str())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if required.is_empty() {
        return Outcome::new(0.0, format!("JSON schema validation failed: {first_error}"));
    }

    let missing = required
        .iter()
        .copied()
        .filter(|field| data.get(*field).is_none())
        .collect::<Vec<_>>();

    if missing.is_empty() {
        Outcome::new(0.5, format!("JSON schema validation failed: {first_error}"))
    } else {
        let fraction = (required.len() - missing.len()) as f64 / required.len() as f64;
        Outcome::new(
            fraction,
            format!("Missing required fields: {}", missing.iter().join(", ")),
        )
    }
}
