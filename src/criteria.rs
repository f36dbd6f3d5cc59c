#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fs, io, path::PathBuf};

use serde::{Deserialize, Serialize};

/// A grading document for one lab: a display name, the declared point total,
/// and the ordered list of artifacts the submission must produce.
///
/// Loaded once per grading run and immutable thereafter. Only structural
/// validation happens at load time; `total_points` is not cross-checked
/// against the item sum (see [`GradingCriteria::declared_points_mismatch`]).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GradingCriteria {
    /// Display name of the lab, copied into the report's `lab` field.
    pub name:         String,
    /// Declared point total for the lab.
    pub total_points: u32,
    /// Graded artifacts, in the order they appear in the report.
    pub outputs:      Vec<OutputRequirement>,
}

impl GradingCriteria {
    /// Returns `(declared, actual)` when `total_points` disagrees with the
    /// sum of the individual output points, `None` when they match.
    pub fn declared_points_mismatch(&self) -> Option<(u32, u32)> {
        let actual = self.outputs.iter().map(|output| output.points).sum::<u32>();
        (actual != self.total_points).then_some((self.total_points, actual))
    }
}

/// One graded artifact expected in the workspace.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OutputRequirement {
    /// Path of the artifact relative to the workspace root. A leading slash
    /// is tolerated and stripped when the path is resolved.
    pub file:        String,
    /// Display name for the report item.
    pub description: String,
    /// Maximum points achievable for this artifact.
    pub points:      u32,
    /// How the artifact's contents are validated.
    pub validation:  ValidationRule,
}

/// The validation strategy attached to an output requirement.
///
/// Decodes from the grading document's `validation` map, tagged by `type`.
/// An unrecognized `type` decodes into [`ValidationRule::Unknown`] rather
/// than failing the load; it scores zero at grading time.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationRule {
    /// Inspect the file's text content with the nested match method.
    FileMatch {
        /// The match method and its parameters, tagged by `method`.
        #[serde(flatten)]
        method: FileMatchMethod,
    },
    /// Parse the file as JSON and validate it against a schema document.
    JsonSchema {
        /// The JSON Schema the parsed document must conform to.
        schema: serde_json::Value,
    },
    /// Any unrecognized `type` value, kept verbatim for diagnostics.
    #[serde(untagged)]
    Unknown(serde_json::Value),
}

/// Parameters for the `file_match` validation type, tagged by `method`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum FileMatchMethod {
    /// Count non-overlapping matches of a pattern across the file, with
    /// `^`/`$` anchoring at line boundaries.
    RegexMatch {
        /// The regular expression, applied in multi-line mode.
        pattern: String,
        /// Expected number of matches. Defaults to zero when omitted.
        #[serde(default)]
        lines:   usize,
    },
    /// Require a set of substrings to appear in the file.
    ContentSubset {
        /// Required substrings, in the order they are reported when missing.
        must_contain: Vec<String>,
    },
    /// Any unrecognized `method` value, kept verbatim for diagnostics.
    #[serde(untagged)]
    Unknown(serde_json::Value),
}

/// An enum to represent possible errors when loading grading criteria.
///
/// These are the only errors that abort a grading run; everything discovered
/// while inspecting an individual artifact is absorbed into that item's
/// score and message instead.
#[derive(thiserror::Error, Debug)]
pub enum CriteriaError {
    /// The identified lab has no grading criteria document.
    #[error("Lab {lab} not found or has no grading criteria")]
    NotFound {
        /// The lab identifier that was requested.
        lab: String,
    },
    /// The criteria document exists but is not structurally valid.
    #[error("Grading criteria for lab {lab} could not be parsed: {source}")]
    Malformed {
        /// The lab identifier that was requested.
        lab:    String,
        /// The underlying decode error.
        #[source]
        source: serde_yaml::Error,
    },
    /// The criteria document could not be read for a reason other than
    /// not existing.
    #[error("Could not read grading criteria for lab {lab}: {source}")]
    Io {
        /// The lab identifier that was requested.
        lab:    String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Source of grading criteria documents, keyed by lab identifier.
pub trait CriteriaStore {
    /// Loads the grading criteria for `lab_id`.
    fn load_criteria(&self, lab_id: &str) -> Result<GradingCriteria, CriteriaError>;
}

/// A criteria store backed by a directory of `<lab>-grading.yaml` documents.
#[derive(Debug, Clone)]
pub struct DirCriteriaStore {
    /// Directory holding one grading document per lab.
    labs_dir: PathBuf,
}

impl DirCriteriaStore {
    /// Creates a store reading documents from `labs_dir`.
    pub fn new(labs_dir: impl Into<PathBuf>) -> Self {
        Self {
            labs_dir: labs_dir.into(),
        }
    }

    /// Returns the expected document path for `lab_id`.
    fn criteria_path(&self, lab_id: &str) -> PathBuf {
        self.labs_dir.join(format!("{lab_id}-grading.yaml"))
    }
}

impl CriteriaStore for DirCriteriaStore {
    fn load_criteria(&self, lab_id: &str) -> Result<GradingCriteria, CriteriaError> {
        let path = self.criteria_path(lab_id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CriteriaError::NotFound {
                    lab: lab_id.to_string(),
                });
            }
            Err(e) => {
                return Err(CriteriaError::Io {
                    lab:    lab_id.to_string(),
                    source: e,
                });
            }
        };

        serde_yaml::from_str(&raw).map_err(|source| CriteriaError::Malformed {
            lab: lab_id.to_string(),
            source,
        })
    }
}
