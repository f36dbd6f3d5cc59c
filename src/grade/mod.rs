#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// The scoring engine that turns criteria and a workspace into a report.
pub mod engine;
/// Score item, report, and failure-output types.
pub mod results;
/// Validation strategies for individual workspace artifacts.
pub mod validate;

pub use engine::LabGrader;
pub use results::{FailureReport, Report, ScoreItem};
pub use validate::{Outcome, run_validation, validate_file_match, validate_json_schema};
