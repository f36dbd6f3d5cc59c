//! # labgrader
//!
//! A criteria-driven autograder for lab workspaces. A grading document
//! declares which artifacts a submission must produce and how each one is
//! validated; the engine scores every artifact, awards partial credit, and
//! returns an itemized report with human-readable feedback.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Typed grading criteria and the criteria store collaborator
pub mod criteria;
/// For all things related to grading
pub mod grade;
/// For accessing a submission's workspace file tree
pub mod workspace;

pub use criteria::{CriteriaError, CriteriaStore, DirCriteriaStore, GradingCriteria};
pub use grade::{FailureReport, LabGrader, Outcome, Report, ScoreItem};
pub use workspace::{LocalWorkspace, SampleWorkspace, WorkspaceProvider};
