#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::PathBuf;

use bon::Builder;

use super::{
    results::{Report, ScoreItem},
    validate::run_validation,
};
use crate::criteria::{CriteriaError, CriteriaStore};

/// The scoring engine for one grading run.
///
/// Pulls criteria from the store, validates every output requirement against
/// the workspace, and aggregates the outcomes into a [`Report`]. Individual
/// artifact problems never abort the run; only criteria loading can fail.
#[derive(Builder)]
pub struct LabGrader<'a> {
    /// Where grading criteria documents are loaded from.
    store:          &'a dyn CriteriaStore,
    /// Root of the submission's materialized file tree.
    #[builder(into)]
    workspace_root: PathBuf,
    /// Whether to print the serialized report to stdout for log capture.
    #[builder(default = true)]
    emit_json:      bool,
}

impl LabGrader<'_> {
    /// Grades the lab identified by `lab_id`.
    ///
    /// Every requirement is evaluated and reported in the criteria's
    /// declared order; a zero-scoring item never short-circuits the rest.
    /// Points are computed as `fraction * possible`, rounded half away from
    /// zero. When `emit_json` is set the report is also printed to stdout as
    /// a side channel, with a stable field order for machine parsing.
    pub fn grade_lab(&self, lab_id: &str) -> Result<Report, CriteriaError> {
        let criteria = self.store.load_criteria(lab_id)?;

        if let Some((declared, actual)) = criteria.declared_points_mismatch() {
            tracing::warn!(
                "Criteria for lab {lab_id} declare {declared} total points but outputs sum to \
                 {actual}"
            );
        }

        let mut items = Vec::with_capacity(criteria.outputs.len());
        let mut score = 0u32;

        for output in &criteria.outputs {
            let path = self
                .workspace_root
                .join(output.file.trim_start_matches('/'));
            let outcome = run_validation(&path, &output.validation);
            let points = (outcome.fraction * f64::from(output.points)).round() as u32;
            score += points;

            items.push(
                ScoreItem::builder()
                    .name(output.description.clone())
                    .points(points)
                    .possible(output.points)
                    .message(outcome.message)
                    .build(),
            );
        }

        let report = Report {
            lab: criteria.name.clone(),
            items,
            score,
            total: criteria.total_points,
        };

        if self.emit_json {
            match report.to_json() {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::warn!("Could not emit report for log capture: {e}"),
            }
        }

        Ok(report)
    }
}
