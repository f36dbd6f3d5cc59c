#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use anyhow::{Context, Result};
use bon::Builder;
use serde::{Deserialize, Serialize};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};

/// The graded result for a single output requirement.
#[derive(Tabled, Serialize, Deserialize, Builder, Clone, Debug)]
#[builder(on(String, into))]
pub struct ScoreItem {
    /// Display name of the requirement, taken from its description.
    #[tabled(rename = "Requirement")]
    pub name:     String,
    /// Points awarded, already rounded; never exceeds `possible`.
    #[tabled(rename = "Points")]
    pub points:   u32,
    /// Maximum points achievable for this requirement.
    #[tabled(rename = "Possible")]
    pub possible: u32,
    /// Feedback explaining the awarded points.
    #[tabled(rename = "Message")]
    pub message:  String,
}

/// The itemized result of one grading run.
///
/// Field order matters: the emitted JSON must read `lab`, `items`, `score`,
/// `total` so callers parsing captured logs see a stable shape.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Report {
    /// Display name of the graded lab.
    pub lab:   String,
    /// One entry per output requirement, in the criteria's declared order.
    pub items: Vec<ScoreItem>,
    /// Sum of the item points.
    pub score: u32,
    /// The criteria's declared point total.
    pub total: u32,
}

impl Report {
    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Could not serialize grading report")
    }

    /// Renders the itemized results as a table on stderr, with the running
    /// total in the footer.
    pub fn show_table(&self) {
        eprintln!(
            "{}",
            Table::new(&self.items)
                .with(Panel::header(format!("Grading Overview: {}", self.lab)))
                .with(Panel::footer(format!("Total: {}/{}", self.score, self.total)))
                .with(Modify::new(Rows::new(1..)).with(Width::wrap(32).keep_words(true)))
                .with(
                    Modify::new(Rows::first())
                        .with(Alignment::center())
                        .with(Alignment::center_vertical()),
                )
                .with(
                    Modify::new(Rows::last())
                        .with(Alignment::center())
                        .with(Alignment::center_vertical()),
                )
                .with(Style::modern())
        );
    }
}

/// The error-shaped output emitted when no report can be produced.
///
/// Callers discriminate between this and [`Report`] by the presence of the
/// `error` key.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FailureReport {
    /// Human-readable description of the fatal failure.
    pub error: String,
    /// The lab identifier, or `"unknown"` when none was available.
    pub lab:   String,
}

impl FailureReport {
    /// Creates a failure output for the given lab.
    pub fn new(error: impl Into<String>, lab: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            lab:   lab.into(),
        }
    }

    /// Serializes the failure as pretty-printed JSON. Serialization of two
    /// plain strings cannot realistically fail, but falls back to a fixed
    /// shape rather than panicking.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| {
            String::from("{\n  \"error\": \"report serialization failed\",\n  \"lab\": \"unknown\"\n}")
        })
    }
}
