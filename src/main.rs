#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # labgrader
//!
//! Worker binary for the lab grading system. Resolves its parameters from
//! the command line with environment-variable fallbacks, grades one
//! submission, and prints the itemized report as JSON for log capture. On
//! any fatal failure it prints an error-shaped JSON object instead and
//! exits non-zero; callers discriminate the two shapes by the `error` key.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use bpaf::*;
use dotenvy::dotenv;
use labgrader::{
    criteria::DirCriteriaStore,
    grade::{FailureReport, LabGrader, Report},
    workspace::{SampleWorkspace, WorkspaceProvider},
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Parsed worker options.
#[derive(Debug, Clone)]
struct Opts {
    /// Identifier of the lab to grade.
    lab_id:        Option<String>,
    /// Identifier of the student's workspace.
    workspace_id:  Option<String>,
    /// Name of the submitting user.
    username:      Option<String>,
    /// Directory holding `<lab>-grading.yaml` documents.
    labs_dir:      PathBuf,
    /// Directory the workspace files are materialized into.
    workspace_dir: PathBuf,
    /// Whether to also render the itemized score table on stderr.
    show_table:    bool,
    /// Whether to suppress the report JSON side channel on stdout.
    no_emit:       bool,
}

/// Parse the command line arguments, falling back to the environment for
/// every grading parameter.
fn options() -> Opts {
    let lab_id = long("lab")
        .env("LAB_ID")
        .help("Identifier of the lab to grade")
        .argument::<String>("LAB_ID")
        .optional();

    let workspace_id = long("workspace-id")
        .env("WORKSPACE_ID")
        .help("Identifier of the student's workspace")
        .argument::<String>("WORKSPACE_ID")
        .optional();

    let username = long("user")
        .env("USERNAME")
        .help("Name of the submitting user")
        .argument::<String>("USERNAME")
        .optional();

    let labs_dir = long("labs-dir")
        .env("LABS_DIR")
        .help("Directory holding <lab>-grading.yaml documents")
        .argument::<PathBuf>("DIR")
        .fallback(PathBuf::from("/labs"));

    let workspace_dir = long("workspace-dir")
        .env("WORKSPACE_DIR")
        .help("Directory the workspace files are materialized into")
        .argument::<PathBuf>("DIR")
        .fallback(PathBuf::from("/tmp/workspace"));

    let show_table = long("show-table")
        .help("Also render the itemized score table on stderr")
        .switch();

    let no_emit = long("no-emit")
        .help("Suppress printing the report JSON to stdout")
        .switch();

    construct!(Opts {
        lab_id,
        workspace_id,
        username,
        labs_dir,
        workspace_dir,
        show_table,
        no_emit
    })
    .to_options()
    .descr("Criteria-driven lab grading worker")
    .run()
}

/// Runs one grading pass and returns the report.
fn run(opts: &Opts) -> Result<Report> {
    let (Some(lab_id), Some(workspace_id), Some(username)) =
        (&opts.lab_id, &opts.workspace_id, &opts.username)
    else {
        bail!("Missing required parameters: LAB_ID, WORKSPACE_ID, and USERNAME must be provided");
    };

    tracing::info!("Grading lab {lab_id} for workspace {workspace_id} (user: {username})");

    let provider = SampleWorkspace::new(&opts.workspace_dir);
    let workspace_root = provider
        .fetch_files(workspace_id, username)
        .context("Could not access workspace files")?;

    let store = DirCriteriaStore::new(&opts.labs_dir);
    let grader = LabGrader::builder()
        .store(&store)
        .workspace_root(workspace_root)
        .emit_json(!opts.no_emit)
        .build();

    let report = grader.grade_lab(lab_id)?;

    if opts.show_table {
        report.show_table();
    }

    tracing::info!("Grading complete. Score: {}/{}", report.score, report.total);
    Ok(report)
}

fn main() {
    dotenv().ok();

    // Logs go to stderr; stdout carries only the report or failure JSON so
    // callers can parse captured output.
    let fmt = fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let opts = options();

    if let Err(e) = run(&opts) {
        tracing::error!("Grading failed: {e}");
        let lab = opts.lab_id.as_deref().unwrap_or("unknown");
        println!("{}", FailureReport::new(e.to_string(), lab).to_json());
        std::process::exit(1);
    }
}
