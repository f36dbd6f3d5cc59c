use std::{collections::HashMap, fs, path::PathBuf};

use labgrader::{
    criteria::{CriteriaError, CriteriaStore, DirCriteriaStore, GradingCriteria},
    grade::{FailureReport, LabGrader},
    workspace::{LocalWorkspace, SampleWorkspace, WorkspaceProvider},
};
use tempfile::TempDir;

/// In-memory criteria store for engine tests.
struct MapStore(HashMap<String, GradingCriteria>);

impl MapStore {
    fn with_lab(lab_id: &str, doc: &str) -> Self {
        let criteria = serde_yaml::from_str(doc).expect("decode criteria");
        Self(HashMap::from([(lab_id.to_string(), criteria)]))
    }
}

impl CriteriaStore for MapStore {
    fn load_criteria(&self, lab_id: &str) -> Result<GradingCriteria, CriteriaError> {
        self.0.get(lab_id).cloned().ok_or(CriteriaError::NotFound {
            lab: lab_id.to_string(),
        })
    }
}

fn fixture_labs_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("labs")
}

const TWO_OUTPUT_DOC: &str = r#"
name: "Two Outputs"
total_points: 100
outputs:
  - file: out1.txt
    description: "Line format"
    points: 50
    validation:
      type: file_match
      method: regex_match
      pattern: '^ok$'
      lines: 3
  - file: notes.txt
    description: "Required notes"
    points: 50
    validation:
      type: file_match
      method: content_subset
      must_contain: ["X", "Y"]
"#;

#[test]
fn grades_two_outputs_with_partial_credit() {
    let workspace = TempDir::new().expect("tempdir");
    fs::write(workspace.path().join("out1.txt"), "ok\nok\nok\n").expect("write out1");
    fs::write(workspace.path().join("notes.txt"), "only X appears").expect("write notes");

    let store = MapStore::with_lab("lab1", TWO_OUTPUT_DOC);
    let grader = LabGrader::builder()
        .store(&store)
        .workspace_root(workspace.path())
        .emit_json(false)
        .build();

    let report = grader.grade_lab("lab1").expect("grade lab1");
    assert_eq!(report.lab, "Two Outputs");
    assert_eq!(report.score, 75);
    assert_eq!(report.total, 100);
    assert_eq!(report.items.len(), 2);

    // Items keep the criteria's declared order.
    assert_eq!(report.items[0].name, "Line format");
    assert_eq!(report.items[0].points, 50);
    assert_eq!(report.items[1].name, "Required notes");
    assert_eq!(report.items[1].points, 25);
    assert_eq!(report.items[1].message, "Missing required elements: Y");
}

#[test]
fn score_is_sum_of_items_and_items_stay_bounded() {
    let workspace = TempDir::new().expect("tempdir");
    fs::write(workspace.path().join("out1.txt"), "ok\n").expect("write out1");
    // notes.txt left missing on purpose.

    let store = MapStore::with_lab("lab1", TWO_OUTPUT_DOC);
    let grader = LabGrader::builder()
        .store(&store)
        .workspace_root(workspace.path())
        .emit_json(false)
        .build();

    let report = grader.grade_lab("lab1").expect("grade lab1");
    let item_sum: u32 = report.items.iter().map(|item| item.points).sum();
    assert_eq!(report.score, item_sum);
    for item in &report.items {
        assert!(item.points <= item.possible);
    }

    // Missing file never aborts grading; it becomes a zero-point item.
    assert_eq!(report.items[1].points, 0);
    assert_eq!(report.items[1].message, "File not found");
}

#[test]
fn unknown_validation_type_contributes_a_zero_item() {
    let doc = r#"
name: "Odd Lab"
total_points: 20
outputs:
  - file: out.xml
    description: "XML output"
    points: 20
    validation:
      type: xml_match
      xpath: "//item"
"#;

    let workspace = TempDir::new().expect("tempdir");
    let store = MapStore::with_lab("odd", doc);
    let grader = LabGrader::builder()
        .store(&store)
        .workspace_root(workspace.path())
        .emit_json(false)
        .build();

    let report = grader.grade_lab("odd").expect("grade odd lab");
    assert_eq!(report.score, 0);
    assert_eq!(report.items[0].message, "Unknown validation method");
}

#[test]
fn leading_slash_in_output_path_is_stripped() {
    let doc = r#"
name: "Nested"
total_points: 10
outputs:
  - file: /sub/dir/out.txt
    description: "Nested output"
    points: 10
    validation:
      type: file_match
      method: content_subset
      must_contain: ["done"]
"#;

    let workspace = TempDir::new().expect("tempdir");
    let nested = workspace.path().join("sub").join("dir");
    fs::create_dir_all(&nested).expect("create nested dirs");
    fs::write(nested.join("out.txt"), "done").expect("write nested output");

    let store = MapStore::with_lab("nested", doc);
    let grader = LabGrader::builder()
        .store(&store)
        .workspace_root(workspace.path())
        .emit_json(false)
        .build();

    let report = grader.grade_lab("nested").expect("grade nested lab");
    assert_eq!(report.score, 10);
}

#[test]
fn criteria_load_failure_never_yields_a_report() {
    let workspace = TempDir::new().expect("tempdir");
    let store = MapStore(HashMap::new());
    let grader = LabGrader::builder()
        .store(&store)
        .workspace_root(workspace.path())
        .emit_json(false)
        .build();

    let err = grader.grade_lab("lab42").expect_err("no criteria for lab42");
    assert!(matches!(err, CriteriaError::NotFound { ref lab } if lab == "lab42"));
}

#[test]
fn half_fraction_points_round_away_from_zero() {
    let doc = r#"
name: "Boundary"
total_points: 25
outputs:
  - file: out.txt
    description: "Line format"
    points: 25
    validation:
      type: file_match
      method: regex_match
      pattern: '^ok$'
      lines: 2
"#;

    let workspace = TempDir::new().expect("tempdir");
    // One match against two expected lines gives the flat 0.5 fraction;
    // 0.5 * 25 = 12.5 must round up to 13, not to even.
    fs::write(workspace.path().join("out.txt"), "ok\n").expect("write out");

    let store = MapStore::with_lab("boundary", doc);
    let grader = LabGrader::builder()
        .store(&store)
        .workspace_root(workspace.path())
        .emit_json(false)
        .build();

    let report = grader.grade_lab("boundary").expect("grade boundary lab");
    assert_eq!(report.items[0].points, 13);
    assert_eq!(report.score, 13);
}

#[test]
fn failure_output_serializes_error_key_before_lab() {
    let failure = FailureReport::new("Lab lab42 not found or has no grading criteria", "unknown");
    let json = failure.to_json();

    let parsed: serde_json::Value = serde_json::from_str(&json).expect("failure json");
    assert_eq!(parsed["error"], "Lab lab42 not found or has no grading criteria");
    assert_eq!(parsed["lab"], "unknown");

    let error_pos = json.find("\"error\"").expect("error key");
    let lab_pos = json.find("\"lab\"").expect("lab key");
    assert!(error_pos < lab_pos);
}

#[test]
fn report_json_preserves_field_order() {
    let workspace = TempDir::new().expect("tempdir");
    fs::write(workspace.path().join("out1.txt"), "ok\nok\nok\n").expect("write out1");
    fs::write(workspace.path().join("notes.txt"), "X and Y").expect("write notes");

    let store = MapStore::with_lab("lab1", TWO_OUTPUT_DOC);
    let grader = LabGrader::builder()
        .store(&store)
        .workspace_root(workspace.path())
        .emit_json(false)
        .build();

    let report = grader.grade_lab("lab1").expect("grade lab1");
    let json = report.to_json().expect("serialize report");

    let lab_pos = json.find("\"lab\"").expect("lab key");
    let items_pos = json.find("\"items\"").expect("items key");
    let score_pos = json.find("\"score\"").expect("score key");
    let total_pos = json.find("\"total\"").expect("total key");
    assert!(lab_pos < items_pos && items_pos < score_pos && score_pos < total_pos);
}

#[test]
fn sample_workspace_grades_fixture_lab_to_full_marks() {
    let target = TempDir::new().expect("tempdir");
    let provider = SampleWorkspace::new(target.path());
    let root = provider
        .fetch_files("ws-123", "student")
        .expect("generate sample workspace");

    let store = DirCriteriaStore::new(fixture_labs_dir());
    let grader = LabGrader::builder()
        .store(&store)
        .workspace_root(root)
        .emit_json(false)
        .build();

    let report = grader.grade_lab("lab1").expect("grade lab1");
    assert_eq!(report.score, 100);
    assert_eq!(report.total, 100);
    assert_eq!(report.items.len(), 3);
    assert_eq!(report.items[0].message, "Correct format and content");
    assert_eq!(report.items[1].message, "File contains all required elements");
    assert_eq!(report.items[2].message, "JSON structure is valid");
}

#[test]
fn local_workspace_requires_an_existing_directory() {
    let dir = TempDir::new().expect("tempdir");
    let provider = LocalWorkspace::new(dir.path());
    let root = provider.fetch_files("ws", "student").expect("existing dir");
    assert_eq!(root, dir.path());

    let provider = LocalWorkspace::new(dir.path().join("missing"));
    assert!(provider.fetch_files("ws", "student").is_err());
}
