#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, ensure};
use serde_json::json;

/// Capability for materializing a submission's files on the local
/// filesystem.
///
/// The engine only ever reads files under the returned root; how they get
/// there (workspace pod, volume mount, generated samples) is this
/// collaborator's concern.
pub trait WorkspaceProvider {
    /// Makes the files for `workspace_id` available locally and returns the
    /// workspace root.
    fn fetch_files(&self, workspace_id: &str, username: &str) -> Result<PathBuf>;
}

/// A workspace whose files are already present on the local filesystem, e.g.
/// a mounted volume.
#[derive(Debug, Clone)]
pub struct LocalWorkspace {
    /// The existing workspace root.
    root: PathBuf,
}

impl LocalWorkspace {
    /// Creates a provider over an already-materialized directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl WorkspaceProvider for LocalWorkspace {
    fn fetch_files(&self, _workspace_id: &str, _username: &str) -> Result<PathBuf> {
        ensure!(
            self.root.is_dir(),
            "Workspace directory {} does not exist",
            self.root.display()
        );
        Ok(self.root.clone())
    }
}

/// Stand-in provider that generates the demo lab1 artifacts instead of
/// copying files out of a real student workspace.
// TODO: replace with a provider that execs into the workspace pod and copies
// the files out.
#[derive(Debug, Clone)]
pub struct SampleWorkspace {
    /// Directory the sample files are generated into.
    target: PathBuf,
}

impl SampleWorkspace {
    /// Creates a provider generating sample files under `target`.
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Writes `content` to `path`, creating parent directories as needed.
    fn write(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Could not create {}", parent.display()))?;
        }
        fs::write(path, content).with_context(|| format!("Could not write {}", path.display()))
    }
}

impl WorkspaceProvider for SampleWorkspace {
    fn fetch_files(&self, workspace_id: &str, username: &str) -> Result<PathBuf> {
        tracing::info!(
            "Generating sample workspace files for {workspace_id} (user: {username})"
        );

        let lab_dir = self.target.join("lab1");

        let toptalker = "192.168.1.45  1542000 TCP\n\
                         10.0.0.12  982340 UDP\n\
                         172.16.54.3  892311 TCP\n\
                         192.168.12.132  723456 TCP\n\
                         10.0.0.36  523987 TCP\n\
                         172.16.34.55  433210 UDP\n\
                         192.168.23.78  387652 TCP\n\
                         10.0.2.15  297834 TCP\n\
                         172.16.34.27  198732 TCP\n\
                         192.168.1.12  98453 UDP\n";
        Self::write(&lab_dir.join("toptalker.txt"), toptalker)?;

        Self::write(
            &lab_dir.join("blocked_ips.txt"),
            "192.168.1.45\n10.0.0.123\n172.16.12.34\n",
        )?;

        let report = json!({
            "timestamp": "2025-04-17T10:25:43Z",
            "total_connections": 1432,
            "suspicious_activity": [
                {"ip": "192.168.1.45", "reason": "Multiple failed login attempts"},
                {"ip": "10.0.0.123", "reason": "Port scanning activity"}
            ]
        });
        Self::write(
            &lab_dir.join("report.json"),
            &serde_json::to_string_pretty(&report).context("Could not serialize sample report")?,
        )?;

        Ok(self.target.clone())
    }
}
