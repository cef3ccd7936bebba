//! Render job model: the unit of work read from config, and the per-job
//! failure record produced by the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One unit of work: a project file to render and the output file the
/// project is expected to produce.
///
/// Any extra fields present in the config entry are kept in `metadata` and
/// written back out unchanged in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderJob {
    pub project_filepath: PathBuf,
    pub render_filepath: PathBuf,
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl RenderJob {
    pub fn new(project_filepath: impl Into<PathBuf>, render_filepath: impl Into<PathBuf>) -> Self {
        Self {
            project_filepath: project_filepath.into(),
            render_filepath: render_filepath.into(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Jobs are identified by their project file.
    pub fn id(&self) -> &std::path::Path {
        &self.project_filepath
    }
}

/// Why a single job did not make it through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The project file was absent; the renderer was never invoked.
    ProjectMissing,
    /// The renderer exited successfully but the expected output is absent.
    OutputMissing,
    /// The renderer exited non-zero and the run records engine failures per job.
    RenderFailed { code: Option<i32> },
    /// The uploader placed the job in the failed side of its partition.
    UploadFailed,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ProjectMissing => write!(f, "project missing"),
            FailureReason::OutputMissing => write!(
                f,
                "output missing after render — verify render destination configured in project"
            ),
            FailureReason::RenderFailed { code: Some(code) } => {
                write!(f, "render failed with exit code {code}")
            }
            FailureReason::RenderFailed { code: None } => {
                write!(f, "render failed: terminated by signal")
            }
            FailureReason::UploadFailed => write!(f, "upload failed"),
        }
    }
}

/// A job paired with the reason it failed.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedJob {
    pub job: RenderJob,
    pub reason: FailureReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_reasons_render_as_report_tags() {
        assert_eq!(FailureReason::ProjectMissing.to_string(), "project missing");
        assert!(FailureReason::OutputMissing
            .to_string()
            .starts_with("output missing after render"));
        assert_eq!(FailureReason::UploadFailed.to_string(), "upload failed");
        assert_eq!(
            FailureReason::RenderFailed { code: Some(3) }.to_string(),
            "render failed with exit code 3"
        );
    }

    #[test]
    fn signal_terminated_render_has_its_own_tag() {
        assert_eq!(
            FailureReason::RenderFailed { code: None }.to_string(),
            "render failed: terminated by signal"
        );
    }

    #[test]
    fn extra_job_fields_are_kept() {
        let raw = r#"{
            "project_filepath": "/projects/a.rpp",
            "render_filepath": "/renders/a.wav",
            "title": "Intro",
            "bpm": 120
        }"#;
        let job: RenderJob = serde_json::from_str(raw).unwrap();
        assert_eq!(job.id(), std::path::Path::new("/projects/a.rpp"));
        assert_eq!(job.metadata["title"], "Intro");
        assert_eq!(job.metadata["bpm"], 120);

        let back = serde_json::to_value(&job).unwrap();
        assert_eq!(back["title"], "Intro");
        assert_eq!(back["render_filepath"], "/renders/a.wav");
    }
}
