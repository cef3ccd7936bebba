//! Run report: the JSON file written at the end of a run and the short
//! summary printed to the console.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

use crate::job::RenderJob;
use crate::pipeline::PipelineOutcome;

/// Prefix of every report file; the run date follows it directly.
pub const REPORT_FILE_PREFIX: &str = "render_results";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("report JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persisted result of one run. `failed_files` entries are `[job, reason]`
/// pairs in processing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub rendered_files: Vec<RenderJob>,
    pub uploaded_files: Vec<RenderJob>,
    pub failed_files: Vec<(RenderJob, String)>,
}

impl From<&PipelineOutcome> for Report {
    fn from(outcome: &PipelineOutcome) -> Self {
        Self {
            rendered_files: outcome.rendered.clone(),
            uploaded_files: outcome.uploaded.clone(),
            failed_files: outcome
                .failed
                .iter()
                .map(|f| (f.job.clone(), f.reason.to_string()))
                .collect(),
        }
    }
}

impl From<PipelineOutcome> for Report {
    fn from(outcome: PipelineOutcome) -> Self {
        Report::from(&outcome)
    }
}

/// Report file name for a run date: `render_results` followed by year, day
/// and month (`%Y%d%m`), no extension.
pub fn report_file_name(date: NaiveDate) -> String {
    format!("{REPORT_FILE_PREFIX}{}", date.format("%Y%d%m"))
}

impl Report {
    /// Counts printed at the end of a run.
    pub fn summary(&self) -> String {
        format!(
            "Rendered: {}\nUploaded: {}\nFailed: {}",
            self.rendered_files.len(),
            self.uploaded_files.len(),
            self.failed_files.len()
        )
    }

    /// Write the report into `dir`, replacing any report of the same date.
    pub fn write(&self, dir: &Path, date: NaiveDate) -> Result<PathBuf, ReportError> {
        let path = dir.join(report_file_name(date));
        let body = serde_json::to_vec(self)?;
        fs::write(&path, body).map_err(|e| {
            error!(error = ?e, path = %path.display(), "[REPORT][ERROR] Failed to write report");
            ReportError::Io {
                path: path.clone(),
                source: e,
            }
        })?;
        info!(path = %path.display(), "[REPORT] Report written");
        Ok(path)
    }

    pub fn read(path: &Path) -> Result<Self, ReportError> {
        let content = fs::read_to_string(path).map_err(|e| ReportError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_puts_day_before_month() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(report_file_name(date), "render_results20240703");
    }

    #[test]
    fn summary_lists_counts() {
        let report = Report {
            rendered_files: vec![RenderJob::new("a.rpp", "a.wav")],
            uploaded_files: vec![RenderJob::new("a.rpp", "a.wav")],
            failed_files: vec![(RenderJob::new("b.rpp", "b.wav"), "project missing".into())],
        };
        assert_eq!(report.summary(), "Rendered: 1\nUploaded: 1\nFailed: 1");
    }

    #[test]
    fn failed_entries_serialise_as_pairs() {
        let report = Report {
            rendered_files: vec![],
            uploaded_files: vec![],
            failed_files: vec![(RenderJob::new("b.rpp", "b.wav"), "project missing".into())],
        };
        let value = serde_json::to_value(&report).unwrap();
        let entry = &value["failed_files"][0];
        assert_eq!(entry[0]["project_filepath"], "b.rpp");
        assert_eq!(entry[1], "project missing");
    }
}
