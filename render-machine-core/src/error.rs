use std::path::PathBuf;
use thiserror::Error;

use crate::contract::RenderError;

/// Errors that abort a whole pipeline run. Per-job problems are recorded as
/// [`crate::job::FailureReason`] instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("render of {} failed with exit code {}", .project.display(), describe_code(.code))]
    EngineFailure {
        project: PathBuf,
        code: Option<i32>,
    },

    #[error("renderer could not be started for {}: {source}", .project.display())]
    EngineLaunch {
        project: PathBuf,
        #[source]
        source: RenderError,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}
