//! # contract: collaborator interfaces of the render pipeline
//!
//! The pipeline in [`crate::pipeline`] never touches the filesystem, spawns a
//! process, or talks to a remote store directly. It goes through the three
//! traits defined here:
//!
//! - [`Renderer`]: runs the external renderer once against a project file.
//! - [`ArtifactVerifier`]: answers whether a path exists.
//! - [`Uploader`]: transfers a batch of rendered jobs and partitions the batch
//!   into succeeded and failed.
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall`, so tests (and downstream crates
//!   with the `test-export-mocks` feature) get `MockRenderer`,
//!   `MockArtifactVerifier` and `MockUploader`.
//!
//! ## Render destination
//! The renderer is told which project to render, never where to write. The
//! output location lives inside the project itself. Implementations of
//! [`Renderer`] must not be relied on to report the output path; the pipeline
//! always checks the job's configured `render_filepath`.

use async_trait::async_trait;
use std::path::Path;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::job::RenderJob;

/// Exit status of one renderer invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStatus {
    /// Process exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl RenderStatus {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for RenderStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// The renderer could not be launched at all.
#[derive(Debug, thiserror::Error)]
#[error("failed to launch renderer {binary}: {source}")]
pub struct RenderError {
    pub binary: String,
    #[source]
    pub source: std::io::Error,
}

/// Result of a batch upload. Every job handed to [`Uploader::upload_batch`]
/// ends up in exactly one of the two lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadPartition {
    pub succeeded: Vec<RenderJob>,
    pub failed: Vec<RenderJob>,
}

/// Invokes the external rendering application.
///
/// One call is one blocking process run. There is no timeout.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render a single project and report how the process exited.
    async fn invoke(&self, project_filepath: &Path) -> Result<RenderStatus, RenderError>;
}

/// Existence checks for project files and render artifacts.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait ArtifactVerifier: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
}

/// Transfers rendered artifacts to their destination.
///
/// Implementations may upload item by item internally, but must answer with
/// a single partition of the whole batch.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload_batch(&self, jobs: Vec<RenderJob>) -> UploadPartition;
}
