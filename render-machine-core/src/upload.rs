//! Upload stand-in.
//!
//! There is no remote store wired up yet. [`PassthroughUploader`] accepts
//! every job and reports it as uploaded, which keeps the batch partition
//! contract of [`Uploader`] intact for the pipeline and the report.

use async_trait::async_trait;
use tracing::info;

use crate::contract::{UploadPartition, Uploader};
use crate::job::RenderJob;

#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughUploader;

#[async_trait]
impl Uploader for PassthroughUploader {
    async fn upload_batch(&self, jobs: Vec<RenderJob>) -> UploadPartition {
        for job in &jobs {
            info!(render = %job.render_filepath.display(), "[UPLOAD] Accepted render artifact");
        }
        UploadPartition {
            succeeded: jobs,
            failed: Vec::new(),
        }
    }
}
