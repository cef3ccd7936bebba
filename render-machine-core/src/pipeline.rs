//! High-level pipeline: orchestrates render → verify → upload for a job list.
//!
//! This module drives every configured [`RenderJob`] through the same
//! sequence and keeps the bookkeeping of what happened to each one:
//!   - Checks the project file exists (missing ⇒ per-job failure, nothing rendered)
//!   - Invokes the external renderer through [`Renderer`]
//!   - Checks the job's configured output path through [`ArtifactVerifier`]
//!   - Uploads every verified job in one batch through [`Uploader`]
//!
//! # Major Types
//! - [`PipelineOutcome`]: the three outcome lists of a run
//! - [`RenderErrorPolicy`]: what a non-zero renderer exit means for the run
//!
//! # Ordering
//! Jobs are processed one at a time, in input order. The upload happens once,
//! after every job has been attempted. Render-stage failures appear in
//! `failed` in processing order, followed by upload failures in the order the
//! uploader returned them. Partition entries that were not in the batch,
//! repeat, or sit on both sides are logged and ignored; a job on both sides
//! counts as uploaded.
//!
//! # Error Handling
//! A missing project, a missing output and an upload rejection are recorded
//! per job and the run continues. A renderer that cannot be launched always
//! aborts the run with [`PipelineError::EngineLaunch`]. A renderer that exits
//! non-zero aborts with [`PipelineError::EngineFailure`] under
//! [`RenderErrorPolicy::Abort`], and is recorded per job under
//! [`RenderErrorPolicy::Record`].

use tracing::{error, info, warn};

use crate::contract::{ArtifactVerifier, Renderer, Uploader};
use crate::error::PipelineError;
use crate::job::{FailedJob, FailureReason, RenderJob};

/// How a non-zero renderer exit is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderErrorPolicy {
    /// Stop the whole run.
    #[default]
    Abort,
    /// Record the job as failed and carry on with the next one.
    Record,
}

/// What happened to every job of a run.
///
/// `rendered` holds every job that passed verification, whatever its upload
/// result. `uploaded` is always a subset of `rendered`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutcome {
    pub rendered: Vec<RenderJob>,
    pub uploaded: Vec<RenderJob>,
    pub failed: Vec<FailedJob>,
}

impl PipelineOutcome {
    fn fail(&mut self, stage: &str, job: &RenderJob, reason: FailureReason) {
        warn!(
            project = %job.project_filepath.display(),
            reason = %reason,
            "[{stage}] Job failed"
        );
        self.failed.push(FailedJob {
            job: job.clone(),
            reason,
        });
    }
}

/// Run every job through render, verification and upload.
pub async fn process<R, V, U>(
    jobs: &[RenderJob],
    renderer: &R,
    verifier: &V,
    uploader: &U,
    policy: RenderErrorPolicy,
) -> Result<PipelineOutcome, PipelineError>
where
    R: Renderer + ?Sized,
    V: ArtifactVerifier + ?Sized,
    U: Uploader + ?Sized,
{
    info!(jobs = jobs.len(), ?policy, "[RENDER] Starting render pipeline");
    let mut outcome = PipelineOutcome::default();

    for job in jobs {
        // --- Step 1: Project present ---
        if !verifier.exists(&job.project_filepath) {
            outcome.fail("RENDER", job, FailureReason::ProjectMissing);
            continue;
        }

        // --- Step 2: Render ---
        let status = renderer
            .invoke(&job.project_filepath)
            .await
            .map_err(|source| {
                error!(
                    project = %job.project_filepath.display(),
                    error = %source,
                    "[RENDER][ERROR] Renderer launch failed, aborting run"
                );
                PipelineError::EngineLaunch {
                    project: job.project_filepath.clone(),
                    source,
                }
            })?;

        if !status.success() {
            match policy {
                RenderErrorPolicy::Abort => {
                    error!(
                        project = %job.project_filepath.display(),
                        code = ?status.code,
                        "[RENDER][ERROR] Renderer failed, aborting run"
                    );
                    return Err(PipelineError::EngineFailure {
                        project: job.project_filepath.clone(),
                        code: status.code,
                    });
                }
                RenderErrorPolicy::Record => {
                    outcome.fail("RENDER", job, FailureReason::RenderFailed { code: status.code });
                    continue;
                }
            }
        }

        // --- Step 3: Verify the configured output path ---
        if verifier.exists(&job.render_filepath) {
            info!(
                project = %job.project_filepath.display(),
                render = %job.render_filepath.display(),
                "[VERIFY] Render output present"
            );
            outcome.rendered.push(job.clone());
        } else {
            outcome.fail("VERIFY", job, FailureReason::OutputMissing);
        }
    }

    // --- Step 4: Batch upload ---
    if outcome.rendered.is_empty() {
        info!("[UPLOAD] Nothing rendered, skipping upload");
    } else {
        let batch_len = outcome.rendered.len();
        info!(jobs = batch_len, "[UPLOAD] Uploading rendered jobs");
        let partition = uploader.upload_batch(outcome.rendered.clone()).await;
        if partition.succeeded.len() + partition.failed.len() != batch_len {
            warn!(
                batch = batch_len,
                succeeded = partition.succeeded.len(),
                failed = partition.failed.len(),
                "[UPLOAD] Uploader partition does not cover the batch exactly"
            );
        }

        // Each batch job is counted once: as uploaded, or as failed upload.
        for job in partition.succeeded {
            if !outcome.rendered.contains(&job) {
                warn!(
                    project = %job.project_filepath.display(),
                    "[UPLOAD] Uploader reported a job that was not in the batch, ignoring"
                );
            } else if outcome.uploaded.contains(&job) {
                warn!(
                    project = %job.project_filepath.display(),
                    "[UPLOAD] Uploader reported a job as succeeded twice, ignoring"
                );
            } else {
                outcome.uploaded.push(job);
            }
        }
        for job in partition.failed {
            let already_failed = outcome
                .failed
                .iter()
                .any(|f| f.job == job && f.reason == FailureReason::UploadFailed);
            if !outcome.rendered.contains(&job) {
                warn!(
                    project = %job.project_filepath.display(),
                    "[UPLOAD] Uploader failed a job that was not in the batch, ignoring"
                );
            } else if outcome.uploaded.contains(&job) || already_failed {
                warn!(
                    project = %job.project_filepath.display(),
                    "[UPLOAD] Uploader reported a job on both sides or twice, keeping first result"
                );
            } else {
                outcome.fail("UPLOAD", &job, FailureReason::UploadFailed);
            }
        }
    }

    info!(
        rendered = outcome.rendered.len(),
        uploaded = outcome.uploaded.len(),
        failed = outcome.failed.len(),
        "[RENDER] Render pipeline complete"
    );
    Ok(outcome)
}
