//! External-process renderer.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{error, info};

use crate::contract::{RenderError, RenderStatus, Renderer};

/// Install location of REAPER on macOS, used when nothing else is configured.
pub const DEFAULT_RENDERER_PATH: &str = "/Applications/REAPER.app/Contents/MacOS/REAPER";

/// Launches the renderer binary as
/// `<binary> -nosplash -renderproject <project_filepath>` and waits for it.
#[derive(Debug, Clone)]
pub struct ProcessRenderer {
    binary: PathBuf,
}

impl ProcessRenderer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command(&self, project_filepath: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-nosplash")
            .arg("-renderproject")
            .arg(project_filepath);
        cmd
    }
}

impl Default for ProcessRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_RENDERER_PATH)
    }
}

#[async_trait]
impl Renderer for ProcessRenderer {
    async fn invoke(&self, project_filepath: &Path) -> Result<RenderStatus, RenderError> {
        info!(
            binary = %self.binary.display(),
            project = %project_filepath.display(),
            "[RENDER] Launching renderer"
        );
        let status = self.command(project_filepath).status().await.map_err(|e| {
            error!(
                error = ?e,
                binary = %self.binary.display(),
                "[RENDER][ERROR] Failed to launch renderer process"
            );
            RenderError {
                binary: self.binary.display().to_string(),
                source: e,
            }
        })?;

        let status = RenderStatus::from(status);
        if status.success() {
            info!(project = %project_filepath.display(), "[RENDER] Renderer exited successfully");
        } else {
            error!(
                project = %project_filepath.display(),
                code = ?status.code,
                "[RENDER][ERROR] Renderer exited with non-zero status"
            );
        }
        Ok(status)
    }
}
