///
/// This module implements the CLI interface for render-machine: command parsing, argument
/// defaults and the user-visible output of a run.
///
/// The pipeline itself (render, verify, upload, report) lives in [`render-machine-core`].
/// This module wires the concrete collaborators together and decides where the config, the
/// schema, the renderer binary and the report come from.
///
/// ## Features
/// - Entry struct [`Cli`] with the `render` and `validate` subcommands.
/// - Async entrypoint (`run`) for programmatic invocation and integration testing.
/// - Renderer binary precedence: `--renderer` / `RENDERER_PATH`, then the config's
///   `renderer_path`, then the platform default.
///
/// [`render-machine-core`]: ../../render_machine_core/
use crate::load_config::{default_schema_path, load_config, Config, ConfigSource};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use render_machine_core::pipeline::{process, RenderErrorPolicy};
use render_machine_core::render::{ProcessRenderer, DEFAULT_RENDERER_PATH};
use render_machine_core::report::Report;
use render_machine_core::upload::PassthroughUploader;
use render_machine_core::verify::FsVerifier;
use std::path::PathBuf;

/// CLI for render-machine: batch-render DAW projects, verify, upload and report.
#[derive(Debug, Parser)]
#[clap(
    name = "render-machine",
    version,
    about = "Batch-render project files with an external renderer, verify outputs, upload and report"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render every job in the config, verify outputs, upload them and write the dated report
    Render {
        #[clap(flatten)]
        config: ConfigArgs,

        /// Renderer binary to launch for each project
        #[clap(long, env = "RENDERER_PATH")]
        renderer: Option<PathBuf>,

        /// Directory the `render_results<date>` report is written to
        #[clap(long, default_value = ".")]
        report_dir: PathBuf,

        /// What a non-zero renderer exit does to the run
        #[clap(long, value_enum, default_value_t = OnRenderError::Abort)]
        on_render_error: OnRenderError,
    },
    /// Load and validate the config without rendering anything
    Validate {
        #[clap(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Path or http(s) URL of the JSON job config
    #[clap(long, default_value = "config.json")]
    pub config: ConfigSource,

    /// JSON schema the config is validated against [default: config_schema.json beside the executable]
    #[clap(long)]
    pub schema: Option<PathBuf>,
}

impl ConfigArgs {
    async fn load(&self) -> Result<Config> {
        let schema = self.schema.clone().unwrap_or_else(default_schema_path);
        load_config(&self.config, &schema)
            .await
            .with_context(|| format!("Failed to load config from {}", self.config))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnRenderError {
    /// Abort the whole run; no report is written
    Abort,
    /// Record the job as failed and continue
    Record,
}

impl From<OnRenderError> for RenderErrorPolicy {
    fn from(value: OnRenderError) -> Self {
        match value {
            OnRenderError::Abort => RenderErrorPolicy::Abort,
            OnRenderError::Record => RenderErrorPolicy::Record,
        }
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("render_machine_started");

    match cli.command {
        Commands::Render {
            config,
            renderer,
            report_dir,
            on_render_error,
        } => {
            let config = config.load().await?;
            let binary = renderer
                .or_else(|| config.renderer_path.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RENDERER_PATH));
            tracing::info!(
                command = "render",
                renderer = %binary.display(),
                jobs = config.file_list.len(),
                "Starting render run"
            );

            let renderer = ProcessRenderer::new(binary);
            let outcome = process(
                &config.file_list,
                &renderer,
                &FsVerifier,
                &PassthroughUploader,
                on_render_error.into(),
            )
            .await
            .map_err(|e| {
                tracing::error!(command = "render", error = %e, "Render run aborted");
                e
            })
            .context("Render run aborted, no report written")?;

            let report = Report::from(&outcome);
            println!("{}", report.summary());

            let today = chrono::Local::now().date_naive();
            let path = report
                .write(&report_dir, today)
                .context("Failed to write render report")?;
            println!("Report written to {}", path.display());
            Ok(())
        }
        Commands::Validate { config } => {
            let loaded = config.load().await?;
            tracing::info!(command = "validate", jobs = loaded.file_list.len(), "Config valid");
            println!(
                "Config {} is valid: {} job(s)",
                config.config,
                loaded.file_list.len()
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_render_defaults() {
        let cli = Cli::parse_from(["render-machine", "render", "--renderer", "/usr/bin/reaper"]);
        match cli.command {
            Commands::Render {
                config,
                renderer,
                report_dir,
                on_render_error,
            } => {
                assert_eq!(config.config, ConfigSource::Local(PathBuf::from("config.json")));
                assert!(config.schema.is_none());
                assert_eq!(renderer, Some(PathBuf::from("/usr/bin/reaper")));
                assert_eq!(report_dir, PathBuf::from("."));
                assert_eq!(on_render_error, OnRenderError::Abort);
            }
            _ => panic!("expected Render command"),
        }
    }

    #[test]
    fn cli_parses_remote_config_and_record_policy() {
        let cli = Cli::parse_from([
            "render-machine",
            "render",
            "--config",
            "https://jobs.example.com/config.json",
            "--on-render-error",
            "record",
        ]);
        match cli.command {
            Commands::Render {
                config,
                on_render_error,
                ..
            } => {
                assert!(matches!(config.config, ConfigSource::Remote(_)));
                assert_eq!(
                    RenderErrorPolicy::from(on_render_error),
                    RenderErrorPolicy::Record
                );
            }
            _ => panic!("expected Render command"),
        }
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
