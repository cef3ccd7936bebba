#![doc = "render-machine-core: render → verify → upload pipeline for render-machine."]

//! This crate holds the job model, the collaborator traits and the pipeline
//! that drives a list of render jobs through them, plus the run report.
//! Config loading and the command line live in the `render-machine` crate.
//!
//! # Usage
//! Build a [`contract::Renderer`], [`contract::ArtifactVerifier`] and
//! [`contract::Uploader`] (the defaults are [`render::ProcessRenderer`],
//! [`verify::FsVerifier`] and [`upload::PassthroughUploader`]) and hand them
//! with the job list to [`pipeline::process`].

pub mod contract;
pub mod error;
pub mod job;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod upload;
pub mod verify;

pub use error::PipelineError;
pub use job::{FailedJob, FailureReason, RenderJob};
pub use pipeline::{process, PipelineOutcome, RenderErrorPolicy};
pub use report::Report;
