#![cfg(unix)]

use render_machine_core::contract::Renderer;
use render_machine_core::job::RenderJob;
use render_machine_core::pipeline::{process, RenderErrorPolicy};
use render_machine_core::render::ProcessRenderer;
use render_machine_core::upload::PassthroughUploader;
use render_machine_core::verify::FsVerifier;
use render_machine_core::PipelineError;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Writes an executable shell script standing in for the DAW. It renders by
/// touching `<project>.wav` next to the project passed after `-renderproject`.
fn fake_renderer(dir: &Path, body: &str) -> PathBuf {
    let script = dir.join("fake-renderer.sh");
    std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = std::fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).unwrap();
    script
}

#[tokio::test]
async fn test_exit_codes_are_reported() {
    let ok = ProcessRenderer::new("true");
    let status = ok.invoke(Path::new("/nonexistent.rpp")).await.unwrap();
    assert!(status.success());

    let failing = ProcessRenderer::new("false");
    let status = failing.invoke(Path::new("/nonexistent.rpp")).await.unwrap();
    assert!(!status.success());
    assert_eq!(status.code, Some(1));
}

#[tokio::test]
async fn test_missing_binary_is_a_launch_error() {
    let renderer = ProcessRenderer::new("/definitely/not/a/renderer");
    let err = renderer
        .invoke(Path::new("/nonexistent.rpp"))
        .await
        .expect_err("launching a missing binary must fail");
    assert!(err.to_string().contains("/definitely/not/a/renderer"));
}

#[tokio::test]
async fn test_end_to_end_with_fake_renderer() {
    let dir = tempdir().unwrap();
    let renderer = ProcessRenderer::new(fake_renderer(
        dir.path(),
        r#"[ "$1" = "-nosplash" ] && [ "$2" = "-renderproject" ] && touch "$3.wav""#,
    ));

    let good_project = dir.path().join("good.rpp");
    std::fs::write(&good_project, b"<REAPER_PROJECT>").unwrap();
    let good = RenderJob::new(&good_project, dir.path().join("good.rpp.wav"));
    // Renders fine but the project writes elsewhere than configured.
    let misrouted_project = dir.path().join("misrouted.rpp");
    std::fs::write(&misrouted_project, b"<REAPER_PROJECT>").unwrap();
    let misrouted = RenderJob::new(&misrouted_project, dir.path().join("elsewhere.wav"));
    let absent = RenderJob::new(dir.path().join("absent.rpp"), dir.path().join("absent.wav"));

    let outcome = process(
        &[good.clone(), misrouted.clone(), absent.clone()],
        &renderer,
        &FsVerifier,
        &PassthroughUploader,
        RenderErrorPolicy::Abort,
    )
    .await
    .unwrap();

    assert_eq!(outcome.rendered, vec![good.clone()]);
    assert_eq!(outcome.uploaded, vec![good]);
    let failed: Vec<_> = outcome.failed.iter().map(|f| f.job.clone()).collect();
    assert_eq!(failed, vec![misrouted, absent]);
}

#[tokio::test]
async fn test_failing_renderer_aborts_end_to_end() {
    let dir = tempdir().unwrap();
    let renderer = ProcessRenderer::new(fake_renderer(dir.path(), "exit 7"));
    let project = dir.path().join("song.rpp");
    std::fs::write(&project, b"<REAPER_PROJECT>").unwrap();

    let err = process(
        &[RenderJob::new(&project, dir.path().join("song.wav"))],
        &renderer,
        &FsVerifier,
        &PassthroughUploader,
        RenderErrorPolicy::Abort,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PipelineError::EngineFailure { code: Some(7), .. }));
}
