/*!
 * Tests for the subtitle burn-in render service
 */

use std::path::Path;
use std::sync::Arc;
use anyhow::Result;
use vidscribe::app_config::RenderConfig;
use vidscribe::errors::PipelineError;
use vidscribe::render_service::{RenderService, RENDERED_PREFIX};
use crate::common;
use crate::common::mock_collaborators::MockCommandRunner;

fn service_with(runner: Arc<MockCommandRunner>) -> RenderService {
    RenderService::new(RenderConfig::default(), runner)
}

/// Test filter escaping for a path with a drive-letter colon
#[test]
fn test_escape_filter_path_withColonAndBackslashes_shouldEscapeBoth() {
    let escaped = RenderService::escape_filter_path(Path::new("C:\\videos\\clip.srt"));
    assert_eq!(escaped, "C\\\\:/videos/clip.srt");
}

/// Test filter escaping for a plain unix path
#[test]
fn test_escape_filter_path_withPlainUnixPath_shouldLeaveItUnchanged() {
    let escaped = RenderService::escape_filter_path(Path::new("/tmp/out/movie.srt"));
    assert_eq!(escaped, "/tmp/out/movie.srt");
}

/// Test that every colon in the filter argument is escaped
#[test]
fn test_subtitles_filter_withColonBearingPath_shouldEscapeEveryColon() {
    let filter = RenderService::subtitles_filter(Path::new("C:\\a:b\\movie.srt"));
    let argument = filter.strip_prefix("subtitles=").unwrap();

    let bytes = argument.as_bytes();
    for (i, byte) in bytes.iter().enumerate() {
        if *byte == b':' {
            assert!(i > 0 && bytes[i - 1] == b'\\', "unescaped colon in {}", argument);
        }
    }
}

/// Test output naming for rendered videos
#[test]
fn test_rendered_name_withVideoFilename_shouldPrefixIt() {
    assert_eq!(RenderService::rendered_name("movie.mp4"), "subtitled_movie.mp4");
    assert!(RenderService::rendered_name("clip.mkv").starts_with(RENDERED_PREFIX));
}

/// Test renderer argument construction
#[test]
fn test_build_args_withDefaultConfig_shouldBuildFullArgumentList() {
    let service = service_with(Arc::new(MockCommandRunner::succeeding()));
    let args = service.build_args(
        Path::new("/in/movie.mp4"),
        Path::new("/out/movie.srt"),
        Path::new("/out/subtitled_movie.mp4"),
    );

    assert_eq!(
        args,
        vec![
            "-i",
            "/in/movie.mp4",
            "-vf",
            "subtitles=/out/movie.srt",
            "-c:v",
            "libx264",
            "-preset",
            "fast",
            "-crf",
            "23",
            "-c:a",
            "copy",
            "-y",
            "/out/subtitled_movie.mp4",
        ]
    );
}

/// Test a successful render call
#[tokio::test]
async fn test_render_withSucceedingRenderer_shouldReturnOutputPath() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_video(temp_dir.path(), "movie.mp4")?;
    let subtitle = common::create_test_file(temp_dir.path(), "movie.srt", "1\n00:00:00,000 --> 00:00:01,000\nhi\n\n")?;

    let runner = Arc::new(MockCommandRunner::succeeding());
    let service = service_with(Arc::clone(&runner));

    let rendered = service.render(&video, &subtitle, temp_dir.path()).await?;

    assert_eq!(rendered, temp_dir.path().join("subtitled_movie.mp4"));
    assert!(rendered.is_file());

    let invocations = runner.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].program, "ffmpeg");
    assert!(invocations[0].args.contains(&"-vf".to_string()));
    Ok(())
}

/// Test that renderer diagnostics survive into the error
#[tokio::test]
async fn test_render_withFailingRenderer_shouldSurfaceDiagnostics() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_video(temp_dir.path(), "movie.mp4")?;
    let subtitle = common::create_test_file(temp_dir.path(), "movie.srt", "")?;

    let runner = Arc::new(MockCommandRunner::failing("Error initializing filter 'subtitles'"));
    let service = service_with(runner);

    let result = service.render(&video, &subtitle, temp_dir.path()).await;

    match result {
        Err(PipelineError::Render { detail }) => {
            assert!(detail.contains("Error initializing filter"), "detail was: {}", detail);
        }
        other => panic!("expected Render error, got {:?}", other),
    }
    Ok(())
}

/// Test that a renderer timeout maps to a render error
#[tokio::test]
async fn test_render_withTimedOutRenderer_shouldReturnRenderError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_video(temp_dir.path(), "movie.mp4")?;
    let subtitle = common::create_test_file(temp_dir.path(), "movie.srt", "")?;

    let runner = Arc::new(MockCommandRunner::timing_out());
    let service = service_with(runner);

    let result = service.render(&video, &subtitle, temp_dir.path()).await;

    match result {
        Err(PipelineError::Render { detail }) => {
            assert!(detail.contains("timed out"), "detail was: {}", detail);
        }
        other => panic!("expected Render error, got {:?}", other),
    }
    Ok(())
}

/// Test that a zero exit without an output file is still a failure
#[tokio::test]
async fn test_render_withNoOutputFile_shouldReturnRenderError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_video(temp_dir.path(), "movie.mp4")?;
    let subtitle = common::create_test_file(temp_dir.path(), "movie.srt", "")?;

    let runner = Arc::new(MockCommandRunner::succeeding_without_artifact());
    let service = service_with(runner);

    let result = service.render(&video, &subtitle, temp_dir.path()).await;

    match result {
        Err(PipelineError::Render { detail }) => {
            assert!(detail.contains("produced no file"), "detail was: {}", detail);
        }
        other => panic!("expected Render error, got {:?}", other),
    }
    Ok(())
}
