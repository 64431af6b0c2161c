/*!
 * Tests for the audio extraction and transcription service
 */

use std::sync::Arc;
use anyhow::Result;
use vidscribe::app_config::ExtractionConfig;
use vidscribe::errors::PipelineError;
use vidscribe::run_workspace::RunWorkspace;
use vidscribe::transcription_service::TranscriptionService;
use crate::common;
use crate::common::mock_collaborators::{MockCommandRunner, MockRecognizer};

fn service_with(runner: Arc<MockCommandRunner>, recognizer: Arc<MockRecognizer>) -> TranscriptionService {
    TranscriptionService::new(ExtractionConfig::default(), runner, recognizer)
}

/// Test the full extract-then-recognize flow
#[tokio::test]
async fn test_transcribe_video_withWorkingCollaborators_shouldReturnTranscript() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_video(temp_dir.path(), "movie.mp4")?;
    let workspace = RunWorkspace::create(temp_dir.path().join("work"))?;

    let runner = Arc::new(MockCommandRunner::succeeding());
    let recognizer = Arc::new(MockRecognizer::working_default());
    let service = service_with(Arc::clone(&runner), Arc::clone(&recognizer));

    let transcript = service.transcribe_video(&video, None, &workspace).await?;

    assert_eq!(transcript.video_filename, "movie.mp4");
    assert_eq!(transcript.language, "en");
    assert_eq!(transcript.segments, common::sample_segments());
    Ok(())
}

/// Test the transcoder argument list for audio extraction
#[tokio::test]
async fn test_transcribe_video_withDefaultExtraction_shouldBuildTranscoderArgs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_video(temp_dir.path(), "movie.mp4")?;
    let workspace = RunWorkspace::create(temp_dir.path().join("work"))?;

    let runner = Arc::new(MockCommandRunner::succeeding());
    let recognizer = Arc::new(MockRecognizer::working_default());
    let service = service_with(Arc::clone(&runner), recognizer);

    service.transcribe_video(&video, None, &workspace).await?;

    let invocations = runner.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].program, "ffmpeg");

    let expected_audio = workspace.intermediate("audio.mp3");
    assert_eq!(
        invocations[0].args,
        vec![
            "-i".to_string(),
            video.to_string_lossy().into_owned(),
            "-vn".to_string(),
            "-acodec".to_string(),
            "mp3".to_string(),
            "-ar".to_string(),
            "16000".to_string(),
            "-ac".to_string(),
            "1".to_string(),
            "-y".to_string(),
            expected_audio.to_string_lossy().into_owned(),
        ]
    );
    Ok(())
}

/// Test that the extracted audio track never outlives the call
#[tokio::test]
async fn test_transcribe_video_withSuccess_shouldRemoveExtractedAudio() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_video(temp_dir.path(), "movie.mp4")?;
    let workspace = RunWorkspace::create(temp_dir.path().join("work"))?;

    let runner = Arc::new(MockCommandRunner::succeeding());
    let recognizer = Arc::new(MockRecognizer::working_default());
    let service = service_with(runner, Arc::clone(&recognizer));

    service.transcribe_video(&video, None, &workspace).await?;

    let audio = workspace.intermediate("audio.mp3");
    assert!(!audio.exists(), "audio intermediate should be removed");

    // The recognizer saw the audio while it still existed
    let calls = recognizer.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, audio);
    Ok(())
}

/// Test audio cleanup on the recognizer failure path
#[tokio::test]
async fn test_transcribe_video_withFailingRecognizer_shouldStillRemoveAudio() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_video(temp_dir.path(), "movie.mp4")?;
    let workspace = RunWorkspace::create(temp_dir.path().join("work"))?;

    let runner = Arc::new(MockCommandRunner::succeeding());
    let recognizer = Arc::new(MockRecognizer::failing("model load failed"));
    let service = service_with(runner, recognizer);

    let result = service.transcribe_video(&video, None, &workspace).await;

    match result {
        Err(PipelineError::Transcription { detail }) => {
            assert!(detail.contains("model load failed"));
        }
        other => panic!("expected Transcription error, got {:?}", other),
    }
    assert!(!workspace.intermediate("audio.mp3").exists());
    Ok(())
}

/// Test that a failing extraction surfaces diagnostics and skips recognition
#[tokio::test]
async fn test_transcribe_video_withFailingExtraction_shouldNotCallRecognizer() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_video(temp_dir.path(), "movie.mp4")?;
    let workspace = RunWorkspace::create(temp_dir.path().join("work"))?;

    let runner = Arc::new(MockCommandRunner::failing("movie.mp4: Invalid data found when processing input"));
    let recognizer = Arc::new(MockRecognizer::working_default());
    let service = service_with(runner, Arc::clone(&recognizer));

    let result = service.transcribe_video(&video, None, &workspace).await;

    match result {
        Err(PipelineError::Transcription { detail }) => {
            assert!(detail.contains("Invalid data"), "detail was: {}", detail);
        }
        other => panic!("expected Transcription error, got {:?}", other),
    }
    assert!(recognizer.calls().is_empty());
    Ok(())
}

/// Test language hint normalization on the way to the recognizer
#[tokio::test]
async fn test_transcribe_video_withThreeLetterHint_shouldNormalizeToTwoLetters() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_video(temp_dir.path(), "movie.mp4")?;
    let workspace = RunWorkspace::create(temp_dir.path().join("work"))?;

    let runner = Arc::new(MockCommandRunner::succeeding());
    let recognizer = Arc::new(MockRecognizer::working_default());
    let service = service_with(runner, Arc::clone(&recognizer));

    service.transcribe_video(&video, Some("eng"), &workspace).await?;

    assert_eq!(recognizer.calls()[0].1.as_deref(), Some("en"));
    Ok(())
}

/// Test that auto-detection requests carry no hint
#[tokio::test]
async fn test_transcribe_video_withAutoHint_shouldPassNoHint() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_video(temp_dir.path(), "movie.mp4")?;
    let workspace = RunWorkspace::create(temp_dir.path().join("work"))?;

    let runner = Arc::new(MockCommandRunner::succeeding());
    let recognizer = Arc::new(MockRecognizer::working_default());
    let service = service_with(runner, Arc::clone(&recognizer));

    service.transcribe_video(&video, Some("auto"), &workspace).await?;

    assert_eq!(recognizer.calls()[0].1, None);
    Ok(())
}

/// Test that an unusable hint degrades to auto-detection instead of failing
#[tokio::test]
async fn test_transcribe_video_withInvalidHint_shouldFallBackToAutoDetect() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_video(temp_dir.path(), "movie.mp4")?;
    let workspace = RunWorkspace::create(temp_dir.path().join("work"))?;

    let runner = Arc::new(MockCommandRunner::succeeding());
    let recognizer = Arc::new(MockRecognizer::working_default());
    let service = service_with(runner, Arc::clone(&recognizer));

    service.transcribe_video(&video, Some("klingon"), &workspace).await?;

    assert_eq!(recognizer.calls()[0].1, None);
    Ok(())
}
