/*!
 * Transcription service.
 *
 * Turns a video file into a timed transcript in two steps: the transcoder
 * extracts a mono audio track into the run workspace, then the recognizer
 * turns that audio into segments. The extracted audio never outlives the
 * call, success or not.
 */

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use log::{debug, error, info, warn};

use crate::app_config::ExtractionConfig;
use crate::command_runner::CommandRunner;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::recognizers::Recognizer;
use crate::run_workspace::RunWorkspace;
use crate::transcript::Transcript;

// @module: Audio extraction and speech recognition

pub struct TranscriptionService {
    /// Extraction tool settings
    extraction: ExtractionConfig,
    /// Seam for spawning the transcoder
    runner: Arc<dyn CommandRunner>,
    /// Speech recognizer collaborator
    recognizer: Arc<dyn Recognizer>,
}

impl TranscriptionService {
    /// Create a new transcription service
    pub fn new(extraction: ExtractionConfig, runner: Arc<dyn CommandRunner>, recognizer: Arc<dyn Recognizer>) -> Self {
        TranscriptionService { extraction, runner, recognizer }
    }

    /// Produce a transcript for `video_path`.
    ///
    /// All intermediates land in `workspace` and are removed before this
    /// returns, on both the success and the failure path.
    pub async fn transcribe_video(
        &self,
        video_path: &Path,
        language_hint: Option<&str>,
        workspace: &RunWorkspace,
    ) -> Result<Transcript, PipelineError> {
        let audio_name = format!("audio.{}", self.extraction.audio_codec);
        let audio_path = workspace.intermediate(&audio_name);

        self.extract_audio(video_path, &audio_path).await?;

        let hint = match language_hint {
            Some(tag) => match language_utils::recognizer_hint(tag) {
                Ok(normalized) => normalized,
                Err(e) => {
                    warn!("Ignoring language hint: {}", e);
                    None
                }
            },
            None => None,
        };

        info!("Transcribing with {} (hint: {})", self.recognizer.name(), hint.as_deref().unwrap_or("auto"));
        let result = self.recognizer.transcribe(&audio_path, hint.as_deref()).await;

        // The audio track is a run intermediate, drop it before reporting
        if let Err(e) = FileManager::remove_file_if_exists(&audio_path) {
            warn!("{}", e);
        }

        let output = result?;
        info!(
            "Recognized {} segments, language: {}",
            output.segments.len(),
            language_utils::language_display_name(&output.language)
        );

        let video_filename = video_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Transcript::new(video_filename, output.language, output.segments))
    }

    /// Extract a recognizer-friendly audio track from the video
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<(), PipelineError> {
        debug!("Extracting audio to {}", audio_path.display());

        let args = vec![
            "-i".to_string(),
            video_path.to_string_lossy().into_owned(),
            "-vn".to_string(),
            "-acodec".to_string(),
            self.extraction.audio_codec.clone(),
            "-ar".to_string(),
            self.extraction.sample_rate.to_string(),
            "-ac".to_string(),
            self.extraction.channels.to_string(),
            "-y".to_string(),
            audio_path.to_string_lossy().into_owned(),
        ];

        let timeout = Duration::from_secs(self.extraction.timeout_secs);
        let output = self
            .runner
            .run(&self.extraction.transcoder, &args, timeout)
            .await
            .map_err(|e| PipelineError::Transcription { detail: e.to_string() })?;

        if !output.success {
            let detail = output.diagnostic();
            error!("Audio extraction failed: {}", detail);
            return Err(PipelineError::Transcription { detail });
        }

        Ok(())
    }
}
