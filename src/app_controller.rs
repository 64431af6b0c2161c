use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::command_runner::{CommandRunner, SystemCommandRunner};
use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::recognizers::{whisper_cli, Recognizer};
use crate::render_service::RenderService;
use crate::run_workspace::{self, RunWorkspace};
use crate::subtitle_processor::SubtitleDocument;
use crate::transcript::Transcript;
use crate::transcription_service::TranscriptionService;

// @module: Pipeline orchestration

/// Stages a run moves through, in order. A run that stops early surfaces an
/// error instead of a report, so `Failed` needs no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Request accepted, nothing checked yet
    Received,
    /// Inputs present and usable
    Validated,
    /// Cues built from the transcript
    Formatted,
    /// Subtitle file on disk
    Written,
    /// Burn-in requested and preconditions met
    RenderRequested,
    /// Burned-in video on disk
    Rendered,
    /// Run ends at the subtitle file
    RenderSkipped,
    /// All requested artifacts produced
    Completed,
}

impl RunState {
    /// Short lowercase label for log lines
    pub fn label(self) -> &'static str {
        match self {
            RunState::Received => "received",
            RunState::Validated => "validated",
            RunState::Formatted => "formatted",
            RunState::Written => "written",
            RunState::RenderRequested => "render-requested",
            RunState::Rendered => "rendered",
            RunState::RenderSkipped => "render-skipped",
            RunState::Completed => "completed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Token identifying the run in logs
    pub run_token: String,
    /// The subtitle file that was written
    pub subtitle_file: PathBuf,
    /// The burned-in video, when rendering was requested
    pub rendered_video: Option<PathBuf>,
    /// Terminal state, always `Completed` for a returned report
    pub state: RunState,
}

/// Main application controller for the transcription pipeline
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Burn-in collaborator
    render: RenderService,
    // @field: Transcription collaborator
    transcription: TranscriptionService,
}

impl Controller {
    // @method: Create a controller with real collaborators on the host system
    pub fn with_config(config: Config) -> anyhow::Result<Self> {
        let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner);
        let recognizer: Arc<dyn Recognizer> = whisper_cli::shared(&config.recognizer);
        Ok(Self::with_collaborators(config, runner, recognizer))
    }

    /// Create a controller with explicit collaborators
    pub fn with_collaborators(
        config: Config,
        runner: Arc<dyn CommandRunner>,
        recognizer: Arc<dyn Recognizer>,
    ) -> Self {
        let render = RenderService::new(config.render.clone(), Arc::clone(&runner));
        let transcription = TranscriptionService::new(config.extraction.clone(), runner, recognizer);
        Controller { config, render, transcription }
    }

    /// Transcribe a video into a timed transcript.
    ///
    /// Intermediates live in a fresh run workspace that is removed before
    /// this returns, whatever the outcome.
    pub async fn transcribe(&self, video_path: &Path, language_hint: Option<&str>) -> Result<Transcript, PipelineError> {
        if !FileManager::file_exists(video_path) {
            return Err(PipelineError::MissingInput(format!(
                "Video file does not exist: {}",
                video_path.display()
            )));
        }

        let workspace = RunWorkspace::create(&self.config.work_dir)?;
        info!("Run {}: transcribing {}", workspace.token(), video_path.display());
        let start_time = std::time::Instant::now();

        let result = self
            .transcription
            .transcribe_video(video_path, language_hint, &workspace)
            .await;
        workspace.cleanup();

        let transcript = result?;
        info!(
            "Run {}: transcription finished in {}",
            workspace.token(),
            Self::format_duration(start_time.elapsed())
        );
        Ok(transcript)
    }

    /// Produce a subtitle file from a transcript, terminating at `Written`
    pub async fn export_subtitles(
        &self,
        transcript: &Transcript,
        video_path: &Path,
        output_dir: &Path,
    ) -> Result<RunReport, PipelineError> {
        self.run_pipeline(transcript, video_path, output_dir, false).await
    }

    /// Produce a subtitle file and burn it into the video
    pub async fn burn_subtitles(
        &self,
        transcript: &Transcript,
        video_path: &Path,
        output_dir: &Path,
    ) -> Result<RunReport, PipelineError> {
        self.run_pipeline(transcript, video_path, output_dir, true).await
    }

    /// Drive one run through its stages.
    ///
    /// Stages beyond the last requested one are skipped, any failure aborts
    /// the run with the stage's error. The subtitle file keeps its
    /// deterministic name, so re-running a failed run converges on the same
    /// artifacts.
    async fn run_pipeline(
        &self,
        transcript: &Transcript,
        video_path: &Path,
        output_dir: &Path,
        render_requested: bool,
    ) -> Result<RunReport, PipelineError> {
        let run_token = run_workspace::new_run_token();
        let start_time = std::time::Instant::now();
        let mut state = RunState::Received;
        debug!("Run {}: {}", run_token, state);

        // The display name drives every artifact name, reject unusable ones
        let subtitle_name = run_workspace::subtitle_name(&transcript.video_filename)?;
        state = RunState::Validated;
        debug!("Run {}: {}", run_token, state);

        let document = SubtitleDocument::from_transcript(transcript)?;
        if document.is_empty() {
            warn!("Run {}: transcript has no segments, writing an empty subtitle file", run_token);
        }
        state = RunState::Formatted;
        debug!("Run {}: {} ({} cues)", run_token, state, document.len());

        FileManager::ensure_dir(output_dir)
            .map_err(|e| PipelineError::Storage(format!("Failed to create output directory: {}", e)))?;
        let subtitle_path = output_dir.join(&subtitle_name);
        document.write_to_srt(&subtitle_path)?;
        state = RunState::Written;
        info!("Run {}: subtitle file written to {}", run_token, subtitle_path.display());

        let rendered_video = if render_requested {
            // The source must still be there, the subtitle file alone cannot
            // satisfy a burn request
            if !FileManager::file_exists(video_path) {
                return Err(PipelineError::SourceNotFound { path: video_path.to_path_buf() });
            }
            state = RunState::RenderRequested;
            debug!("Run {}: {}", run_token, state);

            let output_path = self.render.render(video_path, &subtitle_path, output_dir).await?;
            state = RunState::Rendered;
            info!("Run {}: {} at {}", run_token, state, output_path.display());
            Some(output_path)
        } else {
            state = RunState::RenderSkipped;
            debug!("Run {}: {}", run_token, state);
            None
        };

        state = RunState::Completed;
        info!("Run {}: {} in {}", run_token, state, Self::format_duration(start_time.elapsed()));

        Ok(RunReport {
            run_token,
            subtitle_file: subtitle_path,
            rendered_video,
            state,
        })
    }

    /// Sweep run workspaces abandoned by crashed runs. Returns how many were
    /// removed.
    pub fn sweep_stale_runs(&self) -> usize {
        let max_age = Duration::from_secs(self.config.sweep_age_hours * 3600);
        RunWorkspace::sweep_stale(&self.config.work_dir, max_age)
    }

    /// Format a duration in a human-readable way
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
