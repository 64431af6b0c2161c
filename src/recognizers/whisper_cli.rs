use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::app_config::RecognizerConfig;
use crate::command_runner::{CommandRunner, SystemCommandRunner};
use crate::errors::PipelineError;
use crate::recognizers::{Recognizer, RecognizerOutput};
use crate::transcript::Segment;

// @module: Whisper command line recognizer

// @const: Process-wide recognizer instance. The backing model is expensive to
// load, so one configured instance serves every run in the process.
static SHARED_RECOGNIZER: OnceCell<Arc<WhisperCliRecognizer>> = OnceCell::new();

/// JSON document a whisper-style CLI writes next to the audio file
#[derive(Debug, Deserialize)]
struct RecognizerDocument {
    /// Timed segments; extra per-segment fields in the document are ignored
    segments: Vec<Segment>,
    /// Language the recognizer detected or was told to use
    language: String,
}

/// Recognizer backed by a whisper-compatible command line tool
#[derive(Debug)]
pub struct WhisperCliRecognizer {
    /// Binary name, model selection and timeout
    config: RecognizerConfig,
    /// Seam for spawning the tool
    runner: Arc<dyn CommandRunner>,
}

/// Get the process-wide recognizer, initializing it on first use
pub fn shared(config: &RecognizerConfig) -> Arc<WhisperCliRecognizer> {
    SHARED_RECOGNIZER
        .get_or_init(|| {
            info!("Initializing recognizer {} with model {}", config.binary, config.model);
            Arc::new(WhisperCliRecognizer::new(config.clone()))
        })
        .clone()
}

impl WhisperCliRecognizer {
    /// Create a recognizer running real processes on the host
    pub fn new(config: RecognizerConfig) -> Self {
        Self::with_runner(config, Arc::new(SystemCommandRunner))
    }

    /// Create a recognizer with an explicit command runner
    pub fn with_runner(config: RecognizerConfig, runner: Arc<dyn CommandRunner>) -> Self {
        WhisperCliRecognizer { config, runner }
    }

    /// Arguments for one recognition call. The tool drops its JSON result
    /// into the directory holding the audio file.
    pub fn build_args(&self, audio_path: &Path, language_hint: Option<&str>) -> Vec<String> {
        let output_dir = audio_path.parent().unwrap_or_else(|| Path::new("."));

        let mut args = vec![
            audio_path.to_string_lossy().into_owned(),
            "--model".to_string(),
            self.config.model.clone(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().into_owned(),
            "--task".to_string(),
            "transcribe".to_string(),
        ];

        if let Some(hint) = language_hint {
            args.push("--language".to_string());
            args.push(hint.to_string());
        }

        args
    }

    /// Where the tool leaves its JSON document for `audio_path`
    fn sidecar_path(audio_path: &Path) -> std::path::PathBuf {
        audio_path.with_extension("json")
    }
}

#[async_trait]
impl Recognizer for WhisperCliRecognizer {
    async fn transcribe(&self, audio_path: &Path, language_hint: Option<&str>) -> Result<RecognizerOutput, PipelineError> {
        let args = self.build_args(audio_path, language_hint);
        let timeout = Duration::from_secs(self.config.timeout_secs);

        debug!("Running {} on {:?}", self.config.binary, audio_path.file_name());
        let output = self
            .runner
            .run(&self.config.binary, &args, timeout)
            .await
            .map_err(|e| PipelineError::Transcription { detail: e.to_string() })?;

        if !output.success {
            return Err(PipelineError::Transcription { detail: output.diagnostic() });
        }

        let sidecar = Self::sidecar_path(audio_path);
        let content = std::fs::read_to_string(&sidecar).map_err(|e| PipelineError::Transcription {
            detail: format!("Recognizer reported success but left no result at {}: {}", sidecar.display(), e),
        })?;

        let document: RecognizerDocument = serde_json::from_str(&content).map_err(|e| PipelineError::Transcription {
            detail: format!("Malformed recognizer result {}: {}", sidecar.display(), e),
        })?;

        // The sidecar is a run intermediate, drop it now that it is parsed
        if let Err(e) = std::fs::remove_file(&sidecar) {
            warn!("Could not remove recognizer result {}: {}", sidecar.display(), e);
        }

        debug!(
            "Recognizer returned {} segments in language {}",
            document.segments.len(),
            document.language
        );

        Ok(RecognizerOutput {
            segments: document.segments,
            language: document.language,
        })
    }

    fn name(&self) -> &str {
        &self.config.binary
    }
}
