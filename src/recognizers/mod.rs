/*!
 * Recognizer implementations for speech-to-text backends.
 *
 * This module contains the collaborator interface the transcription service
 * speaks, plus the concrete backends:
 * - WhisperCli: a whisper-style command line recognizer
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

use crate::errors::PipelineError;
use crate::transcript::Segment;

/// What a recognizer produced for one audio artifact
#[derive(Debug, Clone)]
pub struct RecognizerOutput {
    /// Timed segments in recognition order
    pub segments: Vec<Segment>,
    /// Detected (or confirmed) language tag
    pub language: String,
}

/// Common trait for all speech recognizers
///
/// This trait defines the interface that all recognizer implementations must
/// follow, allowing them to be swapped under the transcription service.
#[async_trait]
pub trait Recognizer: Send + Sync + Debug {
    /// Transcribe one audio file into timed segments
    ///
    /// # Arguments
    /// * `audio_path` - The audio artifact to recognize
    /// * `language_hint` - Normalized language tag, or None for auto-detection
    ///
    /// # Returns
    /// * `Result<RecognizerOutput, PipelineError>` - Segments and language, or an error
    async fn transcribe(&self, audio_path: &Path, language_hint: Option<&str>) -> Result<RecognizerOutput, PipelineError>;

    /// Short identifier for log lines
    fn name(&self) -> &str;
}

pub mod whisper_cli;
