/*!
 * Timed transcript model produced by speech recognition.
 *
 * A transcript is the unit of exchange between the recognizer side of the
 * pipeline and the subtitle side: an ordered list of timed segments plus the
 * detected language and the display name of the source video.
 */

use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;
use crate::file_utils::FileManager;

// @module: Transcript data model

/// One recognized utterance with its time span in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start offset from the beginning of the media, in seconds
    pub start: f64,
    /// End offset from the beginning of the media, in seconds
    pub end: f64,
    /// Recognized text for this span
    pub text: String,
}

impl Segment {
    /// Create a new segment
    pub fn new(start: f64, end: f64, text: String) -> Self {
        Segment { start, end, text }
    }
}

/// A full recognition result for one video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Display name of the source video, used to derive artifact names
    #[serde(default)]
    pub video_filename: String,
    /// Detected or caller-supplied language tag
    #[serde(default)]
    pub language: String,
    /// Timed segments in recognizer order
    pub segments: Vec<Segment>,
}

impl Transcript {
    /// Create a new transcript
    pub fn new(video_filename: String, language: String, segments: Vec<Segment>) -> Self {
        Transcript { video_filename, language, segments }
    }

    /// Concatenate all segment texts into one plain string
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.text.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Load a transcript from a JSON document on disk.
    ///
    /// Accepts both documents saved by this application and raw recognizer
    /// output, which lacks the video name. An unreadable or malformed file is
    /// the caller's problem and maps to `MissingInput`.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path).map_err(|e| {
            PipelineError::MissingInput(format!("Cannot read transcript file {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            PipelineError::MissingInput(format!("Malformed transcript file {}: {}", path.display(), e))
        })
    }

    /// Persist the transcript as pretty-printed JSON
    pub fn write_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PipelineError::Storage(format!("Failed to serialize transcript: {}", e)))?;
        FileManager::write_to_file(path, &json)
            .map_err(|e| PipelineError::Storage(format!("Failed to write transcript file {}: {}", path.display(), e)))
    }
}
