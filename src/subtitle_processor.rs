use std::fmt;
use std::fmt::Write as _;
use std::path::Path;
use log::debug;

use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::transcript::Transcript;

// @module: Subtitle cue building and SRT serialization

// @const: Upper bound on a cue time, in seconds. Values beyond this cannot be
// converted through Duration and are recognizer garbage in any case.
const MAX_CUE_SECONDS: f64 = 86_399_999.0;

/// Format a cue time in seconds as an SRT timecode (HH:MM:SS,mmm).
///
/// The hours field widens past two digits when the time calls for it, and
/// precision below one millisecond is truncated rather than rounded.
/// Negative or non-finite input cannot become a timecode and is rejected.
pub fn format_timestamp(seconds: f64) -> Result<String, PipelineError> {
    if !seconds.is_finite() || seconds < 0.0 || seconds > MAX_CUE_SECONDS {
        return Err(PipelineError::InvalidTimestamp { seconds });
    }

    // from_secs_f64 resolves the float to nanoseconds; as_millis drops the rest
    let total_ms = std::time::Duration::from_secs_f64(seconds).as_millis() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;

    Ok(format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis))
}

// @struct: Single subtitle cue
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    // @field: Sequence number, 1-based
    pub index: usize,

    // @field: Formatted start timecode
    pub start_code: String,

    // @field: Formatted end timecode
    pub end_code: String,

    // @field: Cue text, possibly spanning multiple lines
    pub text: String,
}

impl fmt::Display for SubtitleCue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.start_code, self.end_code)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// An ordered list of cues ready to serialize as one SRT document
#[derive(Debug, Clone, Default)]
pub struct SubtitleDocument {
    /// Cues in presentation order
    pub cues: Vec<SubtitleCue>,
}

impl SubtitleDocument {
    /// Build a cue list from a transcript.
    ///
    /// Segments are numbered from 1 in the order the recognizer produced
    /// them. Recognizers occasionally emit overlapping or out-of-order spans;
    /// those are kept as given, since reordering would detach cue text from
    /// its numbering.
    pub fn from_transcript(transcript: &Transcript) -> Result<Self, PipelineError> {
        let mut cues = Vec::with_capacity(transcript.segments.len());
        let mut previous_start: Option<f64> = None;

        for (i, segment) in transcript.segments.iter().enumerate() {
            if let Some(previous) = previous_start {
                if segment.start < previous {
                    debug!(
                        "Segment {} starts at {} before its predecessor at {}, keeping recognizer order",
                        i + 1,
                        segment.start,
                        previous
                    );
                }
            }
            previous_start = Some(segment.start);

            cues.push(SubtitleCue {
                index: i + 1,
                start_code: format_timestamp(segment.start)?,
                end_code: format_timestamp(segment.end)?,
                text: segment.text.trim().to_string(),
            });
        }

        Ok(SubtitleDocument { cues })
    }

    /// Serialize all cues into one SRT string
    pub fn to_srt_string(&self) -> String {
        let mut output = String::new();
        for cue in &self.cues {
            // Writing into a String cannot fail
            let _ = write!(output, "{}", cue);
        }
        output
    }

    /// Write the document to an SRT file, replacing any previous content.
    ///
    /// Serializing the same document to the same path twice leaves identical
    /// bytes, so retried runs converge instead of appending.
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                FileManager::ensure_dir(parent).map_err(|e| {
                    PipelineError::Storage(format!("Failed to create directory {}: {}", parent.display(), e))
                })?;
            }
        }

        std::fs::write(path, self.to_srt_string()).map_err(|e| {
            PipelineError::Storage(format!("Failed to write subtitle file {}: {}", path.display(), e))
        })
    }

    /// Number of cues in the document
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Whether the document holds no cues
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}
