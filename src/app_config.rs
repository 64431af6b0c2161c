use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory holding per-run intermediate workspaces
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Age in hours after which an abandoned run workspace is swept
    #[serde(default = "default_sweep_age_hours")]
    pub sweep_age_hours: u64,

    /// Speech recognizer settings
    #[serde(default)]
    pub recognizer: RecognizerConfig,

    /// Audio extraction settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Subtitle burn-in settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Speech recognizer configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecognizerConfig {
    // @field: Recognizer binary name
    #[serde(default = "default_recognizer_binary")]
    pub binary: String,

    // @field: Model selection passed to the recognizer
    #[serde(default = "default_recognizer_model")]
    pub model: String,

    // @field: Timeout seconds for one recognition call
    #[serde(default = "default_recognizer_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        RecognizerConfig {
            binary: default_recognizer_binary(),
            model: default_recognizer_model(),
            timeout_secs: default_recognizer_timeout_secs(),
        }
    }
}

/// Audio extraction configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExtractionConfig {
    // @field: Transcoder binary name
    #[serde(default = "default_transcoder")]
    pub transcoder: String,

    // @field: Audio codec for the extracted track
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    // @field: Sample rate in Hz, recognizers expect 16 kHz mono
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    // @field: Channel count
    #[serde(default = "default_channels")]
    pub channels: u32,

    // @field: Timeout seconds for one extraction call
    #[serde(default = "default_extraction_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            transcoder: default_transcoder(),
            audio_codec: default_audio_codec(),
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            timeout_secs: default_extraction_timeout_secs(),
        }
    }
}

/// Subtitle burn-in configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RenderConfig {
    // @field: Renderer binary name
    #[serde(default = "default_transcoder")]
    pub renderer: String,

    // @field: Video codec for the re-encode
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    // @field: Encoder preset
    #[serde(default = "default_preset")]
    pub preset: String,

    // @field: Constant rate factor, 0-51
    #[serde(default = "default_crf")]
    pub crf: u32,

    // @field: Timeout seconds for one render call
    #[serde(default = "default_render_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            renderer: default_transcoder(),
            video_codec: default_video_codec(),
            preset: default_preset(),
            crf: default_crf(),
            timeout_secs: default_render_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("vidscribe")
}

fn default_sweep_age_hours() -> u64 {
    24
}

fn default_recognizer_binary() -> String {
    "whisper".to_string()
}

fn default_recognizer_model() -> String {
    "large-v3-turbo".to_string()
}

fn default_recognizer_timeout_secs() -> u64 {
    900
}

fn default_transcoder() -> String {
    "ffmpeg".to_string()
}

fn default_audio_codec() -> String {
    "mp3".to_string()
}

fn default_sample_rate() -> u32 {
    16_000
}

fn default_channels() -> u32 {
    1
}

fn default_extraction_timeout_secs() -> u64 {
    300
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_preset() -> String {
    "fast".to_string()
}

fn default_crf() -> u32 {
    23
}

fn default_render_timeout_secs() -> u64 {
    1800
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.recognizer.binary.trim().is_empty() {
            return Err(anyhow!("Recognizer binary must not be empty"));
        }
        if self.recognizer.model.trim().is_empty() {
            return Err(anyhow!("Recognizer model must not be empty"));
        }
        if self.extraction.transcoder.trim().is_empty() {
            return Err(anyhow!("Transcoder binary must not be empty"));
        }
        if self.extraction.audio_codec.trim().is_empty() {
            return Err(anyhow!("Audio codec must not be empty"));
        }
        if self.extraction.sample_rate == 0 {
            return Err(anyhow!("Sample rate must be positive"));
        }
        if self.extraction.channels == 0 {
            return Err(anyhow!("Channel count must be positive"));
        }
        if self.render.renderer.trim().is_empty() {
            return Err(anyhow!("Renderer binary must not be empty"));
        }
        if self.render.crf > 51 {
            return Err(anyhow!("CRF must be between 0 and 51, got {}", self.render.crf));
        }

        for (name, timeout) in [
            ("recognizer", self.recognizer.timeout_secs),
            ("extraction", self.extraction.timeout_secs),
            ("render", self.render.timeout_secs),
        ] {
            if timeout == 0 {
                return Err(anyhow!("Timeout for {} must be positive", name));
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            work_dir: default_work_dir(),
            sweep_age_hours: default_sweep_age_hours(),
            recognizer: RecognizerConfig::default(),
            extraction: ExtractionConfig::default(),
            render: RenderConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
