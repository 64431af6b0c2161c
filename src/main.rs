// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{Result, anyhow, Context};
use log::{error, info, warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;
use std::time::Duration;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::errors::PipelineError;
use crate::transcript::Transcript;
use app_controller::Controller;

mod app_config;
mod app_controller;
mod command_runner;
mod errors;
mod file_utils;
mod language_utils;
mod recognizers;
mod render_service;
mod run_workspace;
mod subtitle_processor;
mod transcript;
mod transcription_service;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Transcribe a video into a timed transcript
    Transcribe(TranscribeArgs),

    /// Export an SRT subtitle file from a transcript
    Subtitles(RenderArgs),

    /// Burn subtitles into the video picture
    Burn(RenderArgs),

    /// Remove stale run workspaces left behind by interrupted runs
    Clean,

    /// Generate shell completions for vidscribe
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranscribeArgs {
    /// Input video file
    #[arg(value_name = "VIDEO")]
    video: PathBuf,

    /// Language hint for the recognizer (e.g. 'en'), omit for auto-detection
    #[arg(short, long)]
    language: Option<String>,

    /// Where to write the transcript JSON (defaults to next to the video)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input video file
    #[arg(value_name = "VIDEO")]
    video: PathBuf,

    /// Previously saved transcript JSON, transcribed on the fly when omitted
    #[arg(short, long)]
    transcript: Option<PathBuf>,

    /// Language hint used when transcribing on the fly
    #[arg(short, long)]
    language: Option<String>,

    /// Output directory (defaults to the video's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

/// vidscribe - video transcription and subtitle burn-in
///
/// A pipeline tool that transcribes video files with a speech recognizer,
/// exports the result as SRT subtitles and optionally burns them into the
/// picture with an external renderer.
#[derive(Parser, Debug)]
#[command(name = "vidscribe")]
#[command(version = "0.2.0")]
#[command(about = "Video transcription and subtitle burn-in tool")]
#[command(long_about = "vidscribe turns speech in video files into SRT subtitles and can burn them into the picture.

EXAMPLES:
    vidscribe transcribe movie.mp4                   # Transcript JSON next to the video
    vidscribe transcribe -l en movie.mp4             # Skip language detection
    vidscribe subtitles movie.mp4                    # Transcribe and write movie.srt
    vidscribe subtitles -t movie.transcript.json movie.mp4
    vidscribe burn movie.mp4                         # Produce subtitled_movie.mp4
    vidscribe burn -o /renders movie.mp4             # Rendered artifacts under /renders
    vidscribe clean                                  # Sweep abandoned run workspaces
    vidscribe completions bash > vidscribe.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in vidscribe.json by default. You can specify a
    different config file with --config-path. If the config file doesn't
    exist, a default one will be created automatically.

EXTERNAL TOOLS:
    ffmpeg    - audio extraction and subtitle burn-in
    whisper   - speech recognition (any whisper-compatible CLI)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "vidscribe.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN"),
            Level::Info => ("\x1B[1;32m", "INFO"),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {:5} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
        return ExitCode::FAILURE;
    }

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            // Caller mistakes get their own exit code so scripts can tell
            // bad requests from pipeline failures
            match e.downcast_ref::<PipelineError>() {
                Some(pipeline_error) if pipeline_error.is_user_error() => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

async fn run(cli: CommandLineOptions) -> Result<()> {
    // Handle completions before touching any configuration
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "vidscribe", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_or_create_config(&cli.config_path, cli.log_level.as_ref())?;
    let controller = Controller::with_config(config.clone())?;

    match cli.command {
        Commands::Transcribe(args) => run_transcribe(&controller, args).await,
        Commands::Subtitles(args) => run_render(&controller, args, false).await,
        Commands::Burn(args) => run_render(&controller, args, true).await,
        Commands::Clean => {
            let removed = controller.sweep_stale_runs();
            info!("Removed {} stale run workspace(s)", removed);
            Ok(())
        }
        Commands::Completions { .. } => unreachable!("handled above"),
    }
}

/// Load the configuration file, creating a default one on first use
fn load_or_create_config(config_path: &str, log_level: Option<&CliLogLevel>) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = log_level {
        log::set_max_level(level_filter_for(&cmd_log_level.clone().into()));
    }

    let mut config = if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;
        config
    } else {
        // Create default configuration if not exists
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Override config with CLI options if provided
    if let Some(cmd_log_level) = log_level {
        config.log_level = cmd_log_level.clone().into();
    }

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if log_level.is_none() {
        log::set_max_level(level_filter_for(&config.log_level));
    }

    Ok(config)
}

fn level_filter_for(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

/// Spinner shown while an external tool runs
fn progress_spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

async fn run_transcribe(controller: &Controller, args: TranscribeArgs) -> Result<()> {
    let spinner = progress_spinner("Transcribing");
    let result = controller.transcribe(&args.video, args.language.as_deref()).await;
    spinner.finish_and_clear();
    let transcript = result?;

    let output_path = match args.output {
        Some(path) => path,
        None => default_transcript_path(&args.video, &transcript)?,
    };
    transcript.write_json_file(&output_path)?;

    info!("Transcript saved to {}", output_path.display());
    println!("{}", transcript.full_text());
    Ok(())
}

async fn run_render(controller: &Controller, args: RenderArgs, burn: bool) -> Result<()> {
    let transcript = obtain_transcript(controller, &args).await?;

    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => args.video.parent().unwrap_or(Path::new(".")).to_path_buf(),
    };

    let report = if burn {
        let spinner = progress_spinner("Rendering subtitles");
        let result = controller.burn_subtitles(&transcript, &args.video, &output_dir).await;
        spinner.finish_and_clear();
        result?
    } else {
        controller.export_subtitles(&transcript, &args.video, &output_dir).await?
    };

    info!("Subtitle file: {}", report.subtitle_file.display());
    if let Some(rendered) = &report.rendered_video {
        info!("Rendered video: {}", rendered.display());
    }
    Ok(())
}

/// Load the transcript named on the command line, or produce one on the fly
async fn obtain_transcript(controller: &Controller, args: &RenderArgs) -> Result<Transcript> {
    let video_filename = args
        .video
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("Input path has no file name: {:?}", args.video))?;

    if let Some(transcript_path) = &args.transcript {
        let mut transcript = Transcript::from_json_file(transcript_path)?;
        // Raw recognizer documents carry no video name, fill it from the CLI
        if transcript.video_filename.is_empty() {
            transcript.video_filename = video_filename;
        }
        return Ok(transcript);
    }

    let spinner = progress_spinner("Transcribing");
    let result = controller.transcribe(&args.video, args.language.as_deref()).await;
    spinner.finish_and_clear();
    let transcript = result?;

    // Keep the transcript next to the video so later runs can reuse it
    let transcript_path = default_transcript_path(&args.video, &transcript)?;
    if let Err(e) = transcript.write_json_file(&transcript_path) {
        warn!("Could not save transcript for reuse: {}", e);
    } else {
        info!("Transcript saved to {}", transcript_path.display());
    }

    Ok(transcript)
}

/// Default transcript location, `<video stem>.transcript.json` next to the video
fn default_transcript_path(video: &Path, transcript: &Transcript) -> Result<PathBuf> {
    let name = run_workspace::transcript_name(&transcript.video_filename)?;
    Ok(video.parent().unwrap_or(Path::new(".")).join(name))
}
