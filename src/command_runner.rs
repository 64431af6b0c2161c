/*!
 * External tool invocation boundary.
 *
 * Every process the pipeline spawns goes through the `CommandRunner` trait, so
 * services can be exercised without a transcoder or recognizer on the host.
 * The real implementation shells out through tokio with a hard timeout.
 */

use std::fmt::Debug;
use std::time::Duration;
use async_trait::async_trait;
use log::{debug, trace};
use tokio::process::Command;

use crate::errors::CommandError;

// @module: External command execution

// @const: Banner prefixes a transcoder prints to stderr on every invocation.
// Lines starting with these carry no diagnostic value when a run fails.
const NOISE_PREFIXES: [&str; 13] = [
    "ffmpeg version",
    "  built with",
    "  configuration:",
    "  lib",
    "Input #",
    "  Metadata:",
    "  Duration:",
    "  Stream #",
    "Output #",
    "Stream mapping:",
    "Press [q]",
    "frame=",
    "size=",
];

// @const: How many meaningful stderr lines to keep. Tools report the actual
// failure at the tail of their output.
const MAX_DIAGNOSTIC_LINES: usize = 15;

/// Reduce raw tool stderr to the lines worth surfacing in an error.
pub fn filter_tool_stderr(stderr: &str) -> String {
    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| {
            if line.trim().is_empty() {
                return false;
            }
            !NOISE_PREFIXES.iter().any(|p| line.starts_with(p))
        })
        .collect();

    if meaningful.is_empty() {
        return "unknown tool error (stderr was empty after filtering)".to_string();
    }

    let start = meaningful.len().saturating_sub(MAX_DIAGNOSTIC_LINES);
    meaningful[start..].join("\n")
}

/// Captured outcome of one finished tool invocation
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Whether the tool exited with status zero
    pub success: bool,
    /// Raw exit code, when the OS reported one
    pub exit_code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Filtered stderr suitable for error reporting
    pub fn diagnostic(&self) -> String {
        filter_tool_stderr(&self.stderr)
    }
}

/// Runs external tools to completion and captures their output
#[async_trait]
pub trait CommandRunner: Send + Sync + Debug {
    /// Run `program` with `args`, waiting at most `timeout` for it to finish
    async fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<CommandOutput, CommandError>;
}

/// `CommandRunner` backed by real processes on the host system
#[derive(Debug, Default, Clone)]
pub struct SystemCommandRunner;

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<CommandOutput, CommandError> {
        debug!("Invoking {} with {} arguments", program, args.len());
        trace!("{} {}", program, args.join(" "));

        let command_future = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output();

        let output = tokio::select! {
            result = command_future => {
                result.map_err(|source| CommandError::Launch {
                    program: program.to_string(),
                    source,
                })?
            },
            _ = tokio::time::sleep(timeout) => {
                return Err(CommandError::TimedOut {
                    program: program.to_string(),
                    timeout_secs: timeout.as_secs(),
                });
            }
        };

        Ok(CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
