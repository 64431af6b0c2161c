/*!
 * Tests for external tool invocation and stderr filtering
 */

use std::time::Duration;
use anyhow::Result;
use vidscribe::command_runner::{filter_tool_stderr, CommandRunner, SystemCommandRunner};
use vidscribe::errors::CommandError;

const TRANSCODER_STDERR: &str = "\
ffmpeg version 6.0 Copyright (c) 2000-2023 the FFmpeg developers
  built with gcc 12 (GCC)
  configuration: --prefix=/usr
  libavutil      58.  2.100 / 58.  2.100
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'movie.mp4':
  Duration: 00:01:30.05, start: 0.000000, bitrate: 1146 kb/s

movie.mp4: No such file or directory";

/// Test that banner noise is stripped and the failure line kept
#[test]
fn test_filter_tool_stderr_withBannerAndError_shouldKeepOnlyErrorLine() {
    let filtered = filter_tool_stderr(TRANSCODER_STDERR);
    assert_eq!(filtered, "movie.mp4: No such file or directory");
}

/// Test filtering output that is nothing but banner noise
#[test]
fn test_filter_tool_stderr_withOnlyNoise_shouldReturnPlaceholder() {
    let stderr = "ffmpeg version 6.0\n  built with gcc 12\nStream mapping:\nframe=  100 fps=25\n";
    let filtered = filter_tool_stderr(stderr);
    assert_eq!(filtered, "unknown tool error (stderr was empty after filtering)");
}

/// Test that only the tail of a long diagnostic is kept
#[test]
fn test_filter_tool_stderr_withLongOutput_shouldKeepTailLines() {
    let stderr = (1..=20)
        .map(|i| format!("line {}", i))
        .collect::<Vec<_>>()
        .join("\n");

    let filtered = filter_tool_stderr(&stderr);

    assert_eq!(filtered.lines().count(), 15);
    assert!(filtered.starts_with("line 6"));
    assert!(filtered.ends_with("line 20"));
}

/// Test running a real command that succeeds
#[tokio::test]
async fn test_run_withEchoCommand_shouldCaptureStdout() -> Result<()> {
    let runner = SystemCommandRunner;
    let output = runner
        .run("echo", &["hello".to_string()], Duration::from_secs(5))
        .await?;

    assert!(output.success);
    assert_eq!(output.exit_code, Some(0));
    assert!(output.stdout.contains("hello"));
    Ok(())
}

/// Test running a real command that exits nonzero
#[tokio::test]
async fn test_run_withFailingCommand_shouldReportExitCode() -> Result<()> {
    let runner = SystemCommandRunner;
    let output = runner.run("false", &[], Duration::from_secs(5)).await?;

    assert!(!output.success);
    assert_eq!(output.exit_code, Some(1));
    Ok(())
}

/// Test launching a binary that does not exist
#[tokio::test]
async fn test_run_withMissingBinary_shouldReturnLaunchError() {
    let runner = SystemCommandRunner;
    let result = runner
        .run("vidscribe-no-such-tool", &[], Duration::from_secs(5))
        .await;

    match result {
        Err(CommandError::Launch { program, .. }) => {
            assert_eq!(program, "vidscribe-no-such-tool");
        }
        other => panic!("expected Launch error, got {:?}", other),
    }
}

/// Test that a command exceeding its timeout is cut off
#[tokio::test]
async fn test_run_withSlowCommand_shouldTimeOut() {
    let runner = SystemCommandRunner;
    let result = runner
        .run("sleep", &["5".to_string()], Duration::from_millis(100))
        .await;

    match result {
        Err(CommandError::TimedOut { program, .. }) => {
            assert_eq!(program, "sleep");
        }
        other => panic!("expected TimedOut error, got {:?}", other),
    }
}
