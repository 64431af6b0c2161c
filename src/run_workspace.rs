/*!
 * Per-run artifact workspace.
 *
 * Every pipeline run gets a unique token. Intermediate artifacts (extracted
 * audio, recognizer sidecars) live in a token-named directory under the work
 * dir, so concurrent runs against the same video never touch each other's
 * files. Final artifact names stay deterministic and are derived here.
 */

use std::path::{Path, PathBuf};
use std::time::Duration;
use log::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::errors::PipelineError;
use crate::file_utils::{self, FileManager};

// @module: Run tokens and intermediate storage

// @const: Prefix for per-run directories under the work dir
const RUN_DIR_PREFIX: &str = "run-";

// @const: Token length in hex characters, plenty for runs within one deployment
const RUN_TOKEN_LEN: usize = 12;

/// Mint a fresh run token
pub fn new_run_token() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(RUN_TOKEN_LEN);
    token
}

/// Subtitle file name for a video display name, `<stem>.srt`
pub fn subtitle_name(video_filename: &str) -> Result<String, PipelineError> {
    let cleaned = file_utils::sanitize_file_name(video_filename)?;
    Ok(Path::new(&cleaned).with_extension("srt").to_string_lossy().into_owned())
}

/// Transcript document name for a video display name, `<stem>.transcript.json`
pub fn transcript_name(video_filename: &str) -> Result<String, PipelineError> {
    let cleaned = file_utils::sanitize_file_name(video_filename)?;
    Ok(Path::new(&cleaned)
        .with_extension("transcript.json")
        .to_string_lossy()
        .into_owned())
}

/// A token-named directory holding one run's intermediate artifacts
#[derive(Debug, Clone)]
pub struct RunWorkspace {
    /// Unique token identifying this run
    token: String,
    /// Directory holding the run's intermediates
    dir: PathBuf,
}

impl RunWorkspace {
    /// Create a workspace with a fresh token under `work_dir`
    pub fn create<P: AsRef<Path>>(work_dir: P) -> Result<Self, PipelineError> {
        let token = new_run_token();
        let dir = work_dir.as_ref().join(format!("{}{}", RUN_DIR_PREFIX, token));

        FileManager::ensure_dir(&dir).map_err(|e| {
            PipelineError::Storage(format!("Failed to create run workspace {}: {}", dir.display(), e))
        })?;

        debug!("Run {} workspace at {}", token, dir.display());
        Ok(RunWorkspace { token, dir })
    }

    /// The run token
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The workspace directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for an intermediate artifact inside the workspace
    pub fn intermediate(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Remove the workspace and everything left in it. Best effort; a run
    /// that already produced its result should not fail over leftover
    /// intermediates.
    pub fn cleanup(&self) {
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not remove run workspace {}: {}", self.dir.display(), e);
            }
        }
    }

    /// Delete run directories older than `max_age`, left behind by runs that
    /// never reached cleanup. Returns how many were removed.
    pub fn sweep_stale<P: AsRef<Path>>(work_dir: P, max_age: Duration) -> usize {
        let mut removed = 0;

        for entry in WalkDir::new(work_dir.as_ref())
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .flatten()
        {
            if !entry.file_type().is_dir() {
                continue;
            }
            if !entry.file_name().to_string_lossy().starts_with(RUN_DIR_PREFIX) {
                continue;
            }

            // Never delete what we cannot date
            let age = match entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .and_then(|t| t.elapsed().ok())
            {
                Some(age) => age,
                None => continue,
            };

            if age >= max_age {
                match std::fs::remove_dir_all(entry.path()) {
                    Ok(()) => {
                        debug!("Swept stale run workspace {}", entry.path().display());
                        removed += 1;
                    }
                    Err(e) => warn!("Could not sweep {}: {}", entry.path().display(), e),
                }
            }
        }

        removed
    }
}
