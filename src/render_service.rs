/*!
 * Subtitle burn-in via the external renderer.
 *
 * Re-encodes a video with an SRT file baked into the picture through the
 * renderer's subtitles filter. The subtitle path goes inside a filter
 * directive, so it needs its own escaping rules, not shell quoting.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use log::{debug, error, info};

use crate::app_config::RenderConfig;
use crate::command_runner::CommandRunner;
use crate::errors::PipelineError;

// @module: Burned-in subtitle rendering

// @const: Marker prepended to the source video name to form the output name
pub const RENDERED_PREFIX: &str = "subtitled_";

pub struct RenderService {
    /// Renderer tool settings
    config: RenderConfig,
    /// Seam for spawning the renderer
    runner: Arc<dyn CommandRunner>,
}

impl RenderService {
    /// Create a new render service
    pub fn new(config: RenderConfig, runner: Arc<dyn CommandRunner>) -> Self {
        RenderService { config, runner }
    }

    /// Escape a subtitle path for use inside a subtitles filter directive.
    ///
    /// The filter graph parser and the filter itself each strip one escape
    /// level, so a colon (as in Windows drive letters) needs two backslashes
    /// in the argument string. Separators are normalized to forward slashes,
    /// which the renderer accepts on every platform.
    pub fn escape_filter_path(path: &Path) -> String {
        path.to_string_lossy().replace('\\', "/").replace(':', "\\\\:")
    }

    /// The full subtitles filter directive for `subtitle_path`
    pub fn subtitles_filter(subtitle_path: &Path) -> String {
        format!("subtitles={}", Self::escape_filter_path(subtitle_path))
    }

    /// Output file name for a source video name
    pub fn rendered_name(video_filename: &str) -> String {
        format!("{}{}", RENDERED_PREFIX, video_filename)
    }

    /// Renderer arguments for one burn-in call
    pub fn build_args(&self, video_path: &Path, subtitle_path: &Path, output_path: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            video_path.to_string_lossy().into_owned(),
            "-vf".to_string(),
            Self::subtitles_filter(subtitle_path),
            "-c:v".to_string(),
            self.config.video_codec.clone(),
            "-preset".to_string(),
            self.config.preset.clone(),
            "-crf".to_string(),
            self.config.crf.to_string(),
            "-c:a".to_string(),
            "copy".to_string(),
            "-y".to_string(),
            output_path.to_string_lossy().into_owned(),
        ]
    }

    /// Burn `subtitle_path` into `video_path`, writing the result under
    /// `output_dir`. Returns the path of the rendered video.
    ///
    /// A failing renderer surfaces its filtered diagnostics in the error and
    /// is never retried here; re-running against the same inputs costs a full
    /// re-encode and tends to fail the same way.
    pub async fn render(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf, PipelineError> {
        let video_filename = video_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output_path = output_dir.join(Self::rendered_name(&video_filename));

        info!("Rendering subtitles into {}", output_path.display());
        debug!("Using filter {}", Self::subtitles_filter(subtitle_path));

        let args = self.build_args(video_path, subtitle_path, &output_path);
        let timeout = Duration::from_secs(self.config.timeout_secs);

        let output = self
            .runner
            .run(&self.config.renderer, &args, timeout)
            .await
            .map_err(|e| PipelineError::Render { detail: e.to_string() })?;

        if !output.success {
            let detail = output.diagnostic();
            error!("Renderer exited with code {:?}: {}", output.exit_code, detail);
            return Err(PipelineError::Render { detail });
        }

        // A zero exit with no file on disk is still a failed render
        if !output_path.is_file() {
            return Err(PipelineError::Render {
                detail: format!("Renderer reported success but produced no file at {}", output_path.display()),
            });
        }

        Ok(output_path)
    }
}
