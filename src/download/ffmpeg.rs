//! Gain step: boosts the audio of the retrieved file with ffmpeg

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::core::config;
use crate::core::process::run_captured;
use crate::download::error::DownloadError;
use crate::download::options::ProcessingOptions;
use crate::download::workspace::JobWorkspace;
use crate::download::ytdlp::RetrievedMedia;

/// Produces the boosted file inside the workspace.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn boost(
        &self,
        source: &RetrievedMedia,
        options: &ProcessingOptions,
        workspace: &JobWorkspace,
    ) -> Result<PathBuf, DownloadError>;
}

/// [`Transcoder`] backed by the ffmpeg binary.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    bin: String,
}

impl FfmpegTranscoder {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    pub fn from_config() -> Self {
        Self::new(config::FFMPEG_BIN.as_str())
    }

    /// Full argument list for one invocation.
    pub fn build_args(input: &Path, output: &Path, options: &ProcessingOptions) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
            "-i".into(),
            input.to_string_lossy().into_owned(),
            "-filter:a".into(),
            options.gain.filter(),
        ];
        args.extend(options.ffmpeg_codec_args());
        args.push(output.to_string_lossy().into_owned());
        args
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn boost(
        &self,
        source: &RetrievedMedia,
        options: &ProcessingOptions,
        workspace: &JobWorkspace,
    ) -> Result<PathBuf, DownloadError> {
        let output_path = workspace.file(&options.output_file_name(&source.media_id));
        let args = Self::build_args(&source.path, &output_path, options);
        log::info!("ffmpeg: {} -> {} ({})", source.path.display(), output_path.display(), options);

        let output = run_captured(Command::new(&self.bin).args(&args))
            .await
            .map_err(|e| DownloadError::Ffmpeg(format!("failed to run {}: {}", self.bin, e)))?;

        if !output.success() {
            log::error!("FFmpeg gain error ({}): {}", output.status, output.stderr.trim());
            return Err(DownloadError::Ffmpeg(format!("{}: {}", output.status, output.stderr.trim())));
        }

        if !output_path.is_file() {
            return Err(DownloadError::FileNotFound(output_path.display().to_string()));
        }

        Ok(output_path)
    }
}

/// Check if ffmpeg is available
pub async fn check_ffmpeg(bin: &str) -> bool {
    run_captured(Command::new(bin).arg("-version"))
        .await
        .map(|o| o.success())
        .unwrap_or(false)
}
