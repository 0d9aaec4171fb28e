//! Retrieval step: fetches the source media with yt-dlp

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::core::config;
use crate::core::process::run_captured;
use crate::core::validation::substitute_host;
use crate::download::error::DownloadError;
use crate::download::options::ProcessingOptions;
use crate::download::workspace::JobWorkspace;
use crate::download::ytdlp_errors::{classify_ytdlp_error, summarize_stderr, RetrievalFailure};

/// Source file produced by a retriever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedMedia {
    /// Platform-assigned id, also the file stem
    pub media_id: String,
    pub path: PathBuf,
}

impl RetrievedMedia {
    /// Builds the record from a file path named `<id>.<ext>`.
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let media_id = path.file_stem()?.to_str()?.to_string();
        if media_id.is_empty() {
            return None;
        }
        Some(Self { media_id, path })
    }
}

/// Fetches media for `url` into the workspace.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(
        &self,
        url: &str,
        options: &ProcessingOptions,
        workspace: &JobWorkspace,
    ) -> Result<RetrievedMedia, DownloadError>;
}

/// [`Retriever`] backed by the yt-dlp binary.
#[derive(Debug, Clone)]
pub struct YtDlpRetriever {
    bin: String,
}

impl YtDlpRetriever {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    pub fn from_config() -> Self {
        Self::new(config::YTDL_BIN.as_str())
    }

    /// Full argument list for one invocation.
    pub fn build_args(url: &str, options: &ProcessingOptions, output_template: &str) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--no-playlist".into(),
            "--no-progress".into(),
            "--no-warnings".into(),
            "-f".into(),
            options.format_selector(),
            "-o".into(),
            output_template.into(),
        ];
        args.extend(options.ytdlp_postprocess_args());
        // final path after post-processing, one line on stdout
        args.extend(["--print".into(), "after_move:filepath".into(), "--no-simulate".into()]);
        args.push(url.into());
        args
    }
}

#[async_trait]
impl Retriever for YtDlpRetriever {
    async fn retrieve(
        &self,
        url: &str,
        options: &ProcessingOptions,
        workspace: &JobWorkspace,
    ) -> Result<RetrievedMedia, DownloadError> {
        let args = Self::build_args(url, options, &workspace.output_template());
        log::info!("yt-dlp: fetching {} ({})", url, options);

        let output = run_captured(Command::new(&self.bin).args(&args))
            .await
            .map_err(|e| DownloadError::YtDlp {
                failure: RetrievalFailure::Unavailable,
                detail: format!("failed to run {}: {}", self.bin, e),
            })?;

        if !output.success() {
            let failure = classify_ytdlp_error(&output.stderr);
            let detail = summarize_stderr(&output.stderr).to_string();
            log::warn!("yt-dlp failed for {} ({}): {}", url, failure.as_str(), detail);
            return Err(DownloadError::YtDlp { failure, detail });
        }

        let printed = output.last_stdout_line().map(PathBuf::from).filter(|p| p.is_file());
        let path = match printed {
            Some(path) => path,
            None => find_output(workspace.path(), options.kind.extension())
                .await
                .ok_or_else(|| {
                    DownloadError::FileNotFound(format!("yt-dlp produced no .{} file", options.kind.extension()))
                })?,
        };

        RetrievedMedia::from_path(path.clone())
            .ok_or_else(|| DownloadError::FileNotFound(format!("unexpected file name: {}", path.display())))
    }
}

/// First file in `dir` with the given extension.
async fn find_output(dir: &Path, extension: &str) -> Option<PathBuf> {
    let mut entries = tokio::fs::read_dir(dir).await.ok()?;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some(extension) && path.is_file() {
            return Some(path);
        }
    }
    None
}

/// Runs the retriever, and on failure retries exactly once against `mirror_host`.
///
/// Best-effort: if the mirror attempt fails too, the original error is returned.
pub async fn retrieve_with_mirror(
    retriever: &dyn Retriever,
    url: &str,
    options: &ProcessingOptions,
    workspace: &JobWorkspace,
    mirror_host: Option<&str>,
) -> Result<RetrievedMedia, DownloadError> {
    let first_err = match retriever.retrieve(url, options, workspace).await {
        Ok(media) => return Ok(media),
        Err(e) => e,
    };

    let Some(mirror) = mirror_host else {
        return Err(first_err);
    };
    let mirror_url = match substitute_host(url, mirror) {
        Ok(u) => u,
        Err(e) => {
            log::warn!("Mirror fallback skipped: {}", e);
            return Err(first_err);
        }
    };

    log::info!("Retrying via mirror: {}", mirror_url);
    match retriever.retrieve(&mirror_url, options, workspace).await {
        Ok(media) => Ok(media),
        Err(mirror_err) => {
            log::warn!("Mirror attempt failed too: {}", mirror_err);
            Err(first_err)
        }
    }
}

/// Returns the yt-dlp version string, or `None` if the binary can't be run.
pub async fn ytdlp_version(bin: &str) -> Option<String> {
    let output = run_captured(Command::new(bin).arg("--version")).await.ok()?;
    if !output.success() {
        return None;
    }
    output.last_stdout_line().map(str::to_string)
}
