use std::fmt;

use crate::download::ytdlp_errors::RetrievalFailure;

/// Generic message for failures the user can do nothing about.
pub const GENERIC_FAILURE_MESSAGE: &str = "❌ Ошибка обработки. Попробуйте позже.";

/// Message for outputs over the Bot API upload limit.
pub const TOO_LARGE_MESSAGE: &str = "❌ Файл получился слишком большим для отправки в Telegram.";

/// Structured error type for a boost job.
///
/// Each variant maps to one step of the job, which keeps the user message
/// and the log category in one place.
#[derive(Debug)]
pub enum DownloadError {
    /// yt-dlp failed (exit code, missing output, extractor error)
    YtDlp { failure: RetrievalFailure, detail: String },
    /// ffmpeg exited non-zero or could not be started
    Ffmpeg(String),
    /// Expected file not found after a step reported success
    FileNotFound(String),
    /// Output exceeds the upload limit (size in bytes)
    TooLarge(u64),
    /// Failed to send the file via Telegram API
    SendFailed(String),
    /// Workspace could not be created
    Workspace(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::YtDlp { failure, detail } => write!(f, "yt-dlp ({}): {}", failure.as_str(), detail),
            DownloadError::Ffmpeg(msg) => write!(f, "ffmpeg: {}", msg),
            DownloadError::FileNotFound(msg) => write!(f, "file not found: {}", msg),
            DownloadError::TooLarge(size) => write!(f, "output too large: {} bytes", size),
            DownloadError::SendFailed(msg) => write!(f, "send failed: {}", msg),
            DownloadError::Workspace(msg) => write!(f, "workspace: {}", msg),
        }
    }
}

impl std::error::Error for DownloadError {}

impl DownloadError {
    /// Returns subcategory for logs
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::YtDlp { .. } => "ytdlp",
            DownloadError::Ffmpeg(_) => "ffmpeg",
            DownloadError::FileNotFound(_) => "file_not_found",
            DownloadError::TooLarge(_) => "too_large",
            DownloadError::SendFailed(_) => "send_failed",
            DownloadError::Workspace(_) => "workspace",
        }
    }

    /// Text sent to the chat when the job ends with this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            DownloadError::YtDlp { failure, .. } => failure.user_message(),
            DownloadError::TooLarge(_) => TOO_LARGE_MESSAGE,
            DownloadError::Ffmpeg(_)
            | DownloadError::FileNotFound(_)
            | DownloadError::SendFailed(_)
            | DownloadError::Workspace(_) => GENERIC_FAILURE_MESSAGE,
        }
    }
}
