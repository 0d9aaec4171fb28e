use thiserror::Error;

/// Errors from talking to Telegram and the filesystem.
///
/// Job failures have their own categorized type, see [`crate::download::error::DownloadError`].
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// The request timed out on the wire; Telegram may still have received it.
    pub fn is_timeout(&self) -> bool {
        match self {
            AppError::Telegram(teloxide::RequestError::Network(e)) => e.is_timeout(),
            _ => false,
        }
    }
}
