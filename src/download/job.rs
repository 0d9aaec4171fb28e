//! Job runner: retrieve, boost, deliver, clean up
//!
//! A job owns its chat's admission slot and its workspace. Both are released
//! by drop, so a job that fails, panics or is cancelled never leaves the chat
//! busy or a directory behind.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use teloxide::types::{ChatId, MessageId};

use crate::core::config;
use crate::core::error::AppResult;
use crate::download::admission::ChatSlot;
use crate::download::error::DownloadError;
use crate::download::ffmpeg::{FfmpegTranscoder, Transcoder};
use crate::download::options::{OutputKind, ProcessingOptions};
use crate::download::workspace::JobWorkspace;
use crate::download::ytdlp::{retrieve_with_mirror, Retriever, YtDlpRetriever};

pub const STATUS_RETRIEVING: &str = "🔄 Обрабатываю...";
pub const STATUS_BOOSTING: &str = "🔊 Усиливаю звук...";
pub const STATUS_UPLOADING: &str = "📤 Отправляю файл...";

/// How a produced file is attached to the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryKind {
    Audio,
    Video,
    Document,
}

impl From<OutputKind> for DeliveryKind {
    fn from(kind: OutputKind) -> Self {
        match kind {
            OutputKind::Audio => DeliveryKind::Audio,
            OutputKind::AudioVideo => DeliveryKind::Video,
        }
    }
}

/// The part of the messaging platform a job talks to.
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> AppResult<MessageId>;
    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> AppResult<()>;
    async fn delete(&self, chat_id: ChatId, message_id: MessageId) -> AppResult<()>;
    async fn send_file(&self, chat_id: ChatId, kind: DeliveryKind, path: &Path) -> AppResult<()>;
}

/// One admitted request.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub chat_id: ChatId,
    pub url: String,
    pub options: ProcessingOptions,
}

/// What a successful job delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub media_id: String,
    pub output_bytes: u64,
}

/// Runs boost jobs. Shared between all chats.
#[derive(Clone)]
pub struct JobRunner {
    retriever: Arc<dyn Retriever>,
    transcoder: Arc<dyn Transcoder>,
    workspace_root: PathBuf,
    mirror_host: Option<String>,
    max_upload_bytes: u64,
}

impl JobRunner {
    pub fn new(retriever: Arc<dyn Retriever>, transcoder: Arc<dyn Transcoder>) -> Self {
        Self {
            retriever,
            transcoder,
            workspace_root: config::TEMP_FILES_DIR.clone(),
            mirror_host: None,
            max_upload_bytes: config::media::upload_limit(config::BOT_API_URL.is_some()),
        }
    }

    /// yt-dlp + ffmpeg with paths and mirror taken from the environment.
    pub fn from_config() -> Self {
        Self::new(
            Arc::new(YtDlpRetriever::from_config()),
            Arc::new(FfmpegTranscoder::from_config()),
        )
        .with_mirror_host(config::YTDL_MIRROR_HOST.clone())
    }

    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    pub fn with_mirror_host(mut self, host: Option<String>) -> Self {
        self.mirror_host = host;
        self
    }

    pub fn with_max_upload_bytes(mut self, limit: u64) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    /// Runs the job to completion and reports the outcome to the chat.
    ///
    /// `slot` is held for the whole run and dropped on return.
    pub async fn run(&self, request: JobRequest, slot: ChatSlot, sink: &dyn ChatSink) -> Result<JobReport, DownloadError> {
        let _slot = slot;
        let chat_id = request.chat_id;
        log::info!("Job started for chat {}: {} ({})", chat_id.0, request.url, request.options);

        let status = match sink.send_text(chat_id, STATUS_RETRIEVING).await {
            Ok(id) => Some(id),
            Err(e) => {
                log::warn!("Failed to send status message to chat {}: {}", chat_id.0, e);
                None
            }
        };

        let result = self.execute(&request, sink, status).await;

        match &result {
            Ok(report) => {
                log::info!(
                    "Job done for chat {}: {} ({} bytes)",
                    chat_id.0,
                    report.media_id,
                    report.output_bytes
                );
                if let Some(id) = status {
                    if let Err(e) = sink.delete(chat_id, id).await {
                        log::warn!("Failed to delete status message in chat {}: {}", chat_id.0, e);
                    }
                }
            }
            Err(err) => {
                log::error!("Job failed for chat {} [{}]: {}", chat_id.0, err.subcategory(), err);
                report_failure(sink, chat_id, status, err.user_message()).await;
            }
        }

        result
    }

    async fn execute(
        &self,
        request: &JobRequest,
        sink: &dyn ChatSink,
        status: Option<MessageId>,
    ) -> Result<JobReport, DownloadError> {
        let chat_id = request.chat_id;
        let options = &request.options;

        let workspace = JobWorkspace::create(self.workspace_root.clone())
            .await
            .map_err(|e| DownloadError::Workspace(format!("{}: {}", self.workspace_root.display(), e)))?;

        let media = retrieve_with_mirror(
            self.retriever.as_ref(),
            &request.url,
            options,
            &workspace,
            self.mirror_host.as_deref(),
        )
        .await?;

        update_status(sink, chat_id, status, STATUS_BOOSTING).await;
        let output = self.transcoder.boost(&media, options, &workspace).await?;

        let output_bytes = tokio::fs::metadata(&output)
            .await
            .map_err(|e| DownloadError::FileNotFound(format!("{}: {}", output.display(), e)))?
            .len();
        if output_bytes > self.max_upload_bytes {
            return Err(DownloadError::TooLarge(output_bytes));
        }

        update_status(sink, chat_id, status, STATUS_UPLOADING).await;
        deliver(sink, chat_id, options.kind.into(), &output).await?;

        if let Err(e) = workspace.close().await {
            log::warn!("Failed to remove workspace for chat {}: {}", chat_id.0, e);
        }

        Ok(JobReport {
            media_id: media.media_id,
            output_bytes,
        })
    }
}

/// Uploads `path` as `kind`, then once more as a plain document if that was rejected.
async fn deliver(sink: &dyn ChatSink, chat_id: ChatId, kind: DeliveryKind, path: &Path) -> Result<(), DownloadError> {
    let first_err = match sink.send_file(chat_id, kind, path).await {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    // a timed-out upload may still show up in the chat
    if kind == DeliveryKind::Document || first_err.is_timeout() {
        return Err(DownloadError::SendFailed(first_err.to_string()));
    }

    log::warn!(
        "send as {:?} failed for chat {}: {}, trying as document",
        kind,
        chat_id.0,
        first_err
    );
    sink.send_file(chat_id, DeliveryKind::Document, path)
        .await
        .map_err(|e| DownloadError::SendFailed(format!("{}; as document: {}", first_err, e)))
}

async fn update_status(sink: &dyn ChatSink, chat_id: ChatId, status: Option<MessageId>, text: &str) {
    if let Some(id) = status {
        if let Err(e) = sink.edit_text(chat_id, id, text).await {
            log::debug!("Status update skipped for chat {}: {}", chat_id.0, e);
        }
    }
}

/// Turns the status message into the failure text, or sends a new message.
async fn report_failure(sink: &dyn ChatSink, chat_id: ChatId, status: Option<MessageId>, text: &str) {
    if let Some(id) = status {
        if sink.edit_text(chat_id, id, text).await.is_ok() {
            return;
        }
    }
    if let Err(e) = sink.send_text(chat_id, text).await {
        log::error!("Failed to report job failure to chat {}: {}", chat_id.0, e);
    }
}
