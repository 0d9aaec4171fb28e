//! Fakes for the job pipeline
//!
//! Stand-ins for yt-dlp, ffmpeg and the Bot API that record what they were
//! asked to do and can be told to fail or to block.

#![allow(dead_code)] // each test binary uses a different subset

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use teloxide::types::{ChatId, MessageId};
use teloxide::{ApiError, RequestError};
use tokio::sync::Semaphore;

use doraboost::core::error::AppResult;
use doraboost::download::error::DownloadError;
use doraboost::download::ffmpeg::Transcoder;
use doraboost::download::job::{ChatSink, DeliveryKind};
use doraboost::download::options::ProcessingOptions;
use doraboost::download::workspace::JobWorkspace;
use doraboost::download::ytdlp::{RetrievedMedia, Retriever};
use doraboost::download::ytdlp_errors::RetrievalFailure;

/// How the fake retriever behaves for a URL.
#[derive(Debug, Clone)]
pub enum RetrieveBehavior {
    /// Write `<id>.<ext>` into the workspace
    Succeed { media_id: String },
    Fail(RetrievalFailure),
}

/// Fake yt-dlp.
pub struct FakeRetriever {
    default: RetrieveBehavior,
    /// URLs containing the key get the paired behavior instead of the default
    overrides: Vec<(String, RetrieveBehavior)>,
    calls: Mutex<Vec<String>>,
    workspaces: Mutex<Vec<PathBuf>>,
    gate: Option<Arc<Semaphore>>,
    entered: Arc<Semaphore>,
}

impl FakeRetriever {
    pub fn succeeding(media_id: &str) -> Self {
        Self::with_behavior(RetrieveBehavior::Succeed {
            media_id: media_id.to_string(),
        })
    }

    pub fn failing(failure: RetrievalFailure) -> Self {
        Self::with_behavior(RetrieveBehavior::Fail(failure))
    }

    fn with_behavior(default: RetrieveBehavior) -> Self {
        Self {
            default,
            overrides: Vec::new(),
            calls: Mutex::new(Vec::new()),
            workspaces: Mutex::new(Vec::new()),
            gate: None,
            entered: Arc::new(Semaphore::new(0)),
        }
    }

    pub fn with_override(mut self, url_part: &str, behavior: RetrieveBehavior) -> Self {
        self.overrides.push((url_part.to_string(), behavior));
        self
    }

    /// Every call waits for one permit from `gate`.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Waits until `n` more calls have started.
    pub async fn wait_entered(&self, n: u32) {
        self.entered.acquire_many(n).await.unwrap().forget();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn workspaces(&self) -> Vec<PathBuf> {
        self.workspaces.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for FakeRetriever {
    async fn retrieve(
        &self,
        url: &str,
        options: &ProcessingOptions,
        workspace: &JobWorkspace,
    ) -> Result<RetrievedMedia, DownloadError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.workspaces.lock().unwrap().push(workspace.path().to_path_buf());
        self.entered.add_permits(1);

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        let behavior = self
            .overrides
            .iter()
            .find(|(part, _)| url.contains(part.as_str()))
            .map(|(_, b)| b.clone())
            .unwrap_or_else(|| self.default.clone());

        match behavior {
            RetrieveBehavior::Succeed { media_id } => {
                let path = workspace.file(&format!("{}.{}", media_id, options.kind.extension()));
                tokio::fs::write(&path, b"source media").await.unwrap();
                Ok(RetrievedMedia { media_id, path })
            }
            RetrieveBehavior::Fail(failure) => Err(DownloadError::YtDlp {
                failure,
                detail: format!("fake failure for {}", url),
            }),
        }
    }
}

/// Fake ffmpeg.
pub struct FakeTranscoder {
    output_bytes: usize,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeTranscoder {
    pub fn succeeding() -> Self {
        Self::producing(64)
    }

    pub fn producing(output_bytes: usize) -> Self {
        Self {
            output_bytes,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Behaves like ffmpeg exiting with status 1.
    pub fn failing() -> Self {
        Self {
            output_bytes: 0,
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn boost(
        &self,
        source: &RetrievedMedia,
        options: &ProcessingOptions,
        workspace: &JobWorkspace,
    ) -> Result<PathBuf, DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(source.path.is_file(), "transcoder input missing");

        if self.fail {
            return Err(DownloadError::Ffmpeg("exit status: 1".into()));
        }

        let path = workspace.file(&options.output_file_name(&source.media_id));
        tokio::fs::write(&path, vec![0u8; self.output_bytes]).await.unwrap();
        Ok(path)
    }
}

/// Something the sink was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Text { id: i32, text: String },
    Edit { id: i32, text: String },
    Delete { id: i32 },
    File { kind: DeliveryKind, name: String, bytes: u64 },
}

/// Fake Bot API that records every call.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
    attempts: Mutex<Vec<DeliveryKind>>,
    next_id: AtomicI32,
    rejected: Vec<DeliveryKind>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `send_file` fails like a rejected upload.
    pub fn failing_uploads() -> Self {
        Self::rejecting(&[DeliveryKind::Audio, DeliveryKind::Video, DeliveryKind::Document])
    }

    /// Uploads of the given kinds fail; others go through.
    pub fn rejecting(kinds: &[DeliveryKind]) -> Self {
        Self {
            rejected: kinds.to_vec(),
            ..Self::default()
        }
    }

    /// Kinds of every upload attempt, rejected ones included.
    pub fn upload_attempts(&self) -> Vec<DeliveryKind> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn files(&self) -> Vec<(DeliveryKind, String, u64)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::File { kind, name, bytes } => Some((kind, name, bytes)),
                _ => None,
            })
            .collect()
    }

    /// Last text the user can see: final edit or last sent message.
    pub fn last_visible_text(&self) -> Option<String> {
        self.events().into_iter().rev().find_map(|e| match e {
            SinkEvent::Text { text, .. } | SinkEvent::Edit { text, .. } => Some(text),
            _ => None,
        })
    }
}

#[async_trait]
impl ChatSink for RecordingSink {
    async fn send_text(&self, _chat_id: ChatId, text: &str) -> AppResult<MessageId> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.events.lock().unwrap().push(SinkEvent::Text {
            id,
            text: text.to_string(),
        });
        Ok(MessageId(id))
    }

    async fn edit_text(&self, _chat_id: ChatId, message_id: MessageId, text: &str) -> AppResult<()> {
        self.events.lock().unwrap().push(SinkEvent::Edit {
            id: message_id.0,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete(&self, _chat_id: ChatId, message_id: MessageId) -> AppResult<()> {
        self.events.lock().unwrap().push(SinkEvent::Delete { id: message_id.0 });
        Ok(())
    }

    async fn send_file(&self, _chat_id: ChatId, kind: DeliveryKind, path: &Path) -> AppResult<()> {
        self.attempts.lock().unwrap().push(kind);
        if self.rejected.contains(&kind) {
            return Err(RequestError::Api(ApiError::Unknown("Request Entity Too Large".into())).into());
        }
        let bytes = std::fs::metadata(path)?.len();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        self.events.lock().unwrap().push(SinkEvent::File { kind, name, bytes });
        Ok(())
    }
}
