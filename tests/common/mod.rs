//! Common test utilities
//!
//! This module is shared across all integration tests

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use teloxide::types::ChatId;
use tempfile::TempDir;

use doraboost::download::admission::{AdmissionGuard, ChatSlot};
use doraboost::download::ffmpeg::Transcoder;
use doraboost::download::job::{JobRequest, JobRunner};
use doraboost::download::options::{Gain, OutputKind, ProcessingOptions};
use doraboost::download::ytdlp::Retriever;

pub const TEST_URL: &str = "https://www.youtube.com/watch?v=abc123";

pub fn create_test_chat_id() -> ChatId {
    ChatId(123456789)
}

/// Scratch root for job workspaces, removed with the test.
pub struct TestEnvironment {
    pub root: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("create test root"),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn runner(&self, retriever: Arc<dyn Retriever>, transcoder: Arc<dyn Transcoder>) -> JobRunner {
        JobRunner::new(retriever, transcoder).with_workspace_root(self.path())
    }

    /// Entries left under the root; empty once every job cleaned up.
    pub fn leftovers(&self) -> Vec<String> {
        list_dir(self.path())
    }
}

pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

pub fn request(chat_id: ChatId, kind: OutputKind, gain: Gain) -> JobRequest {
    JobRequest {
        chat_id,
        url: TEST_URL.to_string(),
        options: ProcessingOptions::new(kind, gain).with_max_height(240),
    }
}

/// Admits `chat_id` and returns its slot.
pub fn claim(guard: &AdmissionGuard, chat_id: ChatId) -> ChatSlot {
    guard.try_claim(chat_id).expect("chat should be free")
}
