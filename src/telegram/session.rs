//! Per-chat conversation state
//!
//! A chat is `Idle`, waiting for the user to pick a format, or running a job.
//! The pending request owns the chat's admission slot, so dropping it (on
//! `/cancel`) frees the chat and taking it (on a choice) hands the slot to the job.

use dashmap::DashMap;
use std::time::Instant;
use teloxide::types::ChatId;

use crate::download::admission::{AdmissionGuard, ChatSlot};

/// Where a chat is in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    AwaitingChoice,
    Running,
}

/// URL waiting for a format choice.
#[derive(Debug)]
pub struct PendingRequest {
    pub url: String,
    pub created_at: Instant,
    slot: ChatSlot,
}

impl PendingRequest {
    /// Splits into the URL and the slot the job is going to hold.
    pub fn into_parts(self) -> (String, ChatSlot) {
        (self.url, self.slot)
    }
}

/// The chat is already admitted (awaiting a choice or running).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatBusy;

/// What `/cancel` actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    NothingToCancel,
    /// Pending choice dropped, slot freed
    ChoiceDropped,
    /// Slot of a running job freed; the job itself keeps going
    RunningReleased,
}

/// Pending requests plus the admission guard they draw slots from.
#[derive(Debug, Default)]
pub struct SessionStore {
    admission: AdmissionGuard,
    pending: DashMap<ChatId, PendingRequest>,
}

impl SessionStore {
    pub fn new(admission: AdmissionGuard) -> Self {
        Self {
            admission,
            pending: DashMap::new(),
        }
    }

    pub fn admission(&self) -> &AdmissionGuard {
        &self.admission
    }

    pub fn state(&self, chat_id: ChatId) -> ChatState {
        if self.pending.contains_key(&chat_id) {
            ChatState::AwaitingChoice
        } else if self.admission.is_busy(chat_id) {
            ChatState::Running
        } else {
            ChatState::Idle
        }
    }

    /// Admits the chat and remembers `url` until the user picks a format.
    pub fn begin(&self, chat_id: ChatId, url: String) -> Result<(), ChatBusy> {
        let slot = self.admission.try_claim(chat_id).ok_or(ChatBusy)?;
        self.pending.insert(
            chat_id,
            PendingRequest {
                url,
                created_at: Instant::now(),
                slot,
            },
        );
        Ok(())
    }

    /// Removes and returns the pending request, slot included.
    pub fn take(&self, chat_id: ChatId) -> Option<PendingRequest> {
        self.pending.remove(&chat_id).map(|(_, pending)| pending)
    }

    /// Clears the chat's pending request and frees its slot.
    pub fn cancel(&self, chat_id: ChatId) -> CancelOutcome {
        if let Some(pending) = self.take(chat_id) {
            log::info!(
                "Chat {} cancelled pending request after {:?}",
                chat_id.0,
                pending.created_at.elapsed()
            );
            return CancelOutcome::ChoiceDropped;
        }
        if self.admission.is_busy(chat_id) {
            self.admission.release(chat_id);
            log::info!("Chat {} released while its job is still running", chat_id.0);
            return CancelOutcome::RunningReleased;
        }
        CancelOutcome::NothingToCancel
    }
}
