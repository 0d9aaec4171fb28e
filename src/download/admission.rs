//! Per-chat admission control
//!
//! A chat may have at most one job in flight. The guard is a concurrent map
//! from chat id to the ticket of the admission that currently owns the chat.
//! Nothing waits here: a busy chat is simply turned away.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use teloxide::types::ChatId;

#[derive(Debug, Default)]
struct Inner {
    busy: DashMap<ChatId, u64>,
    next_ticket: AtomicU64,
}

/// Set of chats that currently have a job admitted.
///
/// Cheap to clone; all clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct AdmissionGuard {
    inner: Arc<Inner>,
}

impl AdmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the chat busy and returns the ticket, or `None` if it already was.
    ///
    /// Check and insert happen under the same shard lock.
    fn admit(&self, chat_id: ChatId) -> Option<u64> {
        match self.inner.busy.entry(chat_id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let ticket = self.inner.next_ticket.fetch_add(1, Ordering::Relaxed);
                slot.insert(ticket);
                Some(ticket)
            }
        }
    }

    /// Tries to admit a job for `chat_id`.
    ///
    /// Returns `false` without touching any state if the chat is already busy.
    pub fn try_acquire(&self, chat_id: ChatId) -> bool {
        self.admit(chat_id).is_some()
    }

    /// Same as [`try_acquire`](Self::try_acquire), but hands back a [`ChatSlot`]
    /// that releases the chat when dropped.
    pub fn try_claim(&self, chat_id: ChatId) -> Option<ChatSlot> {
        self.admit(chat_id).map(|ticket| ChatSlot {
            guard: self.clone(),
            chat_id,
            ticket,
        })
    }

    /// Unconditionally frees the chat. Releasing an idle chat is a no-op.
    pub fn release(&self, chat_id: ChatId) {
        if self.inner.busy.remove(&chat_id).is_some() {
            log::debug!("Released admission for chat {}", chat_id.0);
        }
    }

    pub fn is_busy(&self, chat_id: ChatId) -> bool {
        self.inner.busy.contains_key(&chat_id)
    }

    pub fn busy_count(&self) -> usize {
        self.inner.busy.len()
    }
}

/// Ownership of one chat's admission.
///
/// Dropping the slot frees the chat, but only if the chat is still held under
/// this slot's ticket. After a forced [`AdmissionGuard::release`] and a fresh
/// admission, the old slot's drop leaves the new admission alone.
#[derive(Debug)]
pub struct ChatSlot {
    guard: AdmissionGuard,
    chat_id: ChatId,
    ticket: u64,
}

impl ChatSlot {
    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }
}

impl Drop for ChatSlot {
    fn drop(&mut self) {
        let ticket = self.ticket;
        if self
            .guard
            .inner
            .busy
            .remove_if(&self.chat_id, |_, held| *held == ticket)
            .is_some()
        {
            log::debug!("Chat {} slot #{} released", self.chat_id.0, ticket);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    const CHAT: ChatId = ChatId(42);

    #[test]
    fn test_second_acquire_rejected_until_release() {
        let guard = AdmissionGuard::new();
        assert!(guard.try_acquire(CHAT));
        assert!(!guard.try_acquire(CHAT));
        assert!(!guard.try_acquire(CHAT));

        guard.release(CHAT);
        assert!(guard.try_acquire(CHAT));
    }

    #[test]
    fn test_chats_are_independent() {
        let guard = AdmissionGuard::new();
        assert!(guard.try_acquire(ChatId(1)));
        assert!(guard.try_acquire(ChatId(2)));
        assert_eq!(guard.busy_count(), 2);
    }

    #[test]
    fn test_release_without_acquire_is_noop() {
        let guard = AdmissionGuard::new();
        assert!(guard.try_acquire(ChatId(7)));

        guard.release(CHAT);
        guard.release(CHAT);

        assert_eq!(guard.busy_count(), 1);
        assert!(guard.is_busy(ChatId(7)));
        assert!(!guard.is_busy(CHAT));
    }

    #[test]
    fn test_slot_releases_on_drop() {
        let guard = AdmissionGuard::new();
        {
            let slot = guard.try_claim(CHAT).unwrap();
            assert_eq!(slot.chat_id(), CHAT);
            assert!(guard.try_claim(CHAT).is_none());
        }
        assert!(!guard.is_busy(CHAT));
        assert!(guard.try_acquire(CHAT));
    }

    #[test]
    fn test_stale_slot_does_not_free_newer_admission() {
        let guard = AdmissionGuard::new();
        let stale = guard.try_claim(CHAT).unwrap();

        // forced release, e.g. /cancel while running
        guard.release(CHAT);
        let fresh = guard.try_claim(CHAT).unwrap();

        drop(stale);
        assert!(guard.is_busy(CHAT), "stale drop must not release the fresh slot");

        drop(fresh);
        assert!(!guard.is_busy(CHAT));
    }

    #[test]
    fn test_slot_released_when_owner_panics() {
        let guard = AdmissionGuard::new();
        let slot = guard.try_claim(CHAT).unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _slot = slot;
            panic!("job blew up");
        }));

        assert!(result.is_err());
        assert!(!guard.is_busy(CHAT));
    }

    #[test]
    fn test_concurrent_acquire_admits_exactly_one() {
        let guard = AdmissionGuard::new();
        let admitted = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let guard = guard.clone();
                let admitted = Arc::clone(&admitted);
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        if guard.try_acquire(CHAT) {
                            admitted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_claim_release_never_double_admits() {
        let guard = AdmissionGuard::new();
        let holders = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = guard.clone();
                let holders = Arc::clone(&holders);
                std::thread::spawn(move || {
                    for _ in 0..2_000 {
                        if let Some(slot) = guard.try_claim(CHAT) {
                            let now = holders.fetch_add(1, Ordering::SeqCst) + 1;
                            assert_eq!(now, 1, "two holders admitted at once");
                            holders.fetch_sub(1, Ordering::SeqCst);
                            drop(slot);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(!guard.is_busy(CHAT));
    }
}
