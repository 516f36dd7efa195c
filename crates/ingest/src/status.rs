//! Shared listener status: connection state plus ingestion counters.
//!
//! A [`ListenerHandle`] is cheap to clone; the listener task writes to it and
//! the HTTP health endpoint reads from it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::processor::IngestOutcome;

/// Connection state of the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerState {
    Disconnected,
    Connected,
}

/// Point-in-time copy of the ingestion counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Messages taken off the subscribed topic.
    pub received: u64,
    /// Readings written to the store.
    pub stored: u64,
    /// Decoded readings that failed validation.
    pub rejected: u64,
    /// Payloads that could not be decoded.
    pub malformed: u64,
    /// Valid readings the store failed to persist.
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Inner {
    connected: AtomicBool,
    received: AtomicU64,
    stored: AtomicU64,
    rejected: AtomicU64,
    malformed: AtomicU64,
    failed: AtomicU64,
}

/// Cloneable handle onto the listener's live status.
#[derive(Debug, Clone, Default)]
pub struct ListenerHandle {
    inner: Arc<Inner>,
}

impl ListenerHandle {
    /// A fresh handle in the `disconnected` state with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ListenerState {
        if self.inner.connected.load(Ordering::Acquire) {
            ListenerState::Connected
        } else {
            ListenerState::Disconnected
        }
    }

    pub fn set_state(&self, state: ListenerState) {
        self.inner
            .connected
            .store(state == ListenerState::Connected, Ordering::Release);
    }

    /// Count one message taken off the topic and how it was handled.
    pub fn record(&self, outcome: &IngestOutcome) {
        self.inner.received.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            IngestOutcome::Stored(_) => &self.inner.stored,
            IngestOutcome::Rejected(_) => &self.inner.rejected,
            IngestOutcome::Malformed(_) => &self.inner.malformed,
            IngestOutcome::StoreFailed(_) => &self.inner.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> IngestStats {
        IngestStats {
            received: self.inner.received.load(Ordering::Relaxed),
            stored: self.inner.stored.load(Ordering::Relaxed),
            rejected: self.inner.rejected.load(Ordering::Relaxed),
            malformed: self.inner.malformed.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
        }
    }
}
