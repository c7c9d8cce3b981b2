//! Scoped access to source bytes during processing.
//!
//! Every decode/encode works on a [`SourceHandle`] obtained from a
//! [`HandleTracker`]. Dropping the handle releases it, so it is released on
//! the success path, the error path and during unwinding alike.

use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct HandleTracker {
    live: Arc<AtomicUsize>,
    acquired: Arc<AtomicUsize>,
}

impl HandleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, data: Bytes) -> SourceHandle {
        self.live.fetch_add(1, Ordering::SeqCst);
        self.acquired.fetch_add(1, Ordering::SeqCst);
        SourceHandle {
            data,
            live: Arc::clone(&self.live),
        }
    }

    /// Handles currently held.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Handles acquired since creation.
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct SourceHandle {
    data: Bytes,
    live: Arc<AtomicUsize>,
}

impl SourceHandle {
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Drop for SourceHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}
