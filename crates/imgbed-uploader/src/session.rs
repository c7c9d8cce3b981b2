//! Upload session state machine: `Idle -> Uploading(progress) -> Idle`.
//!
//! The current [`UploadSession`] is published on a `watch` channel so any
//! number of observers see the latest value. At most one session is active;
//! [`SessionTracker::begin`] refuses a second one.

use imgbed_core::{ProgressCallback, UploadSession};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::UploadError;

#[derive(Clone)]
pub struct SessionTracker {
    tx: Arc<watch::Sender<UploadSession>>,
    generation: Arc<AtomicU64>,
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(UploadSession::default());
        Self {
            tx: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move to `Uploading` with progress 0, or fail with `SessionBusy`.
    pub fn begin(&self) -> Result<SessionGuard, UploadError> {
        let started = self.tx.send_if_modified(|session| {
            if session.is_uploading {
                return false;
            }
            *session = UploadSession {
                is_uploading: true,
                progress_percent: 0,
            };
            true
        });

        if !started {
            tracing::debug!("Upload rejected, another session is active");
            return Err(UploadError::SessionBusy);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SessionGuard {
            tx: Arc::clone(&self.tx),
            generation: Arc::clone(&self.generation),
            id: generation,
        })
    }

    pub fn current(&self) -> UploadSession {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadSession> {
        self.tx.subscribe()
    }
}

/// An active session. Dropping it returns the tracker to `Idle` with
/// progress 0, whatever the outcome of the call.
pub struct SessionGuard {
    tx: Arc<watch::Sender<UploadSession>>,
    generation: Arc<AtomicU64>,
    id: u64,
}

impl SessionGuard {
    /// Wrap `user` so every report also updates this session's progress.
    ///
    /// Reports arriving after the session settled are still forwarded to
    /// `user` but no longer touch the published session.
    pub fn progress_callback(&self, user: ProgressCallback) -> ProgressCallback {
        let tx = Arc::clone(&self.tx);
        let generation = Arc::clone(&self.generation);
        let id = self.id;

        Arc::new(move |percent| {
            let percent = percent.min(100);
            if generation.load(Ordering::SeqCst) == id {
                tx.send_if_modified(|session| {
                    if session.is_uploading && percent > session.progress_percent {
                        session.progress_percent = percent;
                        true
                    } else {
                        false
                    }
                });
            }
            user(percent);
        })
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.tx.send_modify(|session| *session = UploadSession::default());
    }
}
