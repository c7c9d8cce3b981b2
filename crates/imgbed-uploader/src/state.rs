//! Client-side result list and server statistics.
//!
//! `images` is most-recent-first and never holds two records with the same
//! uuid. `stats` is only ever replaced wholesale by a remote fetch, so it can
//! legitimately differ from the local list.

use imgbed_core::{ImageRecord, StatsSummary, Transport, TransportError};
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientState {
    images: Vec<ImageRecord>,
    stats: StatsSummary,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn stats(&self) -> StatsSummary {
        self.stats
    }

    pub fn find(&self, uuid: &str) -> Option<&ImageRecord> {
        self.images.iter().find(|r| r.uuid == uuid)
    }

    /// Prepend one record. An existing entry with the same uuid is replaced.
    pub fn record_single_success(&mut self, record: ImageRecord) {
        self.images.retain(|r| r.uuid != record.uuid);
        self.images.insert(0, record);
    }

    /// Prepend the successful records of one batch, keeping the batch order.
    pub fn record_batch_successes(&mut self, records: Vec<ImageRecord>) {
        let mut seen = HashSet::new();
        let mut merged: Vec<ImageRecord> = records
            .into_iter()
            .filter(|r| seen.insert(r.uuid.clone()))
            .collect();

        self.images.retain(|r| !seen.contains(&r.uuid));
        merged.append(&mut self.images);
        self.images = merged;
    }

    pub fn replace_stats(&mut self, stats: StatsSummary) {
        self.stats = stats;
    }

    /// Drop the entry with `uuid`. Returns whether anything was removed.
    pub fn remove(&mut self, uuid: &str) -> bool {
        match self.images.iter().position(|r| r.uuid == uuid) {
            Some(index) => {
                self.images.remove(index);
                true
            }
            None => false,
        }
    }

    /// Empty the list; `stats` is left as is.
    pub fn clear(&mut self) {
        self.images.clear();
    }

    pub fn local_count(&self) -> usize {
        self.images.len()
    }

    pub fn local_total_size(&self) -> u64 {
        self.images.iter().map(|r| r.byte_size).sum()
    }
}

/// Shared handle to a [`ClientState`], cloned explicitly by whoever needs it.
#[derive(Debug, Clone, Default)]
pub struct StateHandle {
    inner: Arc<RwLock<ClientState>>,
}

impl StateHandle {
    pub fn new(state: ClientState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    // Every mutation is a single Vec operation, so a poisoned lock still
    // guards a consistent state.
    fn read(&self) -> RwLockReadGuard<'_, ClientState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ClientState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> ClientState {
        self.read().clone()
    }

    pub fn images(&self) -> Vec<ImageRecord> {
        self.read().images().to_vec()
    }

    pub fn stats(&self) -> StatsSummary {
        self.read().stats()
    }

    pub fn find(&self, uuid: &str) -> Option<ImageRecord> {
        self.read().find(uuid).cloned()
    }

    pub fn record_single_success(&self, record: ImageRecord) {
        self.write().record_single_success(record);
    }

    pub fn record_batch_successes(&self, records: Vec<ImageRecord>) {
        self.write().record_batch_successes(records);
    }

    pub fn remove(&self, uuid: &str) -> bool {
        self.write().remove(uuid)
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn local_count(&self) -> usize {
        self.read().local_count()
    }

    pub fn local_total_size(&self) -> u64 {
        self.read().local_total_size()
    }

    /// Fetch the server summary and replace `stats` with it.
    ///
    /// On failure `stats` keeps its previous value.
    pub async fn refresh_stats(
        &self,
        transport: &dyn Transport,
    ) -> Result<StatsSummary, TransportError> {
        match transport.fetch_summary().await {
            Ok(stats) => {
                self.write().replace_stats(stats);
                tracing::debug!(
                    total_images = stats.total_images,
                    total_size = stats.total_size,
                    today_images = stats.today_images,
                    "Stats refreshed"
                );
                Ok(stats)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh stats, keeping previous values");
                Err(e)
            }
        }
    }
}
