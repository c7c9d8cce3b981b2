//! Request-level upload progress.
//!
//! File bytes are fed to the multipart body in fixed-size chunks; each chunk
//! pulled by the HTTP client advances the counter. The percentage is over the
//! summed file bytes of the request, not over individual files. Multipart
//! boundaries and part headers are not counted, so `100` means every file
//! byte has been handed to the HTTP client.

use bytes::Bytes;
use futures::stream::{self, Stream};
use imgbed_core::ProgressCallback;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

pub const CHUNK_SIZE: usize = 64 * 1024;

/// `round(sent * 100 / total)`, capped at 100.
pub fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (sent as f64 * 100.0 / total as f64).round();
    pct.min(100.0) as u8
}

pub struct UploadProgress {
    total: u64,
    sent: AtomicU64,
    last: AtomicU8,
    callback: ProgressCallback,
}

impl UploadProgress {
    pub fn new(total: u64, callback: ProgressCallback) -> Arc<Self> {
        Arc::new(Self {
            total,
            sent: AtomicU64::new(0),
            last: AtomicU8::new(0),
            callback,
        })
    }

    /// Record `n` more bytes sent. The callback only fires when the
    /// percentage increases, so reported values never go down.
    pub fn advance(&self, n: usize) {
        let sent = self.sent.fetch_add(n as u64, Ordering::SeqCst) + n as u64;
        let pct = percent(sent, self.total);
        let previous = self.last.fetch_max(pct, Ordering::SeqCst);
        if pct > previous {
            (self.callback)(pct);
        }
    }

    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Stream `data` in [`CHUNK_SIZE`] slices, advancing `progress` as each is pulled.
pub fn tracked_stream(
    data: Bytes,
    progress: Arc<UploadProgress>,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    let len = data.len();
    let chunks: Vec<Bytes> = (0..len)
        .step_by(CHUNK_SIZE)
        .map(|start| data.slice(start..(start + CHUNK_SIZE).min(len)))
        .collect();

    stream::iter(chunks.into_iter().map(move |chunk| {
        progress.advance(chunk.len());
        Ok(chunk)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::Mutex;

    fn recorder() -> (ProgressCallback, Arc<Mutex<Vec<u8>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Arc::new(move |p| sink.lock().unwrap().push(p));
        (callback, seen)
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 200), 0);
        assert_eq!(percent(1, 200), 1);
        assert_eq!(percent(100, 200), 50);
        assert_eq!(percent(200, 200), 100);
        assert_eq!(percent(300, 200), 100);
        assert_eq!(percent(5, 0), 0);
    }

    #[test]
    fn test_advance_is_monotonic_and_deduplicated() {
        let (callback, seen) = recorder();
        let progress = UploadProgress::new(1000, callback);
        progress.advance(1);
        progress.advance(1);
        progress.advance(498);
        progress.advance(500);
        assert_eq!(*seen.lock().unwrap(), vec![50, 100]);
        assert_eq!(progress.sent(), 1000);
    }

    #[tokio::test]
    async fn test_tracked_stream_reports_every_chunk() {
        let (callback, seen) = recorder();
        let data = Bytes::from(vec![7u8; CHUNK_SIZE * 3 + 10]);
        let progress = UploadProgress::new(data.len() as u64, callback);

        let chunks: Vec<Bytes> = tracked_stream(data.clone(), Arc::clone(&progress))
            .map(|c| c.unwrap())
            .collect()
            .await;

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks.iter().map(|c| c.len()).sum::<usize>(), data.len());
        let seen = seen.lock().unwrap();
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last(), Some(&100));
    }

    #[tokio::test]
    async fn test_shared_progress_spans_all_files() {
        let (callback, seen) = recorder();
        let first = Bytes::from(vec![1u8; 300]);
        let second = Bytes::from(vec![2u8; 100]);
        let progress = UploadProgress::new((first.len() + second.len()) as u64, callback);

        let _: Vec<_> = tracked_stream(first, Arc::clone(&progress)).collect().await;
        assert_eq!(*seen.lock().unwrap(), vec![75]);

        let _: Vec<_> = tracked_stream(second, Arc::clone(&progress)).collect().await;
        assert_eq!(*seen.lock().unwrap(), vec![75, 100]);
        assert_eq!(progress.sent(), progress.total());
    }

    #[tokio::test]
    async fn test_tracked_stream_empty_data() {
        let (callback, seen) = recorder();
        let progress = UploadProgress::new(0, callback);
        let chunks: Vec<_> = tracked_stream(Bytes::new(), progress).collect().await;
        assert!(chunks.is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }
}
