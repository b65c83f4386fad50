//! Process-wide single-slot cache for the generated feed document.
//!
//! One slot, whole-document granularity: a fresh entry is served as-is, an
//! expired one is replaced unconditionally by the next successful
//! generation (last writer wins). The slot is lost on restart and rebuilt
//! on the next request.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct FeedCache {
    ttl: Duration,
    slot: Arc<Mutex<Option<CacheEntry>>>,
}

#[derive(Debug)]
struct CacheEntry {
    body: String,
    generated_at: Instant,
}

impl FeedCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the cached document if it is younger than the TTL.
    pub async fn get_fresh(&self) -> Option<String> {
        let slot = self.slot.lock().await;
        slot.as_ref()
            .filter(|entry| entry.generated_at.elapsed() < self.ttl)
            .map(|entry| entry.body.clone())
    }

    /// Replaces the slot unconditionally with a freshly generated document.
    pub async fn store(&self, body: String) {
        let mut slot = self.slot.lock().await;
        *slot = Some(CacheEntry {
            body,
            generated_at: Instant::now(),
        });
    }
}
