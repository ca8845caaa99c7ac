use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::warn;

use banter_types::CustomEmote;

/// Default freshness window for the remote emote set.
pub const DEFAULT_EMOTE_TTL: Duration = Duration::from_secs(5 * 60);

/// Source of the currently enabled custom emote set.
#[async_trait]
pub trait EmoteSource: Send + Sync {
    async fn fetch_emotes(&self) -> anyhow::Result<Vec<CustomEmote>>;
}

/// Process-wide, time-bounded cache over an [`EmoteSource`].
///
/// Reads are lock-light and may be stale; `get` refreshes when the snapshot
/// is older than the TTL. Concurrent refreshes coalesce into a single
/// upstream fetch, and a failed fetch keeps serving the previous snapshot
/// rather than wiping it.
#[derive(Clone)]
pub struct EmoteCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    source: Arc<dyn EmoteSource>,
    ttl: Duration,
    snapshot: RwLock<Snapshot>,
    // Serializes refreshes so waiters piggyback on the in-flight fetch.
    refresh: tokio::sync::Mutex<()>,
}

#[derive(Clone)]
struct Snapshot {
    emotes: Arc<Vec<CustomEmote>>,
    fetched_at: Option<Instant>,
}

impl EmoteCache {
    pub fn new(source: Arc<dyn EmoteSource>) -> Self {
        Self::with_ttl(source, DEFAULT_EMOTE_TTL)
    }

    pub fn with_ttl(source: Arc<dyn EmoteSource>, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                source,
                ttl,
                snapshot: RwLock::new(Snapshot { emotes: Arc::new(Vec::new()), fetched_at: None }),
                refresh: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Last known emote set without touching the network. Empty until the
    /// first successful `get`.
    pub fn cached(&self) -> Arc<Vec<CustomEmote>> {
        self.inner.snapshot.read().expect("emote cache poisoned").emotes.clone()
    }

    /// Emote set, refreshed from the source if the snapshot is stale.
    pub async fn get(&self) -> Arc<Vec<CustomEmote>> {
        if let Some(fresh) = self.fresh_snapshot() {
            return fresh;
        }

        let _guard = self.inner.refresh.lock().await;

        // Another caller may have refreshed while we waited on the lock.
        if let Some(fresh) = self.fresh_snapshot() {
            return fresh;
        }

        match self.inner.source.fetch_emotes().await {
            Ok(emotes) => {
                let emotes = Arc::new(emotes);
                let mut snap = self.inner.snapshot.write().expect("emote cache poisoned");
                snap.emotes = emotes.clone();
                snap.fetched_at = Some(Instant::now());
                emotes
            }
            Err(err) => {
                warn!("custom emote fetch failed, serving stale set: {err}");
                self.cached()
            }
        }
    }

    /// Drop freshness so the next `get` hits the source again.
    pub fn invalidate(&self) {
        self.inner.snapshot.write().expect("emote cache poisoned").fetched_at = None;
    }

    fn fresh_snapshot(&self) -> Option<Arc<Vec<CustomEmote>>> {
        let snap = self.inner.snapshot.read().expect("emote cache poisoned");
        match snap.fetched_at {
            Some(at) if at.elapsed() < self.inner.ttl => Some(snap.emotes.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: std::sync::atomic::AtomicBool,
    }

    impl CountingSource {
        fn new() -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), fail: Default::default() })
        }
    }

    #[async_trait]
    impl EmoteSource for CountingSource {
        async fn fetch_emotes(&self) -> anyhow::Result<Vec<CustomEmote>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("emote source down");
            }
            Ok(vec![CustomEmote {
                code: "drop-bear".into(),
                url: "https://example.invalid/drop-bear.gif".into(),
                alt: "drop bear".into(),
                category: Some("animals".into()),
            }])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn serves_cached_within_ttl_and_refetches_after() {
        let source = CountingSource::new();
        let cache = EmoteCache::new(source.clone());

        assert_eq!(cache.get().await.len(), 1);
        assert_eq!(cache.get().await.len(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(DEFAULT_EMOTE_TTL + Duration::from_secs(1)).await;
        cache.get().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_forces_refetch() {
        let source = CountingSource::new();
        let cache = EmoteCache::new(source.clone());

        cache.get().await;
        cache.invalidate();
        cache.get().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_keeps_stale_snapshot() {
        let source = CountingSource::new();
        let cache = EmoteCache::new(source.clone());

        assert_eq!(cache.get().await.len(), 1);

        source.fail.store(true, Ordering::SeqCst);
        cache.invalidate();
        let stale = cache.get().await;
        assert_eq!(stale.len(), 1, "stale snapshot survives a failed fetch");
    }

    #[tokio::test(start_paused = true)]
    async fn cached_is_empty_before_first_fetch() {
        let cache = EmoteCache::new(CountingSource::new());
        assert!(cache.cached().is_empty());
    }
}
