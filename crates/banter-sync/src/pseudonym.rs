use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures_util::future::join_all;
use tokio::sync::OnceCell;
use tracing::debug;
use uuid::Uuid;

use crate::ports::ChatStore;

/// Fallback shown when a pseudonym lookup fails. Failed lookups are not
/// cached; the next resolve retries the store.
pub const UNKNOWN_PSEUDONYM: &str = "unknown";

/// Session-scoped author id → pseudonym cache, shared across rooms.
///
/// Pseudonyms are stable for the life of a session, so entries are never
/// evicted. Concurrent resolutions of the same unresolved id coalesce into
/// one store call via a per-id [`OnceCell`].
#[derive(Clone)]
pub struct PseudonymCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    store: Arc<dyn ChatStore>,
    cells: Mutex<HashMap<Uuid, Arc<OnceCell<String>>>>,
}

impl PseudonymCache {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self {
            inner: Arc::new(CacheInner { store, cells: Mutex::new(HashMap::new()) }),
        }
    }

    /// Resolve one author id, hitting the store at most once per session
    /// for ids that resolve successfully.
    pub async fn resolve(&self, author_id: Uuid) -> String {
        let cell = {
            let mut cells = self.inner.cells.lock().expect("pseudonym cache poisoned");
            cells.entry(author_id).or_insert_with(|| Arc::new(OnceCell::new())).clone()
        };

        let result = cell
            .get_or_try_init(|| async { self.inner.store.pseudonym_for(author_id).await })
            .await;

        match result {
            Ok(name) => name.clone(),
            Err(err) => {
                // Cell stays empty, so the next resolve retries.
                debug!("pseudonym lookup failed for {author_id}: {err}");
                UNKNOWN_PSEUDONYM.to_string()
            }
        }
    }

    /// Resolve a batch, deduplicating ids first so each distinct author
    /// costs at most one store call.
    pub async fn resolve_many(
        &self,
        author_ids: impl IntoIterator<Item = Uuid>,
    ) -> HashMap<Uuid, String> {
        let mut distinct: Vec<Uuid> = author_ids.into_iter().collect();
        distinct.sort_unstable();
        distinct.dedup();

        let resolved = join_all(distinct.iter().map(|id| self.resolve(*id))).await;
        distinct.into_iter().zip(resolved).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use banter_types::{MessageRow, NewMessage, Reaction, Room};
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store stub: only pseudonym lookups are expected.
    struct PseudonymStore {
        calls: AtomicUsize,
        fail: std::sync::atomic::AtomicBool,
    }

    impl PseudonymStore {
        fn new() -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), fail: Default::default() })
        }
    }

    #[async_trait]
    impl ChatStore for PseudonymStore {
        async fn pseudonym_for(&self, author_id: Uuid) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Let concurrent callers pile up on the in-flight cell.
            tokio::task::yield_now().await;
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("lookup down");
            }
            Ok(format!("quokka-{}", &author_id.to_string()[..8]))
        }

        async fn messages_since(
            &self,
            _room: Room,
            _since: DateTime<Utc>,
        ) -> anyhow::Result<Vec<MessageRow>> {
            unreachable!()
        }
        async fn reactions_for(&self, _ids: &[Uuid]) -> anyhow::Result<Vec<Reaction>> {
            unreachable!()
        }
        async fn insert_message(&self, _message: NewMessage) -> anyhow::Result<()> {
            unreachable!()
        }
        async fn delete_message(&self, _id: Uuid) -> anyhow::Result<()> {
            unreachable!()
        }
        async fn insert_reaction(
            &self,
            _message_id: Uuid,
            _author_id: Uuid,
            _emoji: &str,
        ) -> anyhow::Result<()> {
            unreachable!()
        }
        async fn delete_reaction(&self, _id: Uuid) -> anyhow::Result<()> {
            unreachable!()
        }
        async fn report_message(&self, _id: Uuid, _reason: Option<&str>) -> anyhow::Result<String> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn caches_after_first_resolve() {
        let store = PseudonymStore::new();
        let cache = PseudonymCache::new(store.clone());
        let id = Uuid::new_v4();

        let first = cache.resolve(id).await;
        let second = cache.resolve(id).await;
        assert_eq!(first, second);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_resolves_coalesce_into_one_call() {
        let store = PseudonymStore::new();
        let cache = PseudonymCache::new(store.clone());
        let id = Uuid::new_v4();

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.resolve(id).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn batch_resolves_each_distinct_id_once() {
        let store = PseudonymStore::new();
        let cache = PseudonymCache::new(store.clone());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let resolved = cache.resolve_many([a, b, a, b, a]).await;
        assert_eq!(resolved.len(), 2);
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_lookup_falls_back_and_retries_next_time() {
        let store = PseudonymStore::new();
        let cache = PseudonymCache::new(store.clone());
        let id = Uuid::new_v4();

        store.fail.store(true, Ordering::SeqCst);
        assert_eq!(cache.resolve(id).await, UNKNOWN_PSEUDONYM);

        store.fail.store(false, Ordering::SeqCst);
        let name = cache.resolve(id).await;
        assert_ne!(name, UNKNOWN_PSEUDONYM);
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }
}
