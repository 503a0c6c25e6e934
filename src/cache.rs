// ==============================================================================
// cache.rs - Per-Run Annotation Cache
// ==============================================================================
// Description: Position-keyed gene annotation cache shared by all workers
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Each key owns a once-cell: the first worker to reach an unresolved key runs
// the lookup, concurrent workers for the same key wait for that result.
// The cache lives for one pipeline run and is never persisted.
// ==============================================================================

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

use crate::models::{GeneAnnotation, PositionKey};

#[derive(Default)]
pub struct AnnotationCache {
    entries: Mutex<HashMap<PositionKey, Arc<OnceCell<GeneAnnotation>>>>,
    hits: AtomicUsize,
}

impl AnnotationCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &PositionKey) -> Arc<OnceCell<GeneAnnotation>> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(entries.entry(key.clone()).or_default())
    }

    /// Cached value for `key`, if it has been resolved
    pub fn get(&self, key: &PositionKey) -> Option<GeneAnnotation> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Return the cached value for `key`, running `resolve` at most once per key
    ///
    /// If the resolving future is dropped or panics, the slot stays empty and
    /// the next caller resolves it.
    pub async fn get_or_resolve<F, Fut>(&self, key: &PositionKey, resolve: F) -> GeneAnnotation
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = GeneAnnotation>,
    {
        let cell = self.slot(key);
        if let Some(value) = cell.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return value.clone();
        }
        cell.get_or_init(resolve).await.clone()
    }

    /// Number of resolved keys
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lookups answered from an already-resolved entry
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn test_second_lookup_is_a_hit() {
        let cache = AnnotationCache::new();
        let key = PositionKey::new("chr1", 100);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_resolve(&key, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    GeneAnnotation::Found(vec!["BRCA1".to_string()])
                })
                .await;
            assert_eq!(value, GeneAnnotation::Found(vec!["BRCA1".to_string()]));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get(&key),
            Some(GeneAnnotation::Found(vec!["BRCA1".to_string()]))
        );
        assert_eq!(cache.get(&PositionKey::new("chr1", 101)), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_same_key_resolves_once() {
        let cache = Arc::new(AnnotationCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    let key = PositionKey::new("chr2", 5000);
                    cache
                        .get_or_resolve(&key, || async {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            GeneAnnotation::NoneFound
                        })
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), GeneAnnotation::NoneFound);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_cache() {
        let cache = AnnotationCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.hits(), 0);
    }
}
