// ==============================================================================
// resolver.rs - Cached Multi-Source Gene Resolution
// ==============================================================================
// Description: Cache-first lookup walking an ordered chain of gene sources
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Resolution for one coordinate:
//   1. cached value → returned, no source called
//   2. each source in order; Found/NoneFound ends the walk
//   3. otherwise the last source's answer is kept, SourceError stored as NoData
// NoData from an earlier source is not definitive: another source may accept
// a coordinate the first one rejected.
// ==============================================================================

use std::sync::Arc;
use tracing::debug;

use crate::cache::AnnotationCache;
use crate::models::{GeneAnnotation, PositionKey};
use crate::sources::GeneSource;

/// Fallback resolver over an ordered list of sources
pub struct FallbackResolver {
    sources: Vec<Arc<dyn GeneSource>>,
    cache: Arc<AnnotationCache>,
}

impl FallbackResolver {
    /// Resolver trying `primary` first and `secondary` as fallback
    pub fn new(
        primary: Arc<dyn GeneSource>,
        secondary: Arc<dyn GeneSource>,
        cache: Arc<AnnotationCache>,
    ) -> Self {
        Self::with_sources(vec![primary, secondary], cache)
    }

    /// Resolver over an arbitrary source order
    pub fn with_sources(sources: Vec<Arc<dyn GeneSource>>, cache: Arc<AnnotationCache>) -> Self {
        Self { sources, cache }
    }

    pub fn cache(&self) -> &Arc<AnnotationCache> {
        &self.cache
    }

    /// Gene annotation for `chromosome:position`
    pub async fn resolve(&self, chromosome: &str, position: u64) -> GeneAnnotation {
        let key = PositionKey::new(chromosome, position);
        self.cache
            .get_or_resolve(&key, || self.walk(chromosome, position))
            .await
    }

    async fn walk(&self, chromosome: &str, position: u64) -> GeneAnnotation {
        let mut last = GeneAnnotation::SourceError;

        for source in &self.sources {
            let answer = source.lookup(chromosome, position).await;
            if answer.is_definitive() {
                return answer;
            }
            debug!(
                "{} gave no definitive answer for {}:{} ({}), trying next source",
                source.name(),
                chromosome,
                position,
                answer
            );
            last = answer;
        }

        last.into_terminal()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source answering from a fixed table, counting calls
    pub(crate) struct FakeSource {
        name: &'static str,
        answers: HashMap<PositionKey, GeneAnnotation>,
        default: GeneAnnotation,
        pub calls: AtomicUsize,
    }

    impl FakeSource {
        pub(crate) fn new(name: &'static str, default: GeneAnnotation) -> Self {
            Self {
                name,
                answers: HashMap::new(),
                default,
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn answer(mut self, chromosome: &str, position: u64, answer: GeneAnnotation) -> Self {
            self.answers.insert(PositionKey::new(chromosome, position), answer);
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GeneSource for FakeSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn lookup(&self, chromosome: &str, position: u64) -> GeneAnnotation {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answers
                .get(&PositionKey::new(chromosome, position))
                .cloned()
                .unwrap_or_else(|| self.default.clone())
        }
    }

    fn found(genes: &[&str]) -> GeneAnnotation {
        GeneAnnotation::Found(genes.iter().map(|g| g.to_string()).collect())
    }

    fn resolver(primary: &Arc<FakeSource>, secondary: &Arc<FakeSource>) -> FallbackResolver {
        FallbackResolver::new(
            Arc::clone(primary) as Arc<dyn GeneSource>,
            Arc::clone(secondary) as Arc<dyn GeneSource>,
            Arc::new(AnnotationCache::new()),
        )
    }

    #[tokio::test]
    async fn test_primary_found_skips_secondary() {
        let primary = Arc::new(FakeSource::new("primary", found(&["TP53"])));
        let secondary = Arc::new(FakeSource::new("secondary", found(&["7157"])));
        let resolver = resolver(&primary, &secondary);

        assert_eq!(resolver.resolve("chr17", 7675088).await, found(&["TP53"]));
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_primary_none_found_is_definitive() {
        let primary = Arc::new(FakeSource::new("primary", GeneAnnotation::NoneFound));
        let secondary = Arc::new(FakeSource::new("secondary", found(&["1"])));
        let resolver = resolver(&primary, &secondary);

        assert_eq!(resolver.resolve("chr1", 5).await, GeneAnnotation::NoneFound);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_primary_error_falls_back_once() {
        let primary = Arc::new(FakeSource::new("primary", GeneAnnotation::SourceError));
        let secondary = Arc::new(FakeSource::new("secondary", found(&["BRCA1"])));
        let resolver = resolver(&primary, &secondary);

        assert_eq!(resolver.resolve("chr1", 100).await, found(&["BRCA1"]));
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
        assert_eq!(
            resolver.cache().get(&PositionKey::new("chr1", 100)),
            Some(found(&["BRCA1"]))
        );
    }

    #[tokio::test]
    async fn test_primary_no_data_falls_back() {
        let primary = Arc::new(FakeSource::new("primary", GeneAnnotation::NoData));
        let secondary = Arc::new(FakeSource::new("secondary", GeneAnnotation::NoneFound));
        let resolver = resolver(&primary, &secondary);

        assert_eq!(resolver.resolve("chr1", 100).await, GeneAnnotation::NoneFound);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_sources_fail_caches_no_data() {
        let primary = Arc::new(FakeSource::new("primary", GeneAnnotation::SourceError));
        let secondary = Arc::new(FakeSource::new("secondary", GeneAnnotation::SourceError));
        let resolver = resolver(&primary, &secondary);

        assert_eq!(resolver.resolve("chrZ", 1).await, GeneAnnotation::NoData);
        assert_eq!(resolver.resolve("chrZ", 1).await, GeneAnnotation::NoData);

        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
        assert_eq!(resolver.cache().hits(), 1);
    }

    #[tokio::test]
    async fn test_secondary_no_data_is_kept() {
        let primary = Arc::new(FakeSource::new("primary", GeneAnnotation::NoData));
        let secondary = Arc::new(FakeSource::new("secondary", GeneAnnotation::NoData));
        let resolver = resolver(&primary, &secondary);

        assert_eq!(resolver.resolve("chr1", 1).await, GeneAnnotation::NoData);
    }

    #[tokio::test]
    async fn test_per_key_answers() {
        let primary = Arc::new(
            FakeSource::new("primary", GeneAnnotation::SourceError)
                .answer("chr1", 10, found(&["A1BG"])),
        );
        let secondary = Arc::new(FakeSource::new("secondary", GeneAnnotation::NoneFound));
        let resolver = resolver(&primary, &secondary);

        assert_eq!(resolver.resolve("chr1", 10).await, found(&["A1BG"]));
        assert_eq!(resolver.resolve("chr1", 11).await, GeneAnnotation::NoneFound);
        assert_eq!(primary.calls(), 2);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_chain() {
        let resolver = FallbackResolver::with_sources(Vec::new(), Arc::new(AnnotationCache::new()));
        assert_eq!(resolver.resolve("chr1", 1).await, GeneAnnotation::NoData);
    }
}
