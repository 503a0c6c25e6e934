// ==============================================================================
// annotator.rs - Parallel Annotation Orchestrator
// ==============================================================================
// Description: Fans gene resolution out over a fixed-size worker pool, in input order
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::error_sink::ErrorSink;
use crate::models::{GeneAnnotation, PositionKey};
use crate::resolver::FallbackResolver;

/// Concurrent resolutions in flight
pub const DEFAULT_WORKERS: usize = 10;

/// Terminal progress bar in the style used across the toolkit
pub fn progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
    {
        bar.set_style(style.progress_chars("##-"));
    }
    bar.set_message("Annotating genes");
    bar
}

pub struct Annotator {
    resolver: Arc<FallbackResolver>,
    sink: Arc<ErrorSink>,
    workers: usize,
    progress: ProgressBar,
}

impl Annotator {
    /// Orchestrator with `workers` concurrent resolutions and a hidden progress bar
    pub fn new(resolver: Arc<FallbackResolver>, sink: Arc<ErrorSink>, workers: usize) -> Self {
        Self {
            resolver,
            sink,
            workers: workers.max(1),
            progress: ProgressBar::hidden(),
        }
    }

    /// Report progress on `progress` instead
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Completed/total counter for the current or last batch
    pub fn progress(&self) -> &ProgressBar {
        &self.progress
    }

    /// Resolve every `(chromosome, position)`; result `i` belongs to input `i`
    ///
    /// At most `workers` resolutions run at once. A free worker takes the next
    /// pending entry even while an earlier one is still in flight. A
    /// resolution that panics yields `SourceError` for that entry only.
    pub async fn annotate(&self, positions: Vec<(String, u64)>) -> Vec<GeneAnnotation> {
        let total = positions.len();
        self.progress.set_length(total as u64);
        self.progress.set_position(0);
        info!("Annotating {} variants with {} workers", total, self.workers);

        let permits = Arc::new(Semaphore::new(self.workers));
        let mut keys = Vec::with_capacity(total);
        let mut tasks = Vec::with_capacity(total);

        for (chromosome, position) in positions {
            keys.push(PositionKey::new(&chromosome, position));

            let resolver = Arc::clone(&self.resolver);
            let progress = self.progress.clone();
            let permits = Arc::clone(&permits);

            tasks.push(tokio::spawn(async move {
                // Semaphore is never closed
                let _permit = permits.acquire_owned().await.ok();
                let annotation = resolver.resolve(&chromosome, position).await;
                progress.inc(1);
                annotation
            }));
        }

        let results = join_all(tasks)
            .await
            .into_iter()
            .zip(keys)
            .map(|(joined, key)| match joined {
                Ok(annotation) => annotation,
                Err(e) => {
                    error!("Annotation task for {} failed: {}", key, e);
                    self.sink
                        .record(format!("Annotation failed for {}: {}", key, e));
                    self.progress.inc(1);
                    GeneAnnotation::SourceError
                }
            })
            .collect();

        self.progress.finish_with_message("Gene annotation complete");
        results
    }
}
