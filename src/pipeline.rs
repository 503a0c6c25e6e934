// ==============================================================================
// pipeline.rs - Variant Annotation Pipeline
// ==============================================================================
// Description: Parse variants, extract metrics, annotate genes, write the table
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::annotator::{progress_bar, Annotator};
use crate::cache::AnnotationCache;
use crate::config::AnnotatorConfig;
use crate::error_sink::ErrorSink;
use crate::metrics::apply_metrics;
use crate::models::GeneAnnotation;
use crate::output::TableWriter;
use crate::parsers::VcfLineParser;
use crate::rate_limit::AdmissionGate;
use crate::resolver::FallbackResolver;
use crate::sources::{EnsemblClient, GeneSource, NcbiClient};

/// Outcome of one completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Data lines read and rows written
    pub records: usize,
    /// Records that received at least one gene
    pub annotated: usize,
    /// Distinct coordinates resolved against the sources
    pub unique_positions: usize,
    /// Error sink lines recorded during the run
    pub errors_logged: usize,
    /// Where the table was written
    pub output: PathBuf,
}

pub struct AnnotationPipeline {
    sources: Vec<Arc<dyn GeneSource>>,
    sink: Arc<ErrorSink>,
    workers: usize,
    show_progress: bool,
}

impl AnnotationPipeline {
    /// Pipeline querying Ensembl first and NCBI as fallback
    pub fn new(config: &AnnotatorConfig) -> Result<Self> {
        let sink = Arc::new(ErrorSink::to_file(&config.error_log));

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("variant-annotator/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        let primary = EnsemblClient::new(
            http.clone(),
            &config.ensembl_url,
            &config.species,
            AdmissionGate::per_second(config.ensembl_rate),
            Arc::clone(&sink),
        );
        let secondary = NcbiClient::new(
            http,
            &config.ncbi_url,
            AdmissionGate::per_second(config.ncbi_rate),
            Arc::clone(&sink),
        );

        Ok(Self::with_sources(
            vec![Arc::new(primary), Arc::new(secondary)],
            sink,
            config.workers,
        ))
    }

    /// Pipeline over an explicit source order
    pub fn with_sources(sources: Vec<Arc<dyn GeneSource>>, sink: Arc<ErrorSink>, workers: usize) -> Self {
        Self {
            sources,
            sink,
            workers,
            show_progress: false,
        }
    }

    /// Draw a terminal progress bar during annotation
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn error_sink(&self) -> &Arc<ErrorSink> {
        &self.sink
    }

    /// Annotate `input` and write the table to `output`
    ///
    /// Per-record lookup failures degrade to sentinel values. Unreadable
    /// input, a malformed data line or an unwritable output abort the run.
    pub async fn run(&self, input: &Path, output: &Path) -> Result<RunSummary> {
        let errors_before = self.sink.count();

        // 1. Parse variant lines
        info!("Reading variant file: {:?}", input);
        let mut parser = VcfLineParser::new();
        let mut records = parser
            .parse(input)
            .with_context(|| format!("Failed to parse variant file {:?}", input))?;
        info!(
            "Found {} variants ({} metadata lines skipped)",
            records.len(),
            parser.metadata_count
        );
        if records.is_empty() {
            warn!("No variants found in {:?}; writing header-only table", input);
        }

        // 2. Frequency and depth from INFO
        for record in records.iter_mut() {
            apply_metrics(record, &self.sink);
        }

        // 3. Gene annotation; cache is scoped to this run
        let cache = Arc::new(AnnotationCache::new());
        let resolver = Arc::new(FallbackResolver::with_sources(
            self.sources.clone(),
            Arc::clone(&cache),
        ));
        let mut annotator = Annotator::new(resolver, Arc::clone(&self.sink), self.workers);
        if self.show_progress {
            annotator = annotator.with_progress(progress_bar(records.len() as u64));
        }

        let positions = records
            .iter()
            .map(|record| (record.chromosome.clone(), record.position))
            .collect();
        let genes = annotator.annotate(positions).await;

        for (record, gene) in records.iter_mut().zip(genes) {
            record.gene = Some(gene);
        }
        info!(
            "Gene annotation complete: {} distinct positions, {} cache hits",
            cache.len(),
            cache.hits()
        );

        // 4. Write table
        let written = TableWriter::new(output).write(&records);
        if let Err(e) = &written {
            self.sink.record(format!("Failed to save annotated table: {}", e));
        }
        self.sink.flush().await;
        let written = written?;

        let annotated = records
            .iter()
            .filter(|r| matches!(r.gene, Some(GeneAnnotation::Found(_))))
            .count();

        Ok(RunSummary {
            records: written,
            annotated,
            unique_positions: cache.len(),
            errors_logged: self.sink.count() - errors_before,
            output: output.to_path_buf(),
        })
    }
}
