// ==============================================================================
// sources/mod.rs - Upstream Gene Sources
// ==============================================================================
// Description: Rate-limited gene lookup clients and their shared interface
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

pub mod ensembl;
pub mod ncbi;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::GeneAnnotation;

pub use ensembl::EnsemblClient;
pub use ncbi::NcbiClient;

/// One external source of gene annotations
///
/// Implementations never retry; they map every outcome into the shared
/// [`GeneAnnotation`] vocabulary.
#[async_trait]
pub trait GeneSource: Send + Sync {
    /// Short name used in logs and error lines
    fn name(&self) -> &str;

    /// Genes overlapping `chromosome:position`
    async fn lookup(&self, chromosome: &str, position: u64) -> GeneAnnotation;
}

/// Why a lookup did not produce a gene list
#[derive(Error, Debug)]
pub enum SourceFailure {
    #[error("invalid position (status {0})")]
    InvalidRegion(u16),

    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("undecodable response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl SourceFailure {
    /// Annotation reported for this failure
    pub fn annotation(&self) -> GeneAnnotation {
        match self {
            SourceFailure::InvalidRegion(_) => GeneAnnotation::NoData,
            _ => GeneAnnotation::SourceError,
        }
    }
}

impl From<reqwest::Error> for SourceFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SourceFailure::Timeout
        } else {
            SourceFailure::Transport(e)
        }
    }
}

/// Build the annotation for a list of gene names
pub(crate) fn annotation_from_genes(genes: Vec<String>) -> GeneAnnotation {
    if genes.is_empty() {
        GeneAnnotation::NoneFound
    } else {
        GeneAnnotation::Found(genes)
    }
}
