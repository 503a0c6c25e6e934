// ==============================================================================
// sources/ncbi.rs - NCBI E-utilities Gene Search Client
// ==============================================================================
// Description: Secondary gene source (esearch.fcgi against the "gene" database)
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// References:
// - https://www.ncbi.nlm.nih.gov/books/NBK25499/#chapter4.ESearch
// Response: {"esearchresult": {"idlist": ["672", ...]}}
// NCBI has no dedicated bad-coordinate status; every non-200 is an error.
// ==============================================================================

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::{annotation_from_genes, GeneSource, SourceFailure};
use crate::error_sink::ErrorSink;
use crate::models::{GeneAnnotation, PositionKey};
use crate::rate_limit::AdmissionGate;

/// Default public endpoint
pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    esearchresult: Option<SearchResult>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

/// Rate-limited NCBI gene search client
pub struct NcbiClient {
    http: reqwest::Client,
    base_url: String,
    gate: AdmissionGate,
    sink: Arc<ErrorSink>,
}

impl NcbiClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        gate: AdmissionGate,
        sink: Arc<ErrorSink>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            gate,
            sink,
        }
    }

    /// Structured search term for one coordinate
    pub fn search_term(chromosome: &str, position: u64) -> String {
        format!("{}[Chromosome] AND {}[Base Position]", chromosome, position)
    }

    async fn fetch(&self, chromosome: &str, position: u64) -> Result<GeneAnnotation, SourceFailure> {
        let term = Self::search_term(chromosome, position);
        let response = self
            .http
            .get(format!("{}/esearch.fcgi", self.base_url))
            .query(&[("db", "gene"), ("term", term.as_str()), ("retmode", "json")])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                parse_search(&body)
            }
            status => Err(SourceFailure::UnexpectedStatus(status.as_u16())),
        }
    }
}

/// Gene identifiers from a search response body
fn parse_search(body: &str) -> Result<GeneAnnotation, SourceFailure> {
    let response: SearchResponse = serde_json::from_str(body)?;
    let ids = response
        .esearchresult
        .map(|result| result.idlist)
        .unwrap_or_default();
    Ok(annotation_from_genes(ids))
}

#[async_trait]
impl GeneSource for NcbiClient {
    fn name(&self) -> &str {
        "NCBI"
    }

    async fn lookup(&self, chromosome: &str, position: u64) -> GeneAnnotation {
        self.gate.acquire().await;
        debug!("NCBI lookup {}:{}", chromosome, position);

        match self.fetch(chromosome, position).await {
            Ok(annotation) => annotation,
            Err(failure) => {
                self.sink.record(format!(
                    "NCBI lookup failed for {}: {}",
                    PositionKey::new(chromosome, position),
                    failure
                ));
                failure.annotation()
            }
        }
    }
}
