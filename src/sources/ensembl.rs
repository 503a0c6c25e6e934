// ==============================================================================
// sources/ensembl.rs - Ensembl REST Region Overlap Client
// ==============================================================================
// Description: Primary gene source (GET /overlap/region/{species}/{region}?feature=gene)
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// References:
// - https://rest.ensembl.org/documentation/info/overlap_region
// Response: JSON array of features; genes carry `external_name`.
// Status 400 means the region itself was rejected.
// ==============================================================================

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::{annotation_from_genes, GeneSource, SourceFailure};
use crate::error_sink::ErrorSink;
use crate::models::{GeneAnnotation, PositionKey};
use crate::rate_limit::AdmissionGate;

/// Default public endpoint
pub const DEFAULT_BASE_URL: &str = "https://rest.ensembl.org";

#[derive(Debug, Deserialize)]
struct OverlapFeature {
    #[serde(default)]
    external_name: Option<String>,
}

/// Rate-limited Ensembl client
pub struct EnsemblClient {
    http: reqwest::Client,
    base_url: String,
    species: String,
    gate: AdmissionGate,
    sink: Arc<ErrorSink>,
}

impl EnsemblClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        species: impl Into<String>,
        gate: AdmissionGate,
        sink: Arc<ErrorSink>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            species: species.into(),
            gate,
            sink,
        }
    }

    /// Single-base overlap query for `chromosome:position`
    pub fn region_url(&self, chromosome: &str, position: u64) -> String {
        format!(
            "{}/overlap/region/{}/{}:{}-{}?feature=gene",
            self.base_url, self.species, chromosome, position, position
        )
    }

    async fn fetch(&self, chromosome: &str, position: u64) -> Result<GeneAnnotation, SourceFailure> {
        let response = self
            .http
            .get(self.region_url(chromosome, position))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                parse_overlap(&body)
            }
            StatusCode::BAD_REQUEST => Err(SourceFailure::InvalidRegion(StatusCode::BAD_REQUEST.as_u16())),
            status => Err(SourceFailure::UnexpectedStatus(status.as_u16())),
        }
    }
}

/// Gene names from an overlap response body, in returned order
fn parse_overlap(body: &str) -> Result<GeneAnnotation, SourceFailure> {
    let features: Vec<OverlapFeature> = serde_json::from_str(body)?;
    let genes = features
        .into_iter()
        .filter_map(|feature| feature.external_name)
        .collect();
    Ok(annotation_from_genes(genes))
}

#[async_trait]
impl GeneSource for EnsemblClient {
    fn name(&self) -> &str {
        "Ensembl"
    }

    async fn lookup(&self, chromosome: &str, position: u64) -> GeneAnnotation {
        self.gate.acquire().await;
        debug!("Ensembl lookup {}:{}", chromosome, position);

        match self.fetch(chromosome, position).await {
            Ok(annotation) => annotation,
            Err(failure) => {
                self.sink.record(format!(
                    "Ensembl lookup failed for {}: {}",
                    PositionKey::new(chromosome, position),
                    failure
                ));
                failure.annotation()
            }
        }
    }
}
