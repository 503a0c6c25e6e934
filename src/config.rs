// ==============================================================================
// config.rs - Annotator Runtime Configuration
// ==============================================================================
// Description: Source endpoints, rate ceilings and pool size, overridable from env
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Environment variables (all optional):
//   ANNOTATOR_ENSEMBL_URL    primary base URL          (https://rest.ensembl.org)
//   ANNOTATOR_SPECIES        Ensembl species           (human)
//   ANNOTATOR_ENSEMBL_RATE   primary requests/second   (15)
//   ANNOTATOR_NCBI_URL       secondary base URL        (https://eutils.ncbi.nlm.nih.gov/entrez/eutils)
//   ANNOTATOR_NCBI_RATE      secondary requests/second (10)
//   ANNOTATOR_WORKERS        concurrent resolutions    (10)
//   ANNOTATOR_TIMEOUT_SECS   per-request timeout       (30)
//   ANNOTATOR_ERROR_LOG      error sink file           (error_log.txt)
// ==============================================================================

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::annotator::DEFAULT_WORKERS;
use crate::sources::{ensembl, ncbi};

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatorConfig {
    pub ensembl_url: String,
    pub species: String,
    pub ensembl_rate: NonZeroU32,
    pub ncbi_url: String,
    pub ncbi_rate: NonZeroU32,
    pub workers: usize,
    pub request_timeout: Duration,
    pub error_log: PathBuf,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            ensembl_url: ensembl::DEFAULT_BASE_URL.to_string(),
            species: "human".to_string(),
            ensembl_rate: NonZeroU32::new(15).unwrap_or(NonZeroU32::MIN),
            ncbi_url: ncbi::DEFAULT_BASE_URL.to_string(),
            ncbi_rate: NonZeroU32::new(10).unwrap_or(NonZeroU32::MIN),
            workers: DEFAULT_WORKERS,
            request_timeout: Duration::from_secs(30),
            error_log: PathBuf::from("error_log.txt"),
        }
    }
}

impl AnnotatorConfig {
    /// Defaults overridden by process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("ANNOTATOR_ENSEMBL_URL") {
            config.ensembl_url = url;
        }
        if let Some(species) = lookup("ANNOTATOR_SPECIES") {
            config.species = species;
        }
        if let Some(url) = lookup("ANNOTATOR_NCBI_URL") {
            config.ncbi_url = url;
        }
        if let Some(path) = lookup("ANNOTATOR_ERROR_LOG") {
            config.error_log = PathBuf::from(path);
        }

        if let Some(rate) = parse_var(&lookup, "ANNOTATOR_ENSEMBL_RATE")? {
            config.ensembl_rate = rate;
        }
        if let Some(rate) = parse_var(&lookup, "ANNOTATOR_NCBI_RATE")? {
            config.ncbi_rate = rate;
        }
        if let Some(workers) = parse_var::<usize, _>(&lookup, "ANNOTATOR_WORKERS")? {
            if workers == 0 {
                return Err(ConfigError::InvalidValue {
                    var: "ANNOTATOR_WORKERS",
                    value: workers.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            config.workers = workers;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "ANNOTATOR_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                var,
                reason: e.to_string(),
                value,
            }),
    }
}
