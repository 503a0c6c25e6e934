// ==============================================================================
// query.rs - Annotated Table Reader
// ==============================================================================
// Description: Loads an annotated table and serves paged / threshold queries
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use csv::ReaderBuilder;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::models::AnnotatedVariantRow;
use crate::output::TABLE_DELIMITER;

/// Query errors
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Failed to load annotated table: {0}")]
    Load(#[from] csv::Error),

    #[error("Frequency and depth thresholds must be non-negative (got frequency {frequency}, depth {depth})")]
    NegativeThreshold { frequency: f64, depth: i64 },

    #[error("Invalid page request: page {page}, limit {limit} (both must be >= 1)")]
    InvalidPage { page: usize, limit: usize },
}

/// Whole annotated table held in memory
#[derive(Debug, Clone, Default)]
pub struct VariantTable {
    rows: Vec<AnnotatedVariantRow>,
}

impl VariantTable {
    /// Read a table written by [`crate::output::TableWriter`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, QueryError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(TABLE_DELIMITER)
            .has_headers(true)
            .from_path(path.as_ref())?;

        let rows = reader
            .deserialize()
            .collect::<Result<Vec<AnnotatedVariantRow>, _>>()?;

        info!("Loaded {} variants from {:?}", rows.len(), path.as_ref());
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[AnnotatedVariantRow] {
        &self.rows
    }

    /// Rows of 1-based page `page` with `limit` rows per page, in table order
    ///
    /// Pages past the end are empty.
    pub fn page(&self, page: usize, limit: usize) -> Result<&[AnnotatedVariantRow], QueryError> {
        if page == 0 || limit == 0 {
            return Err(QueryError::InvalidPage { page, limit });
        }

        let start = (page - 1).saturating_mul(limit).min(self.rows.len());
        let end = start.saturating_add(limit).min(self.rows.len());
        Ok(&self.rows[start..end])
    }

    /// Rows with `FREQUENCY >= min_frequency` and `DP >= min_depth`
    pub fn filter(
        &self,
        min_frequency: f64,
        min_depth: i64,
    ) -> Result<Vec<&AnnotatedVariantRow>, QueryError> {
        if min_frequency < 0.0 || min_depth < 0 || min_frequency.is_nan() {
            return Err(QueryError::NegativeThreshold {
                frequency: min_frequency,
                depth: min_depth,
            });
        }

        let min_depth = min_depth as u64;
        Ok(self
            .rows
            .iter()
            .filter(|row| row.frequency >= min_frequency && row.depth >= min_depth)
            .collect())
    }
}
