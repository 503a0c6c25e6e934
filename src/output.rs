// ==============================================================================
// output.rs - Annotated Variant Table Output
// ==============================================================================
// Description: Writes enriched records as a tab-delimited table with header row
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Columns:
//   CHROM POS ID REF ALT QUAL FILTER INFO FORMAT SAMPLE FREQUENCY DP GENE
// ==============================================================================

use csv::WriterBuilder;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::models::{AnnotatedVariantRow, VariantRecord};

/// Column delimiter shared with the input format
pub const TABLE_DELIMITER: u8 = b'\t';

/// Output header, in column order
pub const TABLE_COLUMNS: [&str; 13] = [
    "CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO", "FORMAT", "SAMPLE", "FREQUENCY",
    "DP", "GENE",
];

/// Errors writing the output table; always surfaced to the caller
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Cannot create output file {path:?}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed writing output file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed flushing output file {path:?}: {source}")]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub struct TableWriter {
    path: PathBuf,
}

impl TableWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write all records in order; returns the number of rows written
    ///
    /// A header row is always written, even for an empty record set.
    pub fn write(&self, records: &[VariantRecord]) -> Result<usize, WriteError> {
        let mut writer = WriterBuilder::new()
            .delimiter(TABLE_DELIMITER)
            .has_headers(false)
            .from_path(&self.path)
            .map_err(|source| WriteError::Create {
                path: self.path.clone(),
                source,
            })?;

        let write_err = |source| WriteError::Write {
            path: self.path.clone(),
            source,
        };

        writer.write_record(TABLE_COLUMNS).map_err(write_err)?;
        for record in records {
            writer
                .serialize(AnnotatedVariantRow::from(record))
                .map_err(write_err)?;
        }

        writer.flush().map_err(|source| WriteError::Flush {
            path: self.path.clone(),
            source,
        })?;

        info!("Wrote {} annotated variants to {:?}", records.len(), self.path);
        Ok(records.len())
    }
}
