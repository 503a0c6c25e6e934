// ==============================================================================
// parsers/vcf.rs - Variant Call Line Parser
// ==============================================================================
// Description: Splits VCF-style data lines into ten named columns
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Format: Tab-delimited text with '#' metadata/header lines
// Example:
//   ##fileformat=VCFv4.2
//   #CHROM  POS  ID  REF  ALT  QUAL  FILTER  INFO  FORMAT  SAMPLE
//   chr1    100  rs1 A    G    50    PASS    AF=0.3,0.5;DP=20  GT  0/1
// Files ending in .gz are decompressed on the fly (plain gzip or BGZF).
// ==============================================================================

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::models::{VariantRecord, VCF_COLUMN_COUNT};

/// Errors that can occur while reading variant lines
#[derive(Error, Debug)]
pub enum VcfParseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed record at line {line}: {details}")]
    MalformedRecord { line: usize, details: String },

    #[error("Invalid position value at line {line}: {value}")]
    InvalidPosition { line: usize, value: String },
}

/// Line-oriented variant parser
///
/// Metadata lines are skipped. A data line that does not split into exactly
/// ten columns is an error for the whole file.
#[derive(Debug, Clone)]
pub struct VcfLineParser {
    /// Prefix marking metadata and header lines
    pub comment_marker: char,

    /// Count of metadata lines skipped in the last parse (for reporting)
    pub metadata_count: usize,
}

impl Default for VcfLineParser {
    fn default() -> Self {
        Self {
            comment_marker: '#',
            metadata_count: 0,
        }
    }
}

impl VcfLineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a variant file from disk
    ///
    /// # Arguments
    /// * `path` - Path to a .vcf (or .vcf.gz) file
    ///
    /// # Returns
    /// * `Ok(Vec<VariantRecord>)` - Records in file order, derived fields unset
    /// * `Err(VcfParseError)` - First malformed line or read failure
    pub fn parse(&mut self, path: impl AsRef<Path>) -> Result<Vec<VariantRecord>, VcfParseError> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
            debug!("Reading {:?} through gzip decoder", path);
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };

        self.parse_reader(BufReader::new(reader))
    }

    /// Parse variant lines from any buffered reader
    pub fn parse_reader<R: BufRead>(&mut self, reader: R) -> Result<Vec<VariantRecord>, VcfParseError> {
        let mut records = Vec::new();
        self.metadata_count = 0;

        for (idx, line_result) in reader.lines().enumerate() {
            let line_number = idx + 1;
            let line = line_result?;
            let line = line.trim_end_matches('\r');

            if line.starts_with(self.comment_marker) {
                self.metadata_count += 1;
                continue;
            }
            if line.is_empty() {
                continue;
            }

            records.push(self.parse_line(line, line_number)?);
        }

        debug!(
            "Parsed {} data lines ({} metadata lines skipped)",
            records.len(),
            self.metadata_count
        );

        Ok(records)
    }

    /// Parse a single data line
    fn parse_line(&self, line: &str, line_number: usize) -> Result<VariantRecord, VcfParseError> {
        let fields: Vec<&str> = line.split('\t').collect();

        if fields.len() != VCF_COLUMN_COUNT {
            return Err(VcfParseError::MalformedRecord {
                line: line_number,
                details: format!(
                    "Expected {} tab-delimited fields, found {}",
                    VCF_COLUMN_COUNT,
                    fields.len()
                ),
            });
        }

        let position_str = fields[1].trim();
        let position = position_str
            .parse::<u64>()
            .ok()
            .filter(|&p| p > 0)
            .ok_or_else(|| VcfParseError::InvalidPosition {
                line: line_number,
                value: position_str.to_string(),
            })?;

        Ok(VariantRecord {
            chromosome: fields[0].trim().to_string(),
            position,
            id: fields[2].to_string(),
            ref_allele: fields[3].to_string(),
            alt_allele: fields[4].to_string(),
            quality: fields[5].to_string(),
            filter: fields[6].to_string(),
            info: fields[7].to_string(),
            format: fields[8].to_string(),
            sample: fields[9].to_string(),
            frequency: None,
            depth: None,
            gene: None,
        })
    }
}
