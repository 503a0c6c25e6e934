// ==============================================================================
// models.rs - Variant Annotation Data Models
// ==============================================================================
// Description: Variant records, position keys and gene annotation outcomes
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of tab-delimited columns in a variant data line
pub const VCF_COLUMN_COUNT: usize = 10;

/// One variant call as read from the input file
///
/// The first ten fields are copied verbatim from the data line. `frequency`,
/// `depth` and `gene` are derived by the pipeline and start out unset.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantRecord {
    /// Chromosome name as written in the file (e.g. "chr1", "1", "X")
    pub chromosome: String,

    /// 1-based position on the chromosome
    pub position: u64,

    /// Variant identifier (rsID or ".")
    pub id: String,

    /// Reference allele
    pub ref_allele: String,

    /// Alternate allele(s), comma-separated for multi-allelic sites
    pub alt_allele: String,

    /// QUAL column, kept as text
    pub quality: String,

    /// FILTER column
    pub filter: String,

    /// Raw INFO column (`KEY=value[,value];...`)
    pub info: String,

    /// FORMAT column
    pub format: String,

    /// Sample column
    pub sample: String,

    /// Allele frequency (max AF), derived
    pub frequency: Option<f64>,

    /// Read depth (max DP), derived
    pub depth: Option<u64>,

    /// Gene annotation, derived last
    pub gene: Option<GeneAnnotation>,
}

impl VariantRecord {
    /// Cache key for this record's coordinate
    pub fn position_key(&self) -> PositionKey {
        PositionKey::new(&self.chromosome, self.position)
    }
}

/// `chromosome:position` identifier addressing the annotation cache
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionKey(String);

impl PositionKey {
    pub fn new(chromosome: &str, position: u64) -> Self {
        Self(format!("{}:{}", chromosome, position))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a gene lookup against one source (or the whole fallback chain)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneAnnotation {
    /// Overlapping genes, in the order the source returned them
    Found(Vec<String>),
    /// Source answered, but no gene overlaps the position
    NoneFound,
    /// Source rejected the position as malformed
    NoData,
    /// Unexpected status or transport failure
    SourceError,
}

impl GeneAnnotation {
    /// Whether a source answer settles the lookup without trying the next source
    pub fn is_definitive(&self) -> bool {
        matches!(self, GeneAnnotation::Found(_) | GeneAnnotation::NoneFound)
    }

    /// Value stored once the fallback chain is exhausted
    ///
    /// A source error is never cached as such: it becomes `NoData` so the same
    /// coordinate is not retried for the rest of the run.
    pub fn into_terminal(self) -> Self {
        match self {
            GeneAnnotation::SourceError => GeneAnnotation::NoData,
            other => other,
        }
    }

    /// Rendering used in the GENE output column
    pub fn as_column(&self) -> String {
        match self {
            GeneAnnotation::Found(genes) => genes.join(","),
            GeneAnnotation::NoneFound => "None".to_string(),
            GeneAnnotation::NoData => "No Data".to_string(),
            GeneAnnotation::SourceError => "Error".to_string(),
        }
    }
}

impl fmt::Display for GeneAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_column())
    }
}

/// One row of the annotated output table
///
/// Column names are the contract with downstream readers of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedVariantRow {
    #[serde(rename = "CHROM")]
    pub chromosome: String,
    #[serde(rename = "POS")]
    pub position: u64,
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "REF")]
    pub ref_allele: String,
    #[serde(rename = "ALT")]
    pub alt_allele: String,
    #[serde(rename = "QUAL")]
    pub quality: String,
    #[serde(rename = "FILTER")]
    pub filter: String,
    #[serde(rename = "INFO")]
    pub info: String,
    #[serde(rename = "FORMAT")]
    pub format: String,
    #[serde(rename = "SAMPLE")]
    pub sample: String,
    #[serde(rename = "FREQUENCY")]
    pub frequency: f64,
    #[serde(rename = "DP")]
    pub depth: u64,
    #[serde(rename = "GENE")]
    pub gene: String,
}

impl From<&VariantRecord> for AnnotatedVariantRow {
    fn from(record: &VariantRecord) -> Self {
        Self {
            chromosome: record.chromosome.clone(),
            position: record.position,
            id: record.id.clone(),
            ref_allele: record.ref_allele.clone(),
            alt_allele: record.alt_allele.clone(),
            quality: record.quality.clone(),
            filter: record.filter.clone(),
            info: record.info.clone(),
            format: record.format.clone(),
            sample: record.sample.clone(),
            frequency: record.frequency.unwrap_or(0.0),
            depth: record.depth.unwrap_or(0),
            gene: record
                .gene
                .as_ref()
                .unwrap_or(&GeneAnnotation::NoData)
                .as_column(),
        }
    }
}
