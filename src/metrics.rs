// ==============================================================================
// metrics.rs - INFO Field Metric Extraction
// ==============================================================================
// Description: Pulls numeric metrics (AF, DP) out of the semi-structured INFO column
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Format: semicolon-separated tokens, KEY=value[,value...] or bare flags
// Example:
//   AF=0.3,0.5;DP=20;DB
// Multi-allelic sites carry one value per ALT allele; the maximum is kept.
// ==============================================================================

use thiserror::Error;

use crate::error_sink::ErrorSink;
use crate::models::VariantRecord;

/// INFO key holding allele frequency
pub const FREQUENCY_KEY: &str = "AF";

/// INFO key holding read depth
pub const DEPTH_KEY: &str = "DP";

/// Metric parsing errors (never fatal; defaults are applied)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricParseError {
    #[error("Invalid value '{value}' for INFO key {key}")]
    InvalidValue { key: String, value: String },

    #[error("INFO key {0} has no values")]
    Empty(String),
}

/// Maximum numeric value of the first `key=` token in `info`
///
/// Returns `Ok(None)` when the key is absent.
pub fn parse_info_max(info: &str, key: &str) -> Result<Option<f64>, MetricParseError> {
    let Some(raw) = info
        .split(';')
        .filter_map(|token| token.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
    else {
        return Ok(None);
    };

    let mut max: Option<f64> = None;
    for value in raw.split(',') {
        let parsed = value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| MetricParseError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            })?;
        max = Some(max.map_or(parsed, |m| m.max(parsed)));
    }

    max.map(Some).ok_or_else(|| MetricParseError::Empty(key.to_string()))
}

/// Like [`parse_info_max`], logging a parse failure and treating it as absent
pub fn extract_metric(info: &str, key: &str, context: &str, sink: &ErrorSink) -> Option<f64> {
    match parse_info_max(info, key) {
        Ok(value) => value,
        Err(e) => {
            sink.record(format!("Failed to extract {} for {}: {}", key, context, e));
            None
        }
    }
}

/// Fill `frequency` (max AF, default 0.0) and `depth` (max DP, default 0)
pub fn apply_metrics(record: &mut VariantRecord, sink: &ErrorSink) {
    let context = record.position_key().to_string();

    let frequency = extract_metric(&record.info, FREQUENCY_KEY, &context, sink).unwrap_or(0.0);
    let depth = extract_metric(&record.info, DEPTH_KEY, &context, sink)
        .map(|dp| dp.max(0.0) as u64)
        .unwrap_or(0);

    record.frequency = Some(frequency);
    record.depth = Some(depth);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_allelic_takes_maximum() {
        assert_eq!(parse_info_max("AF=0.3,0.5;DP=20", "AF").unwrap(), Some(0.5));
        assert_eq!(parse_info_max("AF=0.9,0.1,0.4", "AF").unwrap(), Some(0.9));
        assert_eq!(parse_info_max("DP=7,31,12;AF=0.1", "DP").unwrap(), Some(31.0));
    }

    #[test]
    fn test_absent_key() {
        assert_eq!(parse_info_max("DP=20", "AF").unwrap(), None);
        assert_eq!(parse_info_max("", "AF").unwrap(), None);
        assert_eq!(parse_info_max(".", "DP").unwrap(), None);
    }

    #[test]
    fn test_key_must_match_exactly() {
        // AF must not match the AF_popmax or MAF tokens
        assert_eq!(parse_info_max("MAF=0.2;AF_popmax=0.7;AF=0.4", "AF").unwrap(), Some(0.4));
        // Bare flags are skipped
        assert_eq!(parse_info_max("DB;H2;DP=14", "DP").unwrap(), Some(14.0));
    }

    #[test]
    fn test_first_occurrence_wins() {
        assert_eq!(parse_info_max("DP=10;DP=99", "DP").unwrap(), Some(10.0));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            parse_info_max("AF=0.2,abc", "AF"),
            Err(MetricParseError::InvalidValue { .. })
        ));
        assert!(parse_info_max("AF=", "AF").is_err());
        assert!(parse_info_max("AF=.", "AF").is_err());
    }

    fn record_with_info(info: &str) -> VariantRecord {
        VariantRecord {
            chromosome: "chr1".to_string(),
            position: 100,
            id: "rs1".to_string(),
            ref_allele: "A".to_string(),
            alt_allele: "G".to_string(),
            quality: "50".to_string(),
            filter: "PASS".to_string(),
            info: info.to_string(),
            format: "GT".to_string(),
            sample: "0/1".to_string(),
            frequency: None,
            depth: None,
            gene: None,
        }
    }

    #[test]
    fn test_apply_metrics() {
        let sink = ErrorSink::in_memory();
        let mut record = record_with_info("AF=0.3,0.5;DP=20");

        apply_metrics(&mut record, &sink);

        assert_eq!(record.frequency, Some(0.5));
        assert_eq!(record.depth, Some(20));
        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn test_apply_metrics_defaults() {
        let sink = ErrorSink::in_memory();
        let mut record = record_with_info("DP=12");

        apply_metrics(&mut record, &sink);

        assert_eq!(record.frequency, Some(0.0));
        assert_eq!(record.depth, Some(12));
        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn test_parse_failure_is_logged_and_defaulted() {
        let sink = ErrorSink::in_memory();
        let mut record = record_with_info("AF=oops;DP=8");

        apply_metrics(&mut record, &sink);

        assert_eq!(record.frequency, Some(0.0));
        assert_eq!(record.depth, Some(8));
        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].contains("AF"));
        assert!(entries[0].contains("chr1:100"));
    }
}
