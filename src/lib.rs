// ==============================================================================
// lib.rs - Variant Annotator Library
// ==============================================================================
// Description: Library interface for variant parsing and gene annotation modules
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

pub mod models;
pub mod parsers;
pub mod metrics;
pub mod error_sink;
pub mod rate_limit;
pub mod sources;
pub mod cache;
pub mod resolver;
pub mod annotator;
pub mod output;
pub mod query;
pub mod config;
pub mod pipeline;

pub use pipeline::{AnnotationPipeline, RunSummary};
