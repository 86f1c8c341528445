//! # Variant Annotator
//!
//! Annotates the variants of a VCF file against public annotation services
//! and renders the results as tables, exports and plots.
//!
//! ## Features
//!
//! - VCF record extraction, one record per alternate allele
//! - Ordered lookup against MyVariant.info, then Ensembl VEP
//! - Deterministic genome-browser placeholder when every source fails
//! - Clinical trial search for annotated conditions
//! - Multiple output formats (table, CSV, TSV, JSON, HTML, SVG, link list)

pub mod annotation;
pub mod config;
pub mod error;
pub mod output;
pub mod parsers;
pub mod pipeline;
pub mod plot;
pub mod trials;
pub mod types;

// Re-export key types
pub use annotation::{FallbackBuilder, LookupSource, Resolver};
pub use config::{AnnotatorConfig, ExhaustedPolicy, SourceKind};
pub use error::{ConfigError, ExtractError, LookupError};
pub use output::{AnnotationReport, ReportFormat, ReportGenerator};
pub use parsers::VcfExtractor;
pub use pipeline::{annotate_records, annotate_text, RunSummary};
pub use types::*;
