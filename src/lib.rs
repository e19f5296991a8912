//! Structural inference for paginated documents
//!
//! This crate turns positioned text spans (as extracted by an upstream
//! container parser) into a structured document model:
//! - A font-size histogram mapping size tiers to heading levels
//! - A hierarchical outline of heading candidates (H1-H4)
//! - Table grids detected from row/column alignment
//! - Summary statistics including a coarse script/language guess
//!
//! The engine never touches the container format itself: implement
//! [`DocumentSource`] over your parser and hand the pages in as span lines.

pub mod aggregate;
pub mod fonts;
pub mod headings;
pub mod ingest;
pub mod language;
pub mod tables;

pub use aggregate::{
    process_document, DocumentMetadata, DocumentResult, DocumentSource, DocumentSummary, ImageRef,
    PageResult, PageSpans, ProcessConfig, TextBlock, UNKNOWN_TITLE,
};
pub use fonts::{FontHistogram, FontTier, Thresholds};
pub use headings::{HeadingCandidate, HeadingLevel};
pub use ingest::{BBox, Line, Span, SpanLine};
pub use language::detect_language;
pub use tables::{detect_tables, TableRegion};

use rayon::prelude::*;

/// Upstream extraction failures, as reported by a [`DocumentSource`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// The document could not be opened or read at all.
    #[error("failed to open document: {0}")]
    Open(String),
    /// A single page's extraction failed; non-fatal to the document.
    #[error("page {page} extraction failed: {reason}")]
    Page { page: u32, reason: String },
}

/// Whole-document processing failure: filename plus reason.
///
/// One document's failure never aborts its siblings in a batch.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{filename}: {reason}")]
pub struct DocumentError {
    pub filename: String,
    pub reason: String,
}

impl DocumentError {
    pub fn new(filename: &str, reason: impl Into<String>) -> Self {
        DocumentError {
            filename: filename.to_string(),
            reason: reason.into(),
        }
    }
}

/// Process a batch of independent documents on the rayon pool.
///
/// Documents share no mutable state, so the fan-out is embarrassingly
/// parallel; the pool size (cores) bounds concurrency regardless of batch
/// size. Results come back in input order, one per source, and a failing
/// document surfaces as an `Err` without disturbing the others.
pub fn process_documents(
    sources: &[&dyn DocumentSource],
    config: &ProcessConfig,
) -> Vec<Result<DocumentResult, DocumentError>> {
    sources
        .par_iter()
        .map(|source| process_document(*source, config))
        .collect()
}
