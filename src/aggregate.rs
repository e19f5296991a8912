//! Document aggregation: the two-phase pipeline driver
//!
//! Drives span ingestion, heading classification, and table detection per
//! page, then merges page results into one [`DocumentResult`]. The pipeline is
//! strictly two-phase: phase 1 walks every page in bounded batches to build
//! the whole-document [`FontHistogram`], phase 2 classifies pages in parallel
//! against the completed thresholds. No mutable state is shared between
//! phases beyond the histogram value handed from one to the other.

use log::warn;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::fonts::FontHistogram;
use crate::headings::{classify_page, HeadingCandidate, HeadingLevel};
use crate::ingest::{ingest_page, BBox, Line, SpanLine};
use crate::language::detect_language;
use crate::tables::{detect_tables, TableRegion};
use crate::{DocumentError, SourceError};

/// Sentinel title for documents with no metadata title (and no inferred one).
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// An embedded image descriptor, passed through unchanged from upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Placement box on the page
    pub bbox: BBox,
    /// Pixel width of the embedded image
    pub width: u32,
    /// Pixel height of the embedded image
    pub height: u32,
}

/// Document-level metadata from the upstream parser.
///
/// Date fields are normalized `YYYY-MM-DD HH:MM:SS` strings, or empty when
/// the source document carries none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub author: String,
    pub title: String,
    pub subject: String,
    pub creation_date: String,
    pub modification_date: String,
}

impl DocumentMetadata {
    /// Normalize a raw PDF date string (`D:YYYYMMDDHHmmSS...`) into
    /// `YYYY-MM-DD HH:MM:SS`.
    ///
    /// Strings without the `D:` prefix are assumed already normalized and
    /// returned unchanged; malformed `D:` strings normalize to empty.
    pub fn normalize_pdf_date(raw: &str) -> String {
        let raw = raw.trim();
        let Some(stamp) = raw.strip_prefix("D:") else {
            return raw.to_string();
        };

        if stamp.len() < 14 || !stamp.as_bytes()[..14].iter().all(u8::is_ascii_digit) {
            return String::new();
        }

        let digits = &stamp[..14];
        format!(
            "{}-{}-{} {}:{}:{}",
            &digits[0..4],
            &digits[4..6],
            &digits[6..8],
            &digits[8..10],
            &digits[10..12],
            &digits[12..14]
        )
    }
}

/// One page worth of upstream parse output: span lines plus image descriptors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSpans {
    pub lines: Vec<SpanLine>,
    pub images: Vec<ImageRef>,
}

/// The upstream collaborator contract.
///
/// Implementations wrap a container parser (or a fixture) and hand the engine
/// already-extracted spans. `read_page` is treated as a synchronous, possibly
/// time-costly call; it is only invoked from phase 1's batched walk.
pub trait DocumentSource: Sync {
    /// Name reported in results and failure messages.
    fn file_name(&self) -> &str;

    /// Document-level metadata; empty fields when the source has none.
    fn metadata(&self) -> DocumentMetadata;

    /// Total page count, or a whole-document failure.
    fn page_count(&self) -> Result<u32, SourceError>;

    /// Extract one page's spans (1-indexed). A per-page failure is non-fatal
    /// to the document.
    fn read_page(&self, number: u32) -> Result<PageSpans, SourceError>;
}

/// Pipeline tuning knobs.
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    /// Pages fetched per phase-1 batch; raw span buffers are released at
    /// batch end so large documents stay bounded in memory.
    pub page_batch_size: usize,
    /// When the metadata title is empty, fall back to the first H1 of the
    /// outline instead of the sentinel.
    pub title_from_outline: bool,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            page_batch_size: 10,
            title_from_outline: false,
        }
    }
}

/// One canonical line rendered into the page record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub bbox: BBox,
    pub text: String,
    pub font_size: f32,
    pub font: String,
}

impl From<&Line> for TextBlock {
    fn from(line: &Line) -> Self {
        TextBlock {
            bbox: line.bbox,
            text: line.text.clone(),
            font_size: line.font_size,
            font: line.font.clone(),
        }
    }
}

/// Structured result for a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Concatenated line text for the page
    pub text_content: String,
    /// Ordered canonical lines
    pub text_blocks: Vec<TextBlock>,
    /// Detected table regions
    pub tables: Vec<TableRegion>,
    /// Embedded images, passed through from upstream
    pub images: Vec<ImageRef>,
}

/// Whole-document summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Total characters of page text across the document
    pub total_text_length: u64,
    /// Total embedded images across pages
    pub total_images: u64,
    /// Total detected tables across pages
    pub total_tables: u64,
    /// Coarse script classification from the first page
    pub language: String,
}

/// The final structured document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub filename: String,
    pub total_pages: u32,
    pub metadata: DocumentMetadata,
    /// Resolved document title (metadata, outline, or the sentinel)
    pub title: String,
    /// Heading outline in page/line encounter order
    pub outline: Vec<HeadingCandidate>,
    /// Per-page results in page-number order
    pub pages: Vec<PageResult>,
    pub summary: DocumentSummary,
    /// Non-fatal page-level failures recorded during processing
    pub warnings: Vec<String>,
}

/// Lines and passthrough data retained for one page between phases.
struct PageLines {
    number: u32,
    lines: Vec<Line>,
    images: Vec<ImageRef>,
}

/// Run the full two-phase pipeline over one document.
///
/// A failed `page_count` fails the whole document; a failed `read_page`
/// records an empty page result plus a warning and processing continues.
pub fn process_document(
    source: &dyn DocumentSource,
    config: &ProcessConfig,
) -> Result<DocumentResult, DocumentError> {
    let filename = source.file_name().to_string();
    let total_pages = source
        .page_count()
        .map_err(|e| DocumentError::new(&filename, e.to_string()))?;
    let metadata = source.metadata();

    // Phase 1: batched page walk. Canonical lines are retained, raw span
    // buffers are dropped at the end of each batch iteration.
    let mut pages: Vec<PageLines> = Vec::with_capacity(total_pages as usize);
    let mut warnings: Vec<String> = Vec::new();
    let batch_size = config.page_batch_size.max(1) as u32;

    let mut batch_start = 1u32;
    while batch_start <= total_pages {
        let batch_end = total_pages.min(batch_start + batch_size - 1);
        for number in batch_start..=batch_end {
            match source.read_page(number) {
                Ok(spans) => {
                    let lines = ingest_page(number, &spans.lines);
                    pages.push(PageLines {
                        number,
                        lines,
                        images: spans.images,
                    });
                }
                Err(err) => {
                    warn!("{}: page {} failed: {}", filename, number, err);
                    warnings.push(format!("page {}: {}", number, err));
                    pages.push(PageLines {
                        number,
                        lines: Vec::new(),
                        images: Vec::new(),
                    });
                }
            }
        }
        batch_start = batch_end + 1;
    }

    // Histogram over the whole document: per-page counts folded by the
    // commutative merge, so page order cannot matter.
    let histogram = pages
        .par_iter()
        .map(|page| {
            let mut hist = FontHistogram::default();
            hist.observe_all(&page.lines);
            hist
        })
        .reduce(FontHistogram::default, |mut acc, hist| {
            acc.merge(hist);
            acc
        });
    let thresholds = histogram.thresholds();

    // Phase 2: pages are independent once the thresholds exist.
    let classified: Vec<(PageResult, Vec<HeadingCandidate>)> = pages
        .into_par_iter()
        .map(|page| {
            let headings = match &thresholds {
                Some(th) => classify_page(&page.lines, th),
                None => Vec::new(),
            };
            let tables = detect_tables(&page.lines);
            let text_content = page
                .lines
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            let text_blocks = page.lines.iter().map(TextBlock::from).collect();

            let result = PageResult {
                page_number: page.number,
                text_content,
                text_blocks,
                tables,
                images: page.images,
            };
            (result, headings)
        })
        .collect();

    let mut outline = Vec::new();
    let mut page_results = Vec::with_capacity(classified.len());
    for (result, headings) in classified {
        outline.extend(headings);
        page_results.push(result);
    }

    let summary = summarize(&page_results);
    let title = resolve_title(&metadata, &outline, config);

    Ok(DocumentResult {
        filename,
        total_pages,
        metadata,
        title,
        outline,
        pages: page_results,
        summary,
        warnings,
    })
}

fn summarize(pages: &[PageResult]) -> DocumentSummary {
    let total_text_length = pages
        .iter()
        .map(|p| p.text_content.chars().count() as u64)
        .sum();
    let total_images = pages.iter().map(|p| p.images.len() as u64).sum();
    let total_tables = pages.iter().map(|p| p.tables.len() as u64).sum();

    // Whole-document proxy: the first page's text stands in for the document.
    let language = pages
        .first()
        .map(|p| detect_language(&p.text_content))
        .unwrap_or("unknown")
        .to_string();

    DocumentSummary {
        total_text_length,
        total_images,
        total_tables,
        language,
    }
}

fn resolve_title(
    metadata: &DocumentMetadata,
    outline: &[HeadingCandidate],
    config: &ProcessConfig,
) -> String {
    let meta_title = metadata.title.trim();
    if !meta_title.is_empty() {
        return meta_title.to_string();
    }

    if config.title_from_outline {
        if let Some(h1) = outline.iter().find(|h| h.level == HeadingLevel::H1) {
            return h1.text.clone();
        }
    }

    UNKNOWN_TITLE.to_string()
}
