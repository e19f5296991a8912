//! Span ingestion: normalizing upstream span records into canonical lines
//!
//! The upstream container parser delivers positioned text spans already grouped
//! into visual lines. This module collapses each group into the engine's
//! canonical [`Line`]: trimmed text, union bounding box, character-weighted
//! font size, and dominant font name.

use log::debug;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in page coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Smallest box enclosing both `self` and `other`.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// All coordinates finite and edges not inverted.
    pub fn is_well_formed(&self) -> bool {
        self.x0.is_finite()
            && self.y0.is_finite()
            && self.x1.is_finite()
            && self.y1.is_finite()
            && self.x0 <= self.x1
            && self.y0 <= self.y1
    }
}

/// A positioned text run from the upstream parser.
///
/// Immutable once produced; the engine never writes back into spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// The text content
    pub text: String,
    /// Bounding box on the page
    pub bbox: BBox,
    /// Font size in points
    pub font_size: f32,
    /// Font name, "unknown" when the parser could not resolve it
    pub font: String,
}

/// One visual text line as grouped by the upstream parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanLine {
    pub spans: Vec<Span>,
}

impl From<Vec<Span>> for SpanLine {
    fn from(spans: Vec<Span>) -> Self {
        Self { spans }
    }
}

/// Canonical line model used throughout the engine.
///
/// Read-only after construction: every downstream component (heading
/// classification, table detection, aggregation) borrows lines, never
/// mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Page the line belongs to (1-indexed)
    pub page: u32,
    /// Trimmed text, never empty
    pub text: String,
    /// Union of the constituent span boxes
    pub bbox: BBox,
    /// Character-count weighted mean of the span font sizes
    pub font_size: f32,
    /// Font of the longest span in the line
    pub font: String,
}

/// Normalize one page worth of upstream span lines into canonical [`Line`]s.
///
/// Pure transform: lines whose text trims to empty are dropped, and lines
/// with a malformed bounding box (non-finite or inverted coordinates) are
/// skipped without failing the page.
pub fn ingest_page(page: u32, span_lines: &[SpanLine]) -> Vec<Line> {
    let mut lines = Vec::with_capacity(span_lines.len());
    for raw in span_lines {
        if let Some(line) = build_line(page, raw) {
            lines.push(line);
        }
    }
    lines
}

fn build_line(page: u32, raw: &SpanLine) -> Option<Line> {
    let first = raw.spans.first()?;

    if raw.spans.iter().any(|s| !s.bbox.is_well_formed()) {
        debug!("page {}: skipping line with malformed bbox", page);
        return None;
    }

    let mut text = String::new();
    let mut bbox = first.bbox;
    let mut weighted_size = 0.0f64;
    let mut total_chars = 0usize;
    let mut dominant: (&str, usize) = (first.font.as_str(), 0);

    for span in &raw.spans {
        let trimmed = span.text.trim();
        if !trimmed.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(trimmed);
        }

        let chars = trimmed.chars().count();
        weighted_size += span.font_size as f64 * chars as f64;
        total_chars += chars;
        bbox = bbox.union(&span.bbox);
        if chars > dominant.1 {
            dominant = (span.font.as_str(), chars);
        }
    }

    if text.is_empty() {
        debug!("page {}: dropping line with empty text", page);
        return None;
    }

    // Divisor floored to 1 so a pathological zero-weight line cannot divide by zero.
    let font_size = (weighted_size / total_chars.max(1) as f64) as f32;

    Some(Line {
        page,
        text,
        bbox,
        font_size,
        font: dominant.0.to_string(),
    })
}
