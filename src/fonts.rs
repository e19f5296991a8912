//! Font-size histogram and heading thresholds
//!
//! Heading levels are inferred from font dominance: every line's font size is
//! rounded to the nearest point and counted, and the top three distinct sizes
//! become the H1/H2/H3 boundaries. The histogram must cover the whole document
//! before any line is classified, so accumulation supports an associative
//! `merge` for parallel reduction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ingest::Line;

/// A rounded font-size bucket with its occurrence count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontTier {
    /// Font size rounded to the nearest point
    pub size: i32,
    /// Number of lines observed at this size
    pub count: u64,
}

/// Heading-level boundaries derived from the top font tiers.
///
/// Always three distinct values (`biggest > second > third`) for any
/// non-empty document; missing tiers are synthesized by decrementing the
/// previous threshold by one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub biggest: i32,
    pub second: i32,
    pub third: i32,
}

/// Frequency distribution of rounded font sizes across a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontHistogram {
    counts: HashMap<i32, u64>,
}

impl FontHistogram {
    /// Count one line's rounded font size.
    pub fn observe(&mut self, line: &Line) {
        let size = line.font_size.round() as i32;
        *self.counts.entry(size).or_insert(0) += 1;
    }

    /// Count every line in the slice.
    pub fn observe_all(&mut self, lines: &[Line]) {
        for line in lines {
            self.observe(line);
        }
    }

    /// Fold another histogram into this one.
    ///
    /// Commutative and associative, so per-page histograms can be reduced
    /// in any order.
    pub fn merge(&mut self, other: FontHistogram) {
        for (size, count) in other.counts {
            *self.counts.entry(size).or_insert(0) += count;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Ranked tiers, descending by size.
    pub fn tiers(&self) -> Vec<FontTier> {
        let mut tiers: Vec<FontTier> = self
            .counts
            .iter()
            .map(|(&size, &count)| FontTier { size, count })
            .collect();
        tiers.sort_by(|a, b| b.size.cmp(&a.size));
        tiers
    }

    /// Heading boundaries from the top three distinct tier sizes.
    ///
    /// Returns `None` for an empty document; the classifier then emits no
    /// headings at all.
    pub fn thresholds(&self) -> Option<Thresholds> {
        let tiers = self.tiers();
        let biggest = tiers.first()?.size;
        let second = tiers.get(1).map(|t| t.size).unwrap_or(biggest - 1);
        let third = tiers.get(2).map(|t| t.size).unwrap_or(second - 1);
        Some(Thresholds {
            biggest,
            second,
            third,
        })
    }
}
