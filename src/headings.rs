//! Heading classification
//!
//! A line becomes a heading only when its shape qualifies: at most ten words,
//! capitalized like a title. The font-size thresholds never decide membership,
//! only the level. Classification runs as the second pass of a two-pass
//! pipeline: the whole-document [`FontHistogram`](crate::fonts::FontHistogram)
//! is complete before the first line is classified, so a line's level can
//! never depend on lines seen later.

use serde::{Deserialize, Serialize};

use crate::fonts::Thresholds;
use crate::ingest::Line;

/// Maximum number of words a heading line may contain.
pub const MAX_HEADING_WORDS: usize = 10;

/// Connective words allowed lowercase inside a title-case line.
const CONNECTIVES: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "in", "of", "on", "or", "the", "to", "with",
];

/// Outline depth, bounded at four levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
}

impl HeadingLevel {
    /// Numeric depth, 1 for H1 through 4 for H4.
    pub fn depth(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
            HeadingLevel::H4 => 4,
        }
    }
}

/// A line classified as a document heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingCandidate {
    pub level: HeadingLevel,
    pub text: String,
    /// Page the heading appears on (1-indexed)
    pub page: u32,
}

/// Shape filter: word count and title-case capitalization, independent of
/// any font information. Lines failing this test are never headings.
pub fn is_heading_shape(text: &str) -> bool {
    let words = text.split_whitespace().count();
    if words == 0 || words > MAX_HEADING_WORDS {
        return false;
    }
    is_title_case_like(text)
}

/// Title-case test: every significant word starts with an uppercase letter
/// and carries no further uppercase (so ALL-CAPS sentences fail); short
/// connectives may stay lowercase after the first word.
fn is_title_case_like(text: &str) -> bool {
    let mut saw_cased = false;

    for (idx, word) in text.split_whitespace().enumerate() {
        let cased: String = word
            .chars()
            .filter(|c| c.is_uppercase() || c.is_lowercase())
            .collect();
        let mut chars = cased.chars();
        let first = match chars.next() {
            Some(c) => c,
            None => continue, // no cased letters: numbering like "2.1", uncased scripts
        };
        saw_cased = true;

        if first.is_lowercase() {
            let allowed = idx > 0 && CONNECTIVES.contains(&cased.to_lowercase().as_str());
            if !allowed || chars.any(|c| c.is_uppercase()) {
                return false;
            }
            continue;
        }

        if chars.any(|c| c.is_uppercase()) {
            return false;
        }
    }

    saw_cased
}

/// Classify a single line against the completed histogram thresholds.
///
/// The shape test gates membership; the thresholds only assign the level:
/// rounded size >= `biggest` is H1, >= `second` H2, >= `third` H3, H4 below.
pub fn classify_line(line: &Line, thresholds: &Thresholds) -> Option<HeadingCandidate> {
    if !is_heading_shape(&line.text) {
        return None;
    }

    let size = line.font_size.round() as i32;
    let level = if size >= thresholds.biggest {
        HeadingLevel::H1
    } else if size >= thresholds.second {
        HeadingLevel::H2
    } else if size >= thresholds.third {
        HeadingLevel::H3
    } else {
        HeadingLevel::H4
    };

    Some(HeadingCandidate {
        level,
        text: line.text.clone(),
        page: line.page,
    })
}

/// Classify every line of a page, preserving encounter order.
pub fn classify_page(lines: &[Line], thresholds: &Thresholds) -> Vec<HeadingCandidate> {
    lines
        .iter()
        .filter_map(|line| classify_line(line, thresholds))
        .collect()
}
