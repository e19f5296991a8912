//! Coarse script/language classification
//!
//! Deliberately cheap heuristic, not a language-ID model: the ratio of Latin
//! letters to all letter-like characters buckets a sample into "en", "mixed",
//! or "non-latin".

use once_cell::sync::Lazy;
use regex::Regex;

static LATIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]").unwrap());

// Latin plus Latin-extended, Cyrillic, and CJK unified ideographs.
static LETTER_LIKE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z\u{00C0}-\u{017F}\u{0400}-\u{04FF}\u{4E00}-\u{9FFF}]").unwrap()
});

/// Classify the dominant script of a text sample.
///
/// Returns "unknown" when the sample contains no letter-like characters at
/// all; otherwise "en" above a 0.8 Latin ratio, "mixed" above 0.5, and
/// "non-latin" below.
pub fn detect_language(text: &str) -> &'static str {
    let letter_like = LETTER_LIKE_RE.find_iter(text).count();
    if letter_like == 0 {
        return "unknown";
    }

    let latin = LATIN_RE.find_iter(text).count();
    let latin_ratio = latin as f32 / letter_like as f32;

    if latin_ratio > 0.8 {
        "en"
    } else if latin_ratio > 0.5 {
        "mixed"
    } else {
        "non-latin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_unknown() {
        assert_eq!(detect_language(""), "unknown");
    }

    #[test]
    fn test_no_letters_is_unknown() {
        assert_eq!(detect_language("123 456 --- !!! 7.89"), "unknown");
    }

    #[test]
    fn test_english_text() {
        assert_eq!(
            detect_language("The quick brown fox jumps over the lazy dog"),
            "en"
        );
    }

    #[test]
    fn test_cyrillic_is_non_latin() {
        assert_eq!(detect_language("Съешь же ещё этих мягких булок"), "non-latin");
    }

    #[test]
    fn test_cjk_is_non_latin() {
        assert_eq!(detect_language("人工智能正在改变世界"), "non-latin");
    }

    #[test]
    fn test_mixed_scripts() {
        // 14 Latin letters against 8 CJK characters: ratio ~0.64
        assert_eq!(detect_language("neural networks 神经网络模型训练"), "mixed");
    }

    #[test]
    fn test_accented_latin_counts_as_letter_like_only() {
        // Accented characters widen the denominator without raising the
        // Latin count, pulling heavily accented text below the "en" ratio.
        assert_eq!(detect_language("abcd"), "en");
        assert_eq!(detect_language("àèìòù"), "non-latin");
    }
}
