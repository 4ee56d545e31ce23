pub mod evasion;
pub mod hangul;

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Presentation normalization result with per-category counters for
/// diagnostics logging.
#[derive(Debug, Clone, Default)]
pub struct NormalizeStats {
    pub normalized: String,
    pub removed_zero_width: usize,
    pub replaced_quotes: usize,
    pub replaced_dashes: usize,
    pub replaced_ellipsis: usize,
    pub collapsed_spaces: usize,
}

lazy_static! {
    static ref ZERO_WIDTH: Regex = Regex::new(r"[\u{200B}-\u{200D}\u{FEFF}]").unwrap();
    static ref CURLY_QUOTES: Regex = Regex::new("[\u{201C}\u{201D}]").unwrap();
    static ref CURLY_SINGLE_QUOTES: Regex = Regex::new("[\u{2018}\u{2019}]").unwrap();
    static ref DASHES: Regex = Regex::new(r"[\u{2012}-\u{2015}\u{2212}]").unwrap();
    static ref ELLIPSIS: Regex = Regex::new("\u{2026}").unwrap();
    static ref MULTI_SPACE: Regex = Regex::new(r"[ \t]{2,}").unwrap();
    static ref CRLF: Regex = Regex::new(r"\r\n?").unwrap();
}

/// Presentation-oriented normalizer used by the suggestion pipeline: NFKC,
/// newline canonicalization, zero-width strip, curly-quote/dash/ellipsis
/// canonicalization, and multi-space collapse. Pure, total, idempotent.
pub fn normalize_text(text: &str) -> NormalizeStats {
    let mut normalized: String = text.nfkc().collect();
    normalized = CRLF.replace_all(&normalized, "\n").into_owned();

    let removed_zero_width = ZERO_WIDTH.find_iter(&normalized).count();
    normalized = ZERO_WIDTH.replace_all(&normalized, "").into_owned();

    let replaced_double = CURLY_QUOTES.find_iter(&normalized).count();
    normalized = CURLY_QUOTES.replace_all(&normalized, "\"").into_owned();

    let replaced_single = CURLY_SINGLE_QUOTES.find_iter(&normalized).count();
    normalized = CURLY_SINGLE_QUOTES.replace_all(&normalized, "'").into_owned();

    let replaced_dashes = DASHES.find_iter(&normalized).count();
    normalized = DASHES.replace_all(&normalized, "-").into_owned();

    let replaced_ellipsis = ELLIPSIS.find_iter(&normalized).count();
    normalized = ELLIPSIS.replace_all(&normalized, "...").into_owned();

    let collapsed_spaces = MULTI_SPACE.find_iter(&normalized).count();
    normalized = MULTI_SPACE.replace_all(&normalized, " ").into_owned();

    NormalizeStats {
        normalized,
        removed_zero_width,
        replaced_quotes: replaced_double + replaced_single,
        replaced_dashes,
        replaced_ellipsis,
        collapsed_spaces,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text_canonicalizes_punctuation() {
        let stats = normalize_text("\u{201C}hello\u{201D} \u{2014} world\u{2026}");
        assert_eq!(stats.normalized, "\"hello\" - world...");
        assert_eq!(stats.replaced_quotes, 2);
        assert_eq!(stats.replaced_dashes, 1);
        // NFKC already expands U+2026; the dedicated step only counts
        // ellipses that survive it.
        assert_eq!(stats.replaced_ellipsis, 0);
    }

    #[test]
    fn test_normalize_text_strips_zero_width_and_collapses_spaces() {
        let stats = normalize_text("a\u{200B}b   c\r\nd");
        assert_eq!(stats.normalized, "ab c\nd");
        assert_eq!(stats.removed_zero_width, 1);
        assert_eq!(stats.collapsed_spaces, 1);
    }

    #[test]
    fn test_normalize_text_is_idempotent() {
        let samples = [
            "\u{201C}곡 제목\u{201D} \u{2013} 가사\u{2026}",
            "plain text",
            "탭\t\t탭",
            "",
        ];
        for sample in samples {
            let once = normalize_text(sample).normalized;
            let twice = normalize_text(&once).normalized;
            assert_eq!(once, twice, "not idempotent for {:?}", sample);
        }
    }
}
