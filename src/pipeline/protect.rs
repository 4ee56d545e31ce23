//! Protected spans: regions where non-spacing/punctuation suggestions are
//! suppressed — Latin tokens, acronyms, tags, curated protected terms, and
//! (for the music domain) release/format jargon.

use crate::rules::lexicon::PROTECTED_TERMS;
use crate::Domain;
use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use lazy_static::lazy_static;
use regex::Regex;

/// A do-not-touch region, byte offsets into the working text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedSpan {
    pub start: usize,
    pub end: usize,
    pub reason: &'static str,
}

const MUSIC_TERMS: [&str; 19] = [
    "EP", "LP", "MV", "OST", "Dolby Atmos", "Dolby", "Atmos", "Hi-Res", "Remaster", "Remastered",
    "BPM", "Hz", "kHz", "FLAC", "WAV", "MP3", "AAC", "AIFF", "MIDI",
];

lazy_static! {
    static ref ENGLISH_TOKEN: Regex = Regex::new(r"[A-Za-z][A-Za-z0-9'_.-]*").unwrap();
    static ref ACRONYM: Regex = Regex::new(r"\b[A-Z0-9]{2,}\b").unwrap();
    static ref TAG: Regex = Regex::new(r"[#@][A-Za-z0-9_]+").unwrap();
    static ref MUSIC_MATCHER: AhoCorasick = AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .match_kind(MatchKind::LeftmostLongest)
        .build(MUSIC_TERMS)
        .expect("music term automaton");
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Literal-term scanner over the curated protected terms plus any extra
/// terms from configuration. Built once per engine.
pub struct ProtectedSpanBuilder {
    terms: Vec<String>,
    term_matcher: Option<AhoCorasick>,
}

impl ProtectedSpanBuilder {
    pub fn new(extra_terms: &[String]) -> Self {
        let mut terms: Vec<String> = PROTECTED_TERMS
            .iter()
            .cloned()
            .chain(extra_terms.iter().map(|t| t.trim().to_string()))
            .filter(|t| !t.is_empty())
            .collect();
        terms.sort();
        terms.dedup();

        let term_matcher = if terms.is_empty() {
            None
        } else {
            AhoCorasickBuilder::new()
                .ascii_case_insensitive(true)
                .match_kind(MatchKind::LeftmostLongest)
                .build(&terms)
                .ok()
        };

        Self {
            terms,
            term_matcher,
        }
    }

    pub fn build(&self, text: &str, domain: Domain) -> Vec<ProtectedSpan> {
        let mut spans = Vec::new();

        for m in ENGLISH_TOKEN.find_iter(text) {
            spans.push(ProtectedSpan {
                start: m.start(),
                end: m.end(),
                reason: "english",
            });
        }
        for m in ACRONYM.find_iter(text) {
            spans.push(ProtectedSpan {
                start: m.start(),
                end: m.end(),
                reason: "acronym",
            });
        }
        for m in TAG.find_iter(text) {
            spans.push(ProtectedSpan {
                start: m.start(),
                end: m.end(),
                reason: "tag",
            });
        }

        if let Some(matcher) = &self.term_matcher {
            for m in matcher.find_iter(text) {
                let term = &self.terms[m.pattern().as_usize()];
                // ASCII terms keep word-boundary semantics; Korean terms
                // match anywhere.
                if term.is_ascii() && !has_word_boundaries(text, m.start(), m.end()) {
                    continue;
                }
                spans.push(ProtectedSpan {
                    start: m.start(),
                    end: m.end(),
                    reason: "protected_term",
                });
            }
        }

        if domain == Domain::Music {
            for m in MUSIC_MATCHER.find_iter(text) {
                spans.push(ProtectedSpan {
                    start: m.start(),
                    end: m.end(),
                    reason: "domain_term",
                });
            }
        }

        spans
    }
}

fn has_word_boundaries(text: &str, start: usize, end: usize) -> bool {
    let bytes = text.as_bytes();
    let left_ok = start == 0 || !is_word_byte(bytes[start - 1]);
    let right_ok = end >= bytes.len() || !is_word_byte(bytes[end]);
    left_ok && right_ok
}
