//! The basic corrector: a small literal rule set applied globally with
//! sanity guards, plus a masked local rule engine that hides Latin tokens
//! behind placeholders so Korean patterns cannot bleed into them.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Inputs longer than this are truncated before rule application; the
/// remainder is reattached untouched.
pub const MAX_TEXT_LENGTH: usize = 20_000;
/// Corrected output shorter than this fraction of the input is rejected.
pub const MIN_LENGTH_RATIO: f64 = 0.5;
/// The length-ratio guard only applies to inputs longer than this.
pub const MIN_LENGTH_CHECK_THRESHOLD: usize = 20;

#[derive(Debug, Error, PartialEq)]
pub enum BasicCheckError {
    #[error("empty input text")]
    EmptyText,
    #[error("correction produced a degenerate result")]
    CorrectionInvalid,
}

/// A literal correction pair for the basic path.
#[derive(Debug, Clone)]
pub struct BasicRule {
    pub pattern: Regex,
    pub replace: String,
}

fn b(pattern: &str, replace: &str) -> BasicRule {
    BasicRule {
        pattern: Regex::new(pattern).expect("invalid basic rule pattern"),
        replace: replace.to_string(),
    }
}

lazy_static! {
    pub static ref BASIC_CORRECTIONS: Vec<BasicRule> = vec![
        b("됬", "됐"),
        b("됫", "됐"),
        b("싫엇", "싫었"),
        b("이엇", "이었"),
        b("잇", "있"),
        b(r"거\s?같", "것 같"),
        b("놀리는거", "놀리는 거"),
        b("못햇", "못했"),
        b("안돼다", "안 되다"),
        b("안되요", "안 돼요"),
        b("안되죠", "안 되죠"),
        b("안되면", "안 되면"),
        b("안되", "안 돼"),
        b("됄", "될"),
        b("되요", "돼요"),
        b("되서", "돼서"),
        b("할께요", "할게요"),
        b("할께", "할게"),
        b("될께", "될게"),
        b("그럴께", "그럴게"),
        b("되겠지요", "되겠죠"),
        b("안됌", "안 됨"),
        b("됌", "됨"),
        b("되면안", "되면 안"),
        b("어떻해", "어떻게"),
        b("어떻케", "어떻게"),
    ];
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuickChange {
    pub from: String,
    pub to: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuickCorrection {
    pub original: String,
    pub corrected: String,
    pub changes: Vec<QuickChange>,
    pub truncated: bool,
}

/// Apply every rule globally, recording one change per original match.
pub fn apply_replacement_rules(text: &str, rules: &[BasicRule]) -> (String, Vec<QuickChange>) {
    let mut corrected = text.to_string();
    let mut changes = Vec::new();

    for rule in rules {
        let matches: Vec<(usize, String)> = rule
            .pattern
            .find_iter(&corrected)
            .map(|m| (m.start(), m.as_str().to_string()))
            .collect();
        if matches.is_empty() {
            continue;
        }
        corrected = rule
            .pattern
            .replace_all(&corrected, rule.replace.as_str())
            .into_owned();
        for (index, from) in matches {
            changes.push(QuickChange {
                from,
                to: rule.replace.clone(),
                index,
            });
        }
    }

    (corrected, changes)
}

fn char_boundary_at(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// The basic correction entry point with the original's sanity guards.
pub fn quick_correct(text: &str, rules: &[BasicRule]) -> Result<QuickCorrection, BasicCheckError> {
    if text.trim().is_empty() {
        return Err(BasicCheckError::EmptyText);
    }

    let char_count = text.chars().count();
    let truncated = char_count > MAX_TEXT_LENGTH;
    let (working, remainder) = if truncated {
        let cut = char_boundary_at(text, MAX_TEXT_LENGTH);
        (&text[..cut], &text[cut..])
    } else {
        (text, "")
    };

    let (corrected_partial, changes) = apply_replacement_rules(working, rules);
    let corrected = format!("{}{}", corrected_partial, remainder);

    if corrected.trim().is_empty() {
        return Err(BasicCheckError::CorrectionInvalid);
    }
    if char_count > MIN_LENGTH_CHECK_THRESHOLD
        && (corrected.chars().count() as f64) < (char_count as f64) * MIN_LENGTH_RATIO
    {
        return Err(BasicCheckError::CorrectionInvalid);
    }

    Ok(QuickCorrection {
        original: text.to_string(),
        corrected,
        changes,
        truncated,
    })
}

#[derive(Debug, Clone)]
pub struct LocalSuggestion {
    pub start: usize,
    pub end: usize,
    pub before: String,
    pub after: String,
    pub reason: String,
}

struct MaskedText {
    sanitized: String,
    // Byte-level map from sanitized text back to original byte offsets.
    index_map: Vec<usize>,
}

lazy_static! {
    static ref LATIN_TOKEN: Regex = Regex::new(r"[A-Za-z][A-Za-z0-9'_.-]*").unwrap();
}

/// Replace Latin tokens with `__EN{n}__` placeholders, keeping a byte map
/// back into the original text.
fn mask_latin_tokens(text: &str) -> MaskedText {
    let mut sanitized = String::with_capacity(text.len());
    let mut index_map = Vec::with_capacity(text.len());
    let mut cursor = 0;

    for (counter, m) in LATIN_TOKEN.find_iter(text).enumerate() {
        let segment = &text[cursor..m.start()];
        sanitized.push_str(segment);
        for i in 0..segment.len() {
            index_map.push(cursor + i);
        }
        let placeholder = format!("__EN{}__", counter);
        for _ in 0..placeholder.len() {
            index_map.push(m.start());
        }
        sanitized.push_str(&placeholder);
        cursor = m.end();
    }

    let tail = &text[cursor..];
    sanitized.push_str(tail);
    for i in 0..tail.len() {
        index_map.push(cursor + i);
    }

    MaskedText {
        sanitized,
        index_map,
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// Collect rule suggestions over the masked text and map spans back to the
/// original, so Korean patterns never report spans inside Latin tokens.
pub fn run_local_rules(text: &str, rules: &[BasicRule]) -> Vec<LocalSuggestion> {
    let straightened = text
        .replace(&['\u{201C}', '\u{201D}'][..], "\"")
        .replace(&['\u{2018}', '\u{2019}'][..], "'");
    let masked = mask_latin_tokens(&straightened);
    let mut suggestions = Vec::new();

    for rule in rules {
        for m in rule.pattern.find_iter(&masked.sanitized) {
            if m.as_str().is_empty() {
                continue;
            }
            let after = rule
                .pattern
                .replace(m.as_str(), rule.replace.as_str())
                .into_owned();
            if after == m.as_str() {
                continue;
            }
            let start = masked.index_map.get(m.start()).copied().unwrap_or(m.start());
            let end = masked
                .index_map
                .get(m.end() - 1)
                .copied()
                .unwrap_or(m.end() - 1)
                + 1;
            let start = floor_char_boundary(text, start.min(text.len()));
            let end = ceil_char_boundary(text, end.min(text.len()));
            let before = text[start..end].to_string();
            suggestions.push(LocalSuggestion {
                start,
                end,
                before,
                after,
                reason: "local_rule".to_string(),
            });
        }
    }

    suggestions
}
