pub mod basic;
pub mod foreign;
pub mod hybrid;
pub mod korean;
pub mod lexicon;
pub mod style;
pub mod terms;

use crate::SuggestionType;
use regex::Regex;
use std::collections::HashSet;

/// A compiled pattern→replacement rule. Tables are built once at startup and
/// treated as immutable; `replace` may reference capture groups as `${n}`.
#[derive(Debug, Clone)]
pub struct RuleEntry {
    pub pattern: Regex,
    pub replace: String,
    pub reason: String,
    pub confidence: f64,
    pub kind: Option<SuggestionType>,
}

/// Build a rule from a static pattern. Static tables are authored in-crate,
/// so an invalid pattern is a programming error.
pub(crate) fn rule(pattern: &str, replace: &str, reason: &str, confidence: f64) -> RuleEntry {
    RuleEntry {
        pattern: Regex::new(pattern).expect("invalid static rule pattern"),
        replace: replace.to_string(),
        reason: reason.to_string(),
        confidence,
        kind: None,
    }
}

pub(crate) fn typed_rule(
    pattern: &str,
    replace: &str,
    reason: &str,
    confidence: f64,
    kind: SuggestionType,
) -> RuleEntry {
    RuleEntry {
        kind: Some(kind),
        ..rule(pattern, replace, reason, confidence)
    }
}

/// Infer a suggestion type from the rule's reason text when the rule does not
/// declare one.
pub fn classify_by_reason(reason: &str) -> SuggestionType {
    let lowered = reason.to_lowercase();
    if lowered.contains("띄어쓰기") || lowered.contains("spacing") {
        return SuggestionType::Spacing;
    }
    if lowered.contains("문장부호")
        || lowered.contains("따옴표")
        || lowered.contains("괄호")
        || lowered.contains("쉼표")
        || lowered.contains("마침표")
        || lowered.contains("말줄임표")
        || lowered.contains("느낌표")
        || lowered.contains("물음표")
    {
        return SuggestionType::Punctuation;
    }
    if lowered.contains("외래")
        || lowered.contains("영문")
        || lowered.contains("숫자")
        || lowered.contains("단위")
    {
        return SuggestionType::Foreign;
    }
    if lowered.contains("스타일") || lowered.contains("이모지") || lowered.contains("반복") {
        return SuggestionType::Style;
    }
    SuggestionType::Orthography
}

/// Drop duplicate rules, keeping the first occurrence. Keyed by pattern,
/// replacement, and reason, mirroring how the tables are merged.
pub fn dedupe_rules(rules: Vec<RuleEntry>) -> Vec<RuleEntry> {
    let mut seen = HashSet::new();
    rules
        .into_iter()
        .filter(|r| {
            seen.insert(format!(
                "{}|{}|{}",
                r.pattern.as_str(),
                r.replace,
                r.reason
            ))
        })
        .collect()
}

/// Clamp a confidence into [0, 1], substituting a fallback for non-finite
/// values.
pub fn clamp_confidence(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => fallback,
    }
}
