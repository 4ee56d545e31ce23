//! Embedded dictionary: literal replacement pairs plus the protected-term
//! list. Shipped as JSON so curators can edit it without touching code; the
//! same entry shape is accepted from the remote term source.

use super::{clamp_confidence, RuleEntry};
use crate::SuggestionType;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

const DICTIONARY_JSON: &str = include_str!("../../data/dictionary.json");

#[derive(Debug, Clone, Deserialize)]
pub struct DictionaryReplacement {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct DictionaryPayload {
    #[serde(default)]
    protected: Vec<String>,
    #[serde(default)]
    replacements: Vec<DictionaryReplacement>,
}

fn load_payload() -> DictionaryPayload {
    match serde_json::from_str(DICTIONARY_JSON) {
        Ok(payload) => payload,
        Err(err) => {
            log::error!("embedded dictionary is not valid JSON: {}", err);
            DictionaryPayload::default()
        }
    }
}

fn is_ascii_word(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Compile a literal from→to entry. ASCII words are matched case-insensitively
/// on word boundaries; Korean entries match anywhere.
pub fn compile_replacement(entry: &DictionaryReplacement, default_reason: &str) -> Option<RuleEntry> {
    let from = entry.from.trim();
    let to = entry.to.trim();
    if from.is_empty() || to.is_empty() {
        return None;
    }
    let language = entry
        .language
        .as_deref()
        .unwrap_or("KO")
        .to_ascii_uppercase();
    let escaped = regex::escape(from);
    let source = if language == "EN" || is_ascii_word(from) {
        format!(r"(?i)\b{}\b", escaped)
    } else {
        escaped
    };
    let pattern = match Regex::new(&source) {
        Ok(pattern) => pattern,
        Err(err) => {
            log::warn!("skipping dictionary entry {:?}: {}", from, err);
            return None;
        }
    };
    Some(RuleEntry {
        pattern,
        replace: to.to_string(),
        reason: entry
            .reason
            .clone()
            .unwrap_or_else(|| default_reason.to_string()),
        confidence: clamp_confidence(entry.confidence, 0.9),
        kind: None,
    })
}

lazy_static! {
    static ref PAYLOAD: DictionaryPayload = load_payload();

    /// Dictionary rules compiled once at startup.
    pub static ref DICTIONARY_RULES: Vec<RuleEntry> = PAYLOAD
        .replacements
        .iter()
        .filter_map(|entry| compile_replacement(entry, "dictionary_rule"))
        .collect();

    /// Terms that suppress non-spacing suggestions overlapping them.
    pub static ref PROTECTED_TERMS: Vec<String> = {
        let mut terms: Vec<String> = PAYLOAD
            .protected
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        terms.sort();
        terms.dedup();
        terms
    };
}

/// Build custom-term rules from externally sourced entries. Custom terms are
/// curated, so they carry a high default confidence and the custom type.
pub fn build_custom_rules(entries: &[DictionaryReplacement]) -> Vec<RuleEntry> {
    entries
        .iter()
        .filter_map(|entry| {
            let mut rule = compile_replacement(entry, "custom_rule")?;
            rule.confidence = clamp_confidence(entry.confidence, 0.96);
            rule.kind = Some(SuggestionType::Custom);
            Some(rule)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_dictionary_loads() {
        assert!(!DICTIONARY_RULES.is_empty());
        assert!(!PROTECTED_TERMS.is_empty());
    }

    #[test]
    fn test_korean_entry_matches_anywhere() {
        let rule = DICTIONARY_RULES
            .iter()
            .find(|r| r.pattern.is_match("드러갓어"))
            .unwrap();
        assert_eq!(rule.pattern.replace("드러갓어", rule.replace.as_str()), "들어갔어");
    }

    #[test]
    fn test_english_entry_is_word_bounded() {
        let entry = DictionaryReplacement {
            from: "remasterd".into(),
            to: "Remastered".into(),
            reason: None,
            confidence: None,
            language: Some("EN".into()),
        };
        let rule = compile_replacement(&entry, "dictionary_rule").unwrap();
        assert!(rule.pattern.is_match("the REMASTERD album"));
        assert!(!rule.pattern.is_match("xremasterd"));
    }

    #[test]
    fn test_blank_entries_are_skipped() {
        let entry = DictionaryReplacement {
            from: "  ".into(),
            to: "x".into(),
            reason: None,
            confidence: None,
            language: None,
        };
        assert!(compile_replacement(&entry, "dictionary_rule").is_none());
    }

    #[test]
    fn test_custom_rules_default_confidence() {
        let entries = vec![DictionaryReplacement {
            from: "밴드명".into(),
            to: "공식 밴드명".into(),
            reason: None,
            confidence: None,
            language: None,
        }];
        let rules = build_custom_rules(&entries);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].confidence, 0.96);
        assert_eq!(rules[0].kind, Some(SuggestionType::Custom));
    }
}
