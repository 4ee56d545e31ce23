//! Legacy term-list profanity matching: a single combined pattern over the
//! base Korean/English terms plus curator-supplied additions. Kept alongside
//! the scored engine so call sites can compare verdicts during rollout.

use regex::Regex;

#[derive(Debug, Clone)]
pub struct ProfanityTerm {
    pub term: String,
    pub language: Option<String>,
}

const BASE_KOREAN_TERMS: [&str; 10] = [
    "씨발", "시발", "ㅅㅂ", "좆", "존나", "새끼", "개새끼", "병신", "지랄", "썅",
];

const BASE_ENGLISH_TERMS: [&str; 13] = [
    "fuck",
    "fucking",
    "shit",
    "bullshit",
    "bitch",
    "bastard",
    "asshole",
    "motherfucker",
    "dick",
    "pussy",
    "cunt",
    "slut",
    "whore",
];

pub struct LegacyMatchers {
    pub pattern: Regex,
}

impl LegacyMatchers {
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

fn unique_terms(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|value| {
            let key = value.trim().to_lowercase();
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}

/// Build the combined matcher from the base lists plus custom terms.
/// English terms are word-bounded; Korean terms match anywhere.
pub fn build_legacy_matchers(terms: &[ProfanityTerm]) -> Option<LegacyMatchers> {
    let mut korean: Vec<String> = BASE_KOREAN_TERMS.iter().map(|s| s.to_string()).collect();
    let mut english: Vec<String> = BASE_ENGLISH_TERMS.iter().map(|s| s.to_string()).collect();

    for item in terms {
        let term = item.term.trim();
        if term.is_empty() {
            continue;
        }
        let language = item
            .language
            .as_deref()
            .unwrap_or("KO")
            .to_ascii_uppercase();
        if language == "EN" {
            english.push(term.to_string());
        } else {
            korean.push(term.to_string());
        }
    }

    let korean = unique_terms(korean);
    let english = unique_terms(english);

    let korean_pattern = korean
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    let english_pattern = english
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");

    let mut sources = Vec::new();
    if !korean_pattern.is_empty() {
        sources.push(korean_pattern);
    }
    if !english_pattern.is_empty() {
        sources.push(format!(r"\b(?:{})\b", english_pattern));
    }
    if sources.is_empty() {
        return None;
    }

    let pattern = Regex::new(&format!("(?i)({})", sources.join("|"))).ok()?;
    Some(LegacyMatchers { pattern })
}

/// Unique matched terms in order of first appearance.
pub fn extract_profanity_words(value: &str, matchers: &LegacyMatchers) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    matchers
        .pattern
        .find_iter(value)
        .map(|m| m.as_str().trim().to_string())
        .filter(|word| !word.is_empty() && seen.insert(word.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_terms_match() {
        let matchers = build_legacy_matchers(&[]).unwrap();
        assert!(matchers.is_match("this is fuck"));
        assert!(matchers.is_match("ㅅㅂ"));
        assert!(!matchers.is_match("hello world"));
        assert!(!matchers.is_match("clean song"));
    }

    #[test]
    fn test_english_terms_are_word_bounded() {
        let matchers = build_legacy_matchers(&[]).unwrap();
        // "class" must not trip the embedded "ass"-free list; "dick" inside
        // another word must not match either.
        assert!(!matchers.is_match("riddickulous"));
        assert!(matchers.is_match("what a DICK move"));
    }

    #[test]
    fn test_custom_terms_merge_and_dedupe() {
        let matchers = build_legacy_matchers(&[
            ProfanityTerm {
                term: "금지어".into(),
                language: None,
            },
            ProfanityTerm {
                term: "FUCK".into(),
                language: Some("EN".into()),
            },
        ])
        .unwrap();
        assert!(matchers.is_match("여기 금지어 있음"));
        assert!(matchers.is_match("fuck"));
    }

    #[test]
    fn test_extract_unique_words() {
        let matchers = build_legacy_matchers(&[]).unwrap();
        let words = extract_profanity_words("fuck FUCK 씨발 fuck", &matchers);
        assert_eq!(words, vec!["fuck".to_string(), "씨발".to_string()]);
    }
}
