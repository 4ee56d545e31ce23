//! Severity-scored profanity detection with allow-list exclusion.
//!
//! Independent of the suggestion pipeline: a pure synchronous function over
//! the evasion-normalized text. Rules and the allow-list are data — embedded
//! JSON by default, caller-supplied at runtime — never source code.

pub mod legacy;

use crate::normalize::evasion;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

const RULES_JSON: &str = include_str!("../../data/profanity_rules.json");
const ALLOWLIST_JSON: &str = include_str!("../../data/profanity_allowlist.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Block,
    Mask,
    Warn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfanityAction {
    Allow,
    Warn,
    Mask,
    Block,
}

impl fmt::Display for ProfanityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfanityAction::Allow => write!(f, "allow"),
            ProfanityAction::Warn => write!(f, "warn"),
            ProfanityAction::Mask => write!(f, "mask"),
            ProfanityAction::Block => write!(f, "block"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfanityRule {
    pub id: String,
    pub severity: Severity,
    pub pattern: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lang: Option<String>,
    pub score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowlistEntry {
    pub id: String,
    pub pattern: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub warn: u32,
    pub mask: u32,
    pub block: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warn: 1,
            mask: 4,
            block: 7,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EvaluateOptions {
    /// Full replacement for the built-in rule set.
    pub rules: Option<Vec<ProfanityRule>>,
    /// Full replacement for the built-in allow-list.
    pub allowlist: Option<Vec<AllowlistEntry>>,
    /// Appended to the built-in rules (ignored when `rules` replaces them).
    pub extra_rules: Vec<ProfanityRule>,
    pub thresholds: Option<Thresholds>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfanityEvaluation {
    pub action: ProfanityAction,
    pub score: u32,
    pub matched_rule_ids: Vec<String>,
}

impl ProfanityEvaluation {
    fn allow() -> Self {
        Self {
            action: ProfanityAction::Allow,
            score: 0,
            matched_rule_ids: Vec::new(),
        }
    }
}

struct CompiledRule {
    id: String,
    severity: Severity,
    score: u32,
    regex: Regex,
}

struct CompiledAllow {
    regex: Regex,
}

fn compile_pattern(pattern: &str, id: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            log::error!("invalid profanity pattern for {}: {}", id, err);
            None
        }
    }
}

fn compile_rules(rules: &[ProfanityRule]) -> Vec<CompiledRule> {
    rules
        .iter()
        .filter_map(|rule| {
            Some(CompiledRule {
                id: rule.id.clone(),
                severity: rule.severity,
                score: rule.score,
                regex: compile_pattern(&rule.pattern, &rule.id)?,
            })
        })
        .collect()
}

fn compile_allowlist(entries: &[AllowlistEntry]) -> Vec<CompiledAllow> {
    entries
        .iter()
        .filter_map(|entry| {
            Some(CompiledAllow {
                regex: compile_pattern(&entry.pattern, &entry.id)?,
            })
        })
        .collect()
}

lazy_static! {
    static ref DEFAULT_RULES: Vec<CompiledRule> = {
        let rules: Vec<ProfanityRule> = serde_json::from_str(RULES_JSON).unwrap_or_else(|err| {
            log::error!("embedded profanity rules are not valid JSON: {}", err);
            Vec::new()
        });
        compile_rules(&rules)
    };
    static ref DEFAULT_ALLOWLIST: Vec<CompiledAllow> = {
        let entries: Vec<AllowlistEntry> =
            serde_json::from_str(ALLOWLIST_JSON).unwrap_or_else(|err| {
                log::error!("embedded profanity allowlist is not valid JSON: {}", err);
                Vec::new()
            });
        compile_allowlist(&entries)
    };
    static ref UPPER_RUN: Regex = Regex::new(r"[A-Z]{4,}").unwrap();
    static ref SHOUTING: Regex = Regex::new(r"[!?]{3,}").unwrap();
    static ref HANDLE: Regex = Regex::new(r"@[\w-]{2,}").unwrap();
}

#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
}

fn collect_allow_spans(text: &str, entries: &[CompiledAllow]) -> Vec<Span> {
    let mut spans = Vec::new();
    for entry in entries {
        for m in entry.regex.find_iter(text) {
            if m.as_str().is_empty() {
                continue;
            }
            spans.push(Span {
                start: m.start(),
                end: m.end(),
            });
        }
    }
    spans
}

fn inside_allow_span(start: usize, end: usize, spans: &[Span]) -> bool {
    spans
        .iter()
        .any(|span| start >= span.start && end <= span.end)
}

/// Evaluate text against the profanity rules. No match always yields
/// `allow` with score 0; heuristic bonuses never create a match by
/// themselves.
pub fn evaluate(text: &str, options: &EvaluateOptions) -> ProfanityEvaluation {
    let normalized = evasion::normalize(text);
    if normalized.is_empty() {
        return ProfanityEvaluation::allow();
    }

    let thresholds = options.thresholds.unwrap_or_default();

    let override_rules = options.rules.as_deref().map(compile_rules);
    let extra_rules = if override_rules.is_none() && !options.extra_rules.is_empty() {
        compile_rules(&options.extra_rules)
    } else {
        Vec::new()
    };
    let rules: Vec<&CompiledRule> = match &override_rules {
        Some(compiled) => compiled.iter().collect(),
        None => DEFAULT_RULES.iter().chain(extra_rules.iter()).collect(),
    };

    let override_allow = options.allowlist.as_deref().map(compile_allowlist);
    let allowlist: &[CompiledAllow] = match &override_allow {
        Some(compiled) => compiled,
        None => DEFAULT_ALLOWLIST.as_slice(),
    };

    let allow_spans = if allowlist.is_empty() {
        Vec::new()
    } else {
        collect_allow_spans(&normalized, allowlist)
    };

    let mut matched_rule_ids: Vec<String> = Vec::new();
    let mut match_counts: HashMap<String, u32> = HashMap::new();
    let mut score = 0u32;
    let mut has_warn = false;
    let mut has_mask = false;
    let mut has_block = false;

    for rule in rules {
        for m in rule.regex.find_iter(&normalized) {
            if m.as_str().is_empty() {
                continue;
            }
            if inside_allow_span(m.start(), m.end(), &allow_spans) {
                continue;
            }
            if !match_counts.contains_key(&rule.id) {
                matched_rule_ids.push(rule.id.clone());
            }
            *match_counts.entry(rule.id.clone()).or_insert(0) += 1;

            match rule.severity {
                Severity::Block => has_block = true,
                Severity::Mask => has_mask = true,
                Severity::Warn => has_warn = true,
            }
            score += rule.score;
        }
    }

    // Spamming the same rule adds a mild bonus without over-penalizing a
    // single use.
    for count in match_counts.values() {
        if *count > 1 {
            score += count - 1;
        }
    }

    if !matched_rule_ids.is_empty() {
        if UPPER_RUN.is_match(text) {
            score += 1;
        }
        if SHOUTING.is_match(text) {
            score += 1;
        }
        if HANDLE.is_match(text) {
            score += 1;
        }
    }

    let mut action = if has_block {
        ProfanityAction::Block
    } else if has_mask {
        ProfanityAction::Mask
    } else if has_warn || !matched_rule_ids.is_empty() {
        ProfanityAction::Warn
    } else {
        ProfanityAction::Allow
    };

    if action != ProfanityAction::Block && score >= thresholds.block {
        action = ProfanityAction::Block;
    } else if action == ProfanityAction::Warn && score >= thresholds.mask {
        action = ProfanityAction::Mask;
    }

    if action == ProfanityAction::Allow {
        return ProfanityEvaluation::allow();
    }

    ProfanityEvaluation {
        action,
        score,
        matched_rule_ids,
    }
}

/// Combine a legacy term-list verdict with the scored engine behind an
/// enable flag, so call sites can roll the engine out gradually.
#[derive(Debug, Clone)]
pub struct ProfanityCheckOutcome {
    pub has_profanity: bool,
    pub v1_has_profanity: bool,
    pub v2_result: Option<ProfanityEvaluation>,
}

pub fn run_profanity_check(
    text: &str,
    v1_has_profanity: bool,
    enable_v2: bool,
    options: &EvaluateOptions,
) -> ProfanityCheckOutcome {
    if !enable_v2 {
        return ProfanityCheckOutcome {
            has_profanity: v1_has_profanity,
            v1_has_profanity,
            v2_result: None,
        };
    }

    let v2_result = evaluate(text, options);
    let has_profanity = v1_has_profanity || v2_result.action != ProfanityAction::Allow;
    ProfanityCheckOutcome {
        has_profanity,
        v1_has_profanity,
        v2_result: Some(v2_result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(text: &str) -> ProfanityEvaluation {
        evaluate(text, &EvaluateOptions::default())
    }

    #[test]
    fn test_allowlist_suppresses_legitimate_substrings() {
        assert_eq!(eval("시발점부터 다시 시작합니다").action, ProfanityAction::Allow);
        assert_eq!(eval("새끼손가락을 다쳤어요").action, ProfanityAction::Allow);
        assert_eq!(eval("새끼 고양이가 태어났다").action, ProfanityAction::Allow);
    }

    #[test]
    fn test_clean_text_allows_with_zero_score() {
        let result = eval("오늘 공연 정말 좋았어요!!!");
        assert_eq!(result.action, ProfanityAction::Allow);
        assert_eq!(result.score, 0);
        assert!(result.matched_rule_ids.is_empty());
    }

    #[test]
    fn test_evasion_corpus_is_detected() {
        let evasions = [
            "씨발",
            "시발",
            "ㅆㅣㅂㅏㄹ",
            "ㅅ ㅣ ㅂ ㅏ ㄹ",
            "ㅅ.ㅣ*ㅂ-ㅏ/ㄹ",
            "ㅅㅂ",
            "ㅅ ㅂ",
            "ㅆ ㅂ",
            "병신",
            "ㅂ ㅕ ㅇ ㅅ ㅣ ㄴ",
            "지랄",
            "ㅈ ㅣ ㄹ ㅏ ㄹ",
            "개새끼",
            "개 새 끼",
            "새끼",
            "존나",
            "존ㄴㅏ",
            "좆",
            "ㅈ ㅗ ㅈ",
            "fuck",
            "f u c k",
            "fuuuuuck",
            "f*uck",
            "f.u.c.k",
            "sh1t",
            "s h i t",
            "s#h!t",
            "b1tch",
            "b i t c h",
            "damn",
            "d a m n",
        ];
        for input in evasions {
            let result = eval(input);
            assert_ne!(result.action, ProfanityAction::Allow, "expected match for {:?}", input);
        }
    }

    #[test]
    fn test_stretched_profanity_with_shouting() {
        let result = eval("fuuuuuck!!!");
        assert_ne!(result.action, ProfanityAction::Allow);
        assert!(result.matched_rule_ids.iter().any(|id| id == "en_fuck"));
    }

    #[test]
    fn test_repeat_bonus_accumulates() {
        let single = eval("존나");
        let triple = eval("존나 존나 존나");
        assert!(triple.score > single.score);
    }

    #[test]
    fn test_warn_escalates_through_thresholds() {
        // damn alone is a warn; repeated plus shouting pushes the score over
        // the mask threshold.
        let single = eval("damn");
        assert_eq!(single.action, ProfanityAction::Warn);
        let repeated = eval("damn damn damn DAMN!!!");
        assert!(repeated.score >= Thresholds::default().mask);
        assert_ne!(repeated.action, ProfanityAction::Warn);
    }

    #[test]
    fn test_heuristics_never_create_matches() {
        let result = eval("HELLO WORLD!!! @someone");
        assert_eq!(result.action, ProfanityAction::Allow);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_custom_thresholds() {
        let options = EvaluateOptions {
            thresholds: Some(Thresholds {
                warn: 1,
                mask: 2,
                block: 3,
            }),
            ..Default::default()
        };
        let result = evaluate("존나 존나", &options);
        assert_eq!(result.action, ProfanityAction::Block);
    }

    #[test]
    fn test_extra_rules_extend_defaults() {
        let options = EvaluateOptions {
            extra_rules: vec![ProfanityRule {
                id: "custom_term".into(),
                severity: Severity::Mask,
                pattern: "금지어".into(),
                description: String::new(),
                lang: Some("ko".into()),
                score: 3,
            }],
            ..Default::default()
        };
        let result = evaluate("이 금지어 좀 보세요", &options);
        assert_eq!(result.action, ProfanityAction::Mask);
        assert_eq!(result.matched_rule_ids, vec!["custom_term".to_string()]);
    }

    #[test]
    fn test_rule_override_replaces_defaults() {
        let options = EvaluateOptions {
            rules: Some(vec![ProfanityRule {
                id: "only_rule".into(),
                severity: Severity::Warn,
                pattern: "해당없음".into(),
                description: String::new(),
                lang: Some("ko".into()),
                score: 1,
            }]),
            ..Default::default()
        };
        assert_eq!(evaluate("씨발", &options).action, ProfanityAction::Allow);
    }

    #[test]
    fn test_run_profanity_check_combines_verdicts() {
        let outcome = run_profanity_check("clean text", true, false, &EvaluateOptions::default());
        assert!(outcome.has_profanity);
        assert!(outcome.v2_result.is_none());

        let outcome = run_profanity_check("씨발", false, true, &EvaluateOptions::default());
        assert!(outcome.has_profanity);
        assert_eq!(outcome.v2_result.unwrap().action, ProfanityAction::Block);

        let outcome = run_profanity_check("clean text", false, true, &EvaluateOptions::default());
        assert!(!outcome.has_profanity);
    }
}
