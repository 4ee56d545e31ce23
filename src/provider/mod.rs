//! Suggestion providers: independent sources of correction suggestions with
//! a uniform, infallible `check` contract. Internal errors degrade to
//! warnings; the orchestrator treats certain warnings as failures.

pub mod external;

use crate::normalize::normalize_text;
use crate::pipeline::diff::{diff_text, DiffKind};
use crate::rules::hybrid::{run_hybrid, HybridOptions};
use crate::rules::terms::CustomTermSource;
use crate::rules::{classify_by_reason, RuleEntry};
use crate::{Domain, Mode, SuggestionType};
use async_trait::async_trait;
use std::sync::Arc;

/// A provider-produced suggestion before conflict resolution. Offsets are
/// byte offsets into the working text.
#[derive(Debug, Clone)]
pub struct RawSuggestion {
    pub start: usize,
    pub end: usize,
    pub before: String,
    pub after: String,
    pub reason: String,
    pub confidence: f64,
    pub kind: SuggestionType,
    pub source: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProviderResult {
    pub suggestions: Vec<RawSuggestion>,
    pub confidence: f64,
    pub warnings: Vec<String>,
}

impl ProviderResult {
    pub fn degraded(warning: &str) -> Self {
        Self {
            suggestions: Vec::new(),
            confidence: 0.0,
            warnings: vec![warning.to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProviderContext {
    pub mode: Mode,
    pub domain: Domain,
}

/// An independent source of correction suggestions. `check` must not fail;
/// errors become warnings in the result.
#[async_trait]
pub trait SpellcheckProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn check(&self, text: &str, ctx: &ProviderContext) -> ProviderResult;
}

/// Collect suggestions from a rule table: every match of every rule, each
/// replaced once, skipping empty and identity rewrites.
pub fn collect_rule_suggestions(
    text: &str,
    rules: &[RuleEntry],
    source: &str,
) -> Vec<RawSuggestion> {
    let mut suggestions = Vec::new();
    for rule in rules {
        for m in rule.pattern.find_iter(text) {
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
            suggestions.push(RawSuggestion {
                start: m.start(),
                end: m.end(),
                before: m.as_str().to_string(),
                after,
                reason: rule.reason.clone(),
                confidence: rule.confidence.clamp(0.0, 1.0),
                kind: rule.kind.unwrap_or_else(|| classify_by_reason(&rule.reason)),
                source: source.to_string(),
            });
        }
    }
    suggestions
}

/// Wraps a static rule table as a provider.
pub struct RuleProvider {
    name: String,
    rules: &'static [RuleEntry],
}

impl RuleProvider {
    pub fn new(name: &str, rules: &'static [RuleEntry]) -> Self {
        Self {
            name: name.to_string(),
            rules,
        }
    }
}

#[async_trait]
impl SpellcheckProvider for RuleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self, text: &str, _ctx: &ProviderContext) -> ProviderResult {
        ProviderResult {
            suggestions: collect_rule_suggestions(text, self.rules, &self.name),
            confidence: 0.8,
            warnings: Vec::new(),
        }
    }
}

/// Curated custom terms from the remote source; the rule set refreshes on
/// the source's TTL.
pub struct CustomTermProvider {
    source: Arc<CustomTermSource>,
}

impl CustomTermProvider {
    pub fn new(source: Arc<CustomTermSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl SpellcheckProvider for CustomTermProvider {
    fn name(&self) -> &str {
        "custom_rules"
    }

    async fn check(&self, text: &str, _ctx: &ProviderContext) -> ProviderResult {
        let rules = self.source.rules().await;
        ProviderResult {
            suggestions: collect_rule_suggestions(text, &rules, "custom_rules"),
            confidence: 0.9,
            warnings: Vec::new(),
        }
    }
}

/// Exposes presentation normalization itself as a suggestion source by
/// diffing the raw text against its normalized form.
pub struct NormalizationProvider;

#[async_trait]
impl SpellcheckProvider for NormalizationProvider {
    fn name(&self) -> &str {
        "normalize"
    }

    async fn check(&self, text: &str, _ctx: &ProviderContext) -> ProviderResult {
        let normalized = normalize_text(text).normalized;
        if normalized == text {
            return ProviderResult {
                suggestions: Vec::new(),
                confidence: 0.4,
                warnings: Vec::new(),
            };
        }

        let char_offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        let byte_at = |char_index: usize| {
            char_offsets
                .get(char_index)
                .copied()
                .unwrap_or_else(|| text.len())
        };

        let suggestions = diff_text(text, &normalized)
            .into_iter()
            .filter(|d| d.op != DiffKind::Equal && !d.a.is_empty())
            .map(|d| {
                let reason = match d.op {
                    DiffKind::Delete => "공백/특수문자 정리",
                    DiffKind::Insert => "문장부호/공백 보정",
                    _ => "정규화",
                };
                let combined = format!("{}{}", d.a, d.b);
                let kind = if combined.chars().any(char::is_whitespace) {
                    SuggestionType::Spacing
                } else if combined.chars().any(|c| {
                    matches!(
                        c,
                        '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}' | '"' | '\'' | '.' | '!'
                            | '?' | '\u{2026}' | '-'
                    )
                }) {
                    SuggestionType::Punctuation
                } else {
                    SuggestionType::Style
                };
                let start = byte_at(d.index_a);
                RawSuggestion {
                    start,
                    end: start + d.a.len(),
                    before: d.a,
                    after: d.b,
                    reason: reason.to_string(),
                    confidence: 0.8,
                    kind,
                    source: "normalize".to_string(),
                }
            })
            .collect();

        ProviderResult {
            suggestions,
            confidence: 0.8,
            warnings: vec!["normalized".to_string()],
        }
    }
}

/// Iterative rule engine wrapped as a provider.
pub struct HybridProvider;

#[async_trait]
impl SpellcheckProvider for HybridProvider {
    fn name(&self) -> &str {
        "hybrid_rules"
    }

    async fn check(&self, text: &str, _ctx: &ProviderContext) -> ProviderResult {
        let options = HybridOptions {
            max_iterations: 4,
            ..Default::default()
        };
        let outcome = run_hybrid(text, &options);
        let suggestions = outcome
            .changes
            .into_iter()
            .map(|change| {
                let base_reason = change
                    .rule
                    .split('#')
                    .next()
                    .unwrap_or(&change.rule)
                    .to_string();
                let kind = if base_reason.starts_with("space_") || base_reason.starts_with("particle_")
                {
                    SuggestionType::Spacing
                } else if base_reason.starts_with("punc_") {
                    SuggestionType::Punctuation
                } else {
                    SuggestionType::Orthography
                };
                RawSuggestion {
                    start: change.start,
                    end: change.end,
                    before: change.before,
                    after: change.after,
                    reason: base_reason,
                    confidence: change.confidence.clamp(0.0, 1.0),
                    kind,
                    source: "hybrid_rules".to_string(),
                }
            })
            .collect();
        ProviderResult {
            suggestions,
            confidence: 0.75,
            warnings: Vec::new(),
        }
    }
}

/// Capability-probed morphological analyzer. The probe runs once at
/// construction; analysis itself is not wired up yet, so a present analyzer
/// still yields zero suggestions with an explicit warning.
pub struct MorphologyProvider {
    analyzer: Option<String>,
}

impl MorphologyProvider {
    pub fn probe() -> Self {
        Self {
            analyzer: find_analyzer(),
        }
    }
}

fn find_analyzer() -> Option<String> {
    if let Ok(cmd) = std::env::var("MORPHOLOGY_CMD") {
        let cmd = cmd.trim().to_string();
        if !cmd.is_empty() {
            return Some(cmd);
        }
    }
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        if dir.join("mecab").is_file() {
            return Some("mecab".to_string());
        }
    }
    None
}

#[async_trait]
impl SpellcheckProvider for MorphologyProvider {
    fn name(&self) -> &str {
        "morphology"
    }

    async fn check(&self, _text: &str, _ctx: &ProviderContext) -> ProviderResult {
        match &self.analyzer {
            None => ProviderResult::degraded("morphology_unavailable"),
            Some(_) => ProviderResult::degraded("morphology_not_implemented"),
        }
    }
}
