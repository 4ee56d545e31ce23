//! The request pipeline: truncation, caching with in-flight collapsing,
//! concurrent provider fan-out under a timeout and per-provider circuit
//! breaker, conflict resolution, application, and edit-script generation.
//!
//! The top-level call always returns a well-formed response: provider
//! failures degrade to warnings and an empty contribution, never errors.

pub mod breaker;
pub mod cache;
pub mod diff;
pub mod protect;
pub mod resolve;

use crate::normalize::normalize_text;
use crate::provider::{ProviderContext, ProviderResult, RawSuggestion, SpellcheckProvider};
use crate::rules::basic::MAX_TEXT_LENGTH;
use crate::{Domain, Mode, Suggestion, SuggestionType};
use breaker::{CircuitBreaker, Clock, SystemClock};
use cache::{cache_key, ResponseCache};
use dashmap::DashMap;
use diff::{diff_text, DiffOp};
use protect::{ProtectedSpan, ProtectedSpanBuilder};
use resolve::{PriorityResolution, Resolution};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Default)]
pub struct CheckRequest {
    pub text: String,
    pub mode: Option<Mode>,
    pub domain: Option<Domain>,
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMeta {
    pub name: String,
    pub ok: bool,
    pub ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub mode: Mode,
    pub providers: Vec<ProviderMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_if_empty: Option<String>,
    pub trace_id: String,
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub original_text: String,
    pub normalized_text: String,
    pub corrected_text: String,
    pub suggestions: Vec<Suggestion>,
    pub diffs: Vec<DiffOp>,
    pub meta: ResponseMeta,
}

impl CheckResponse {
    #[cfg(test)]
    pub(crate) fn empty_for(text: &str, mode: Mode, trace_id: String) -> Self {
        Self {
            original_text: text.to_string(),
            normalized_text: text.to_string(),
            corrected_text: text.to_string(),
            suggestions: Vec::new(),
            diffs: Vec::new(),
            meta: ResponseMeta {
                mode,
                providers: Vec::new(),
                reason_if_empty: None,
                trace_id,
                truncated: false,
            },
        }
    }
}

/// Tunables with the production defaults; tests shrink the durations.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub provider_timeout: Duration,
    pub cache_ttl: Duration,
    pub circuit_threshold: u32,
    pub circuit_cooldown: Duration,
    pub max_text_chars: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_millis(2500),
            cache_ttl: Duration::from_secs(5 * 60),
            circuit_threshold: 3,
            circuit_cooldown: Duration::from_secs(30),
            max_text_chars: MAX_TEXT_LENGTH,
        }
    }
}

struct ProviderRun {
    ok: bool,
    ms: u64,
    warnings: Vec<String>,
    result: ProviderResult,
}

pub struct SpellcheckEngine {
    providers: Vec<Arc<dyn SpellcheckProvider>>,
    priorities: HashMap<String, usize>,
    cache: ResponseCache,
    inflight: DashMap<String, Arc<OnceCell<CheckResponse>>>,
    breaker: CircuitBreaker,
    protect: ProtectedSpanBuilder,
    options: EngineOptions,
}

impl SpellcheckEngine {
    /// The standard provider set in registration order; registration order
    /// doubles as resolver priority.
    pub fn from_config(config: &crate::Config) -> Self {
        use crate::provider::external::ExternalProvider;
        use crate::provider::{
            CustomTermProvider, HybridProvider, MorphologyProvider, NormalizationProvider,
            RuleProvider,
        };
        use crate::rules::terms::CustomTermSource;
        use crate::rules::{foreign, korean, lexicon, style};

        let local_rules: &'static [crate::rules::RuleEntry] = &korean::ALL_RULES;
        let dictionary_rules: &'static [crate::rules::RuleEntry] = &lexicon::DICTIONARY_RULES;
        let foreign_rules: &'static [crate::rules::RuleEntry] = &foreign::FOREIGN_RULES;
        let style_rules: &'static [crate::rules::RuleEntry] = &style::STYLE_RULES;

        let providers: Vec<Arc<dyn SpellcheckProvider>> = vec![
            Arc::new(ExternalProvider::new(
                config.service_url.clone(),
                config.shared_secret.clone(),
            )),
            Arc::new(NormalizationProvider),
            Arc::new(RuleProvider::new("dictionary_rules", dictionary_rules)),
            Arc::new(CustomTermProvider::new(Arc::new(CustomTermSource::new(
                config.terms_url.clone(),
            )))),
            Arc::new(RuleProvider::new("local_rules", local_rules)),
            Arc::new(HybridProvider),
            Arc::new(RuleProvider::new("foreign_rules", foreign_rules)),
            Arc::new(RuleProvider::new("style_rules", style_rules)),
            Arc::new(MorphologyProvider::probe()),
        ];

        Self::with_providers(
            providers,
            EngineOptions::default(),
            Arc::new(SystemClock),
            &config.protected_terms,
        )
    }

    pub fn with_providers(
        providers: Vec<Arc<dyn SpellcheckProvider>>,
        options: EngineOptions,
        clock: Arc<dyn Clock>,
        extra_protected_terms: &[String],
    ) -> Self {
        let priorities = providers
            .iter()
            .enumerate()
            .map(|(index, provider)| (provider.name().to_string(), index))
            .collect();
        Self {
            priorities,
            cache: ResponseCache::new(options.cache_ttl, Arc::clone(&clock)),
            inflight: DashMap::new(),
            breaker: CircuitBreaker::new(
                options.circuit_threshold,
                options.circuit_cooldown,
                clock,
            ),
            protect: ProtectedSpanBuilder::new(extra_protected_terms),
            providers,
            options,
        }
    }

    /// Run the full pipeline. Identical concurrent requests collapse into a
    /// single computation; completed responses are cached for the TTL.
    pub async fn check(&self, request: CheckRequest) -> CheckResponse {
        let mode = request.mode.unwrap_or_default();
        let domain = request.domain.unwrap_or_default();
        let trace_id = request
            .trace_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let (working, truncated) = truncate_graphemes(&request.text, self.options.max_text_chars);
        let key = cache_key(&working, mode, domain);

        if let Some(cached) = self.cache.get(&key) {
            log::debug!("[{}] cache hit for {}", trace_id, key);
            return cached;
        }

        let cell = {
            let entry = self
                .inflight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()));
            Arc::clone(entry.value())
        };

        let response = cell
            .get_or_init(|| self.run_pipeline(&working, mode, domain, &trace_id, truncated, &key))
            .await
            .clone();
        // Entry removal is idempotent across collapsed waiters; a cancelled
        // initiator leaves an uninitialized cell the next arrival reuses.
        self.inflight.remove(&key);
        response
    }

    async fn run_pipeline(
        &self,
        working: &str,
        mode: Mode,
        domain: Domain,
        trace_id: &str,
        truncated: bool,
        cache_key: &str,
    ) -> CheckResponse {
        let normalize_stats = normalize_text(working);
        let protected_spans = self.protect.build(working, domain);
        let threshold = mode.threshold();

        log::info!(
            "[{}] spellcheck start: len={} normalized_len={} mode={} domain={} truncated={}",
            trace_id,
            working.chars().count(),
            normalize_stats.normalized.chars().count(),
            mode,
            domain,
            truncated,
        );
        log::debug!(
            "[{}] normalize: zero_width={} quotes={} dashes={} ellipsis={} spaces={}",
            trace_id,
            normalize_stats.removed_zero_width,
            normalize_stats.replaced_quotes,
            normalize_stats.replaced_dashes,
            normalize_stats.replaced_ellipsis,
            normalize_stats.collapsed_spaces,
        );

        let ctx = ProviderContext { mode, domain };
        let runs = futures::future::join_all(
            self.providers
                .iter()
                .map(|provider| self.run_provider(provider.as_ref(), working, &ctx)),
        )
        .await;

        let provider_meta: Vec<ProviderMeta> = self
            .providers
            .iter()
            .zip(&runs)
            .map(|(provider, run)| ProviderMeta {
                name: provider.name().to_string(),
                ok: run.ok,
                ms: run.ms,
                warnings: if run.warnings.is_empty() {
                    None
                } else {
                    Some(run.warnings.clone())
                },
            })
            .collect();
        log::info!("[{}] providers: {:?}", trace_id, provider_meta);

        let mut raw: Vec<RawSuggestion> = Vec::new();
        for run in runs {
            raw.extend(run.result.suggestions);
        }

        let total = raw.len();
        let mut filtered_invalid = 0usize;
        let mut filtered_threshold = 0usize;
        let mut filtered_protected = 0usize;

        raw.retain(|s| {
            if s.end < s.start || (s.before.is_empty() && s.after.is_empty()) {
                filtered_invalid += 1;
                return false;
            }
            if s.confidence < threshold {
                filtered_threshold += 1;
                return false;
            }
            if overlaps_protected(s, &protected_spans) {
                filtered_protected += 1;
                return false;
            }
            true
        });

        let resolver = PriorityResolution::new(self.priorities.clone());
        let resolved = resolver.resolve(raw);
        let suggestions: Vec<Suggestion> = resolved
            .into_iter()
            .enumerate()
            .map(|(index, r)| to_final_suggestion(r.suggestion, index))
            .collect();

        let (corrected, skipped) = apply_suggestions(working, &suggestions);

        let reason_if_empty = if suggestions.is_empty() {
            Some(if provider_meta.iter().all(|p| !p.ok) {
                "all_providers_failed"
            } else if filtered_threshold > 0 {
                "filtered_by_confidence"
            } else if filtered_protected > 0 {
                "filtered_by_protected_terms"
            } else if total == 0 {
                "no_matches"
            } else {
                "filtered_or_invalid"
            })
            .map(str::to_string)
        } else {
            None
        };

        if suggestions.is_empty() || skipped > 0 {
            log::info!(
                "[{}] empty or skipped: total={} threshold={} protected={} invalid={} skipped={} reason={:?}",
                trace_id,
                total,
                filtered_threshold,
                filtered_protected,
                filtered_invalid,
                skipped,
                reason_if_empty,
            );
        }

        let diffs = diff_text(working, &corrected);

        let response = CheckResponse {
            original_text: working.to_string(),
            normalized_text: normalize_stats.normalized,
            corrected_text: corrected,
            suggestions,
            diffs,
            meta: ResponseMeta {
                mode,
                providers: provider_meta,
                reason_if_empty,
                trace_id: trace_id.to_string(),
                truncated,
            },
        };

        self.cache.put(cache_key.to_string(), response.clone());
        response
    }

    /// One provider call: skipped outright while its circuit is open, raced
    /// against the timeout otherwise. Failures feed the breaker.
    async fn run_provider(
        &self,
        provider: &dyn SpellcheckProvider,
        text: &str,
        ctx: &ProviderContext,
    ) -> ProviderRun {
        let name = provider.name();
        if self.breaker.is_open(name) {
            return ProviderRun {
                ok: false,
                ms: 0,
                warnings: vec!["circuit_open".to_string()],
                result: ProviderResult::degraded("circuit_open"),
            };
        }

        let started = Instant::now();
        let result = match tokio::time::timeout(
            self.options.provider_timeout,
            provider.check(text, ctx),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => ProviderResult::degraded("timeout"),
        };
        let ms = started.elapsed().as_millis() as u64;

        let warnings = result.warnings.clone();
        let ok = !warnings.iter().any(|w| {
            matches!(w.as_str(), "timeout" | "service_error" | "circuit_open")
        });

        if ok {
            self.breaker.record_success(name);
        } else {
            self.breaker.record_failure(name);
        }

        ProviderRun {
            ok,
            ms,
            warnings,
            result,
        }
    }
}

fn to_final_suggestion(raw: RawSuggestion, index: usize) -> Suggestion {
    Suggestion {
        id: format!("{}-{}", raw.source, index),
        start: raw.start,
        end: raw.end,
        original: raw.before,
        replacement: raw.after,
        kind: raw.kind,
        confidence: raw.confidence,
        message: raw.reason,
        source: raw.source,
    }
}

fn overlaps_protected(s: &RawSuggestion, spans: &[ProtectedSpan]) -> bool {
    if spans.is_empty() {
        return false;
    }
    if matches!(s.kind, SuggestionType::Spacing | SuggestionType::Punctuation) {
        return false;
    }
    spans
        .iter()
        .any(|span| s.start < span.end && span.start < s.end)
}

/// Truncate to at most `max_chars` characters without splitting a grapheme
/// cluster.
fn truncate_graphemes(text: &str, max_chars: usize) -> (String, bool) {
    if text.chars().count() <= max_chars {
        return (text.to_string(), false);
    }
    let mut chars_seen = 0usize;
    let mut cut = 0usize;
    for (offset, grapheme) in text.grapheme_indices(true) {
        let grapheme_chars = grapheme.chars().count();
        if chars_seen + grapheme_chars > max_chars {
            cut = offset;
            break;
        }
        chars_seen += grapheme_chars;
        cut = offset + grapheme.len();
    }
    (text[..cut].to_string(), true)
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

/// Apply accepted suggestions right-to-left so earlier offsets stay valid.
/// A suggestion whose recorded span no longer matches (an earlier rewrite
/// shifted it) falls back to a nearby literal search; if that fails too it
/// is skipped. Returns the corrected text and the skip count.
fn apply_suggestions(text: &str, suggestions: &[Suggestion]) -> (String, usize) {
    if suggestions.is_empty() {
        return (text.to_string(), 0);
    }

    let mut sorted: Vec<&Suggestion> = suggestions.iter().collect();
    sorted.sort_by(|a, b| b.start.cmp(&a.start));

    let mut output = text.to_string();
    let mut skipped = 0usize;

    for s in sorted {
        let before = s.original.as_str();
        let after = s.replacement.as_str();
        if before.is_empty() && after.is_empty() {
            skipped += 1;
            continue;
        }

        let start = floor_char_boundary(&output, s.start.min(output.len()));
        if before.is_empty() {
            output.replace_range(start..start, after);
            continue;
        }

        let end = floor_char_boundary(&output, s.end.max(start).min(output.len()));
        if output.is_char_boundary(start) && output.is_char_boundary(end) && output[start..end] == *before {
            output.replace_range(start..end, after);
            continue;
        }

        let search_from = floor_char_boundary(&output, start.saturating_sub(12));
        if let Some(found) = output[search_from..].find(before) {
            let at = search_from + found;
            output.replace_range(at..at + before.len(), after);
            continue;
        }

        skipped += 1;
    }

    (output, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(start: usize, end: usize, original: &str, replacement: &str) -> Suggestion {
        Suggestion {
            id: format!("test-{}", start),
            start,
            end,
            original: original.to_string(),
            replacement: replacement.to_string(),
            kind: SuggestionType::Orthography,
            confidence: 0.9,
            message: "test".to_string(),
            source: "test".to_string(),
        }
    }

    #[test]
    fn test_apply_suggestions_in_place() {
        let text = "나는 가방에 드러갓어.";
        let start = text.find("드러갓").unwrap();
        let (corrected, skipped) =
            apply_suggestions(text, &[suggestion(start, start + 9, "드러갓", "들어갔")]);
        assert_eq!(corrected, "나는 가방에 들어갔어.");
        assert_eq!(skipped, 0);
    }

    #[test]
    fn test_apply_multiple_right_to_left() {
        let text = "할수 있는거 였다";
        let first = text.find("할수").unwrap();
        let second = text.find("있는거").unwrap();
        let (corrected, skipped) = apply_suggestions(
            text,
            &[
                suggestion(first, first + 6, "할수", "할 수"),
                suggestion(second, second + 9, "있는거", "있는 거"),
            ],
        );
        assert_eq!(corrected, "할 수 있는 거 였다");
        assert_eq!(skipped, 0);
    }

    #[test]
    fn test_apply_falls_back_to_nearby_search() {
        let text = "앞부분 드러갓 뒷부분";
        let actual = text.find("드러갓").unwrap();
        // Span recorded a few bytes early; the literal is still found.
        let (corrected, skipped) = apply_suggestions(
            text,
            &[suggestion(actual.saturating_sub(3), actual + 6, "드러갓", "들어갔")],
        );
        assert_eq!(corrected, "앞부분 들어갔 뒷부분");
        assert_eq!(skipped, 0);
    }

    #[test]
    fn test_apply_skips_unmatchable() {
        let (corrected, skipped) =
            apply_suggestions("짧은 텍스트", &[suggestion(0, 6, "없는말", "교정")]);
        assert_eq!(corrected, "짧은 텍스트");
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_truncate_graphemes() {
        let (text, truncated) = truncate_graphemes("가나다라마", 3);
        assert!(truncated);
        assert_eq!(text, "가나다");
        let (text, truncated) = truncate_graphemes("가나", 3);
        assert!(!truncated);
        assert_eq!(text, "가나");
    }
}
