//! Overlap resolution for raw suggestions. Two deliberately separate
//! policies live behind one interface:
//!
//! * [`PriorityResolution`] — the pipeline's policy: provider priority wins
//!   over confidence unless the challenger is decisively more confident.
//! * [`GroupingResolution`] — the looser harness policy: containment,
//!   cross-category tie grouping, and a minimum-length floor.
//!
//! They are exercised by different call sites and are not to be unified
//! silently.

use crate::provider::RawSuggestion;
use crate::SuggestionType;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Hard cap on the resolved suggestion list.
pub const MAX_SUGGESTIONS: usize = 600;

/// A resolved suggestion; `group_id` is only ever set by the grouping
/// strategy, for competing suggestions kept together instead of discarded.
#[derive(Debug, Clone)]
pub struct ResolvedSuggestion {
    pub suggestion: RawSuggestion,
    pub group_id: Option<String>,
}

pub trait Resolution {
    fn resolve(&self, candidates: Vec<RawSuggestion>) -> Vec<ResolvedSuggestion>;
}

fn overlaps(a: &RawSuggestion, b: &RawSuggestion) -> bool {
    a.start < b.end && b.start < a.end
}

fn span_len(s: &RawSuggestion) -> usize {
    s.end - s.start
}

/// Provider-priority policy. Lower priority number = registered earlier =
/// more trusted. Candidates are visited best-priority first, so an accepted
/// suggestion is only ever challenged by an equal-or-worse priority; a
/// challenger displaces it only when it is strictly better-priority and
/// within 0.1 confidence, or decisively (>0.15) more confident.
pub struct PriorityResolution {
    priorities: HashMap<String, usize>,
    max_suggestions: usize,
}

impl PriorityResolution {
    pub fn new(priorities: HashMap<String, usize>) -> Self {
        Self {
            priorities,
            max_suggestions: MAX_SUGGESTIONS,
        }
    }

    fn priority_of(&self, source: &str) -> usize {
        self.priorities.get(source).copied().unwrap_or(50)
    }
}

impl Resolution for PriorityResolution {
    fn resolve(&self, candidates: Vec<RawSuggestion>) -> Vec<ResolvedSuggestion> {
        // Exact duplicates keep the most confident copy.
        let mut best_by_key: HashMap<(usize, usize, String), RawSuggestion> = HashMap::new();
        for s in candidates {
            let key = (s.start, s.end, s.after.clone());
            match best_by_key.get(&key) {
                Some(current) if current.confidence >= s.confidence => {}
                _ => {
                    best_by_key.insert(key, s);
                }
            }
        }

        let mut unique: Vec<RawSuggestion> = best_by_key.into_values().collect();
        unique.sort_by(|a, b| {
            let pa = self.priority_of(&a.source);
            let pb = self.priority_of(&b.source);
            pa.cmp(&pb)
                .then_with(|| {
                    b.confidence
                        .partial_cmp(&a.confidence)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| span_len(b).cmp(&span_len(a)))
        });

        let mut accepted: Vec<RawSuggestion> = Vec::new();
        for candidate in unique {
            let existing_index = accepted.iter().position(|s| overlaps(s, &candidate));
            let Some(index) = existing_index else {
                accepted.push(candidate);
                continue;
            };
            let existing = &accepted[index];
            let cand_priority = self.priority_of(&candidate.source);
            let existing_priority = self.priority_of(&existing.source);
            if cand_priority < existing_priority
                && candidate.confidence >= existing.confidence - 0.1
            {
                accepted[index] = candidate;
                continue;
            }
            if candidate.confidence > existing.confidence + 0.15 {
                accepted[index] = candidate;
            }
        }

        accepted.sort_by_key(|s| s.start);
        accepted.truncate(self.max_suggestions);
        accepted
            .into_iter()
            .map(|suggestion| ResolvedSuggestion {
                suggestion,
                group_id: None,
            })
            .collect()
    }
}

/// Harness policy: confidence-first ordering with containment handling,
/// cross-category grouping, and a short-match floor.
pub struct GroupingResolution {
    short_allow: HashSet<String>,
}

impl Default for GroupingResolution {
    fn default() -> Self {
        let short_allow = ["됬", "됫", "됐", "됏", "되야", "그낭", "쫌", "구지", "할려"]
            .into_iter()
            .map(str::to_string)
            .collect();
        Self { short_allow }
    }
}

struct GroupState {
    next_group: usize,
}

impl GroupState {
    fn share(&mut self, existing: &mut ResolvedSuggestion, group_id: &mut Option<String>) {
        if group_id.is_some() {
            return;
        }
        if let Some(id) = &existing.group_id {
            *group_id = Some(id.clone());
            return;
        }
        self.next_group += 1;
        let id = format!("g{}", self.next_group);
        existing.group_id = Some(id.clone());
        *group_id = Some(id);
    }
}

impl Resolution for GroupingResolution {
    fn resolve(&self, candidates: Vec<RawSuggestion>) -> Vec<ResolvedSuggestion> {
        // Per-span dedupe: higher confidence wins; ties prefer the smaller
        // length delta (the more conservative rewrite).
        let mut best_by_range: HashMap<(usize, usize), RawSuggestion> = HashMap::new();
        for s in candidates {
            if s.end <= s.start {
                continue;
            }
            let key = (s.start, s.end);
            match best_by_range.get(&key) {
                None => {
                    best_by_range.insert(key, s);
                }
                Some(current) if s.confidence > current.confidence => {
                    best_by_range.insert(key, s);
                }
                Some(current) if s.confidence == current.confidence => {
                    let current_delta =
                        current.after.len().abs_diff(current.before.len());
                    let next_delta = s.after.len().abs_diff(s.before.len());
                    if next_delta < current_delta {
                        best_by_range.insert(key, s);
                    }
                }
                _ => {}
            }
        }

        let mut unique: Vec<RawSuggestion> = best_by_range.into_values().collect();
        unique.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
                .then_with(|| span_len(b).cmp(&span_len(a)))
                .then_with(|| a.start.cmp(&b.start))
        });

        let mut accepted: Vec<ResolvedSuggestion> = Vec::new();
        let mut groups = GroupState { next_group: 0 };

        'candidates: for s in unique {
            if s.before.chars().count() <= 2 && !self.short_allow.contains(&s.before) {
                continue;
            }

            let mut to_remove: Vec<usize> = Vec::new();
            let mut group_id: Option<String> = None;

            for i in 0..accepted.len() {
                let a = &accepted[i].suggestion;
                if !overlaps(a, &s) {
                    continue;
                }

                let len_a = span_len(a);
                let len_s = span_len(&s);
                let a_contains = a.start <= s.start && a.end >= s.end;
                let s_contains = s.start <= a.start && s.end >= a.end;
                let spacing_a = a.kind == SuggestionType::Spacing;
                let spacing_s = s.kind == SuggestionType::Spacing;
                let conf_a = a.confidence;
                let conf_s = s.confidence;

                if s_contains && len_s > len_a {
                    if conf_s - conf_a >= 0.15 {
                        to_remove.push(i);
                        continue;
                    }
                    groups.share(&mut accepted[i], &mut group_id);
                    continue;
                }

                if a_contains && len_a > len_s {
                    if conf_a - conf_s >= 0.15 {
                        continue 'candidates;
                    }
                    groups.share(&mut accepted[i], &mut group_id);
                    continue;
                }

                if spacing_a != spacing_s {
                    let diff = conf_s - conf_a;
                    if diff.abs() >= 0.15 {
                        if diff > 0.0 {
                            to_remove.push(i);
                            continue;
                        }
                        continue 'candidates;
                    }
                    groups.share(&mut accepted[i], &mut group_id);
                    continue;
                }

                if (conf_s - conf_a).abs() < 0.2 {
                    groups.share(&mut accepted[i], &mut group_id);
                    continue;
                }

                if conf_s > conf_a + 0.01 || len_s > len_a {
                    to_remove.push(i);
                } else {
                    continue 'candidates;
                }
            }

            to_remove.sort_unstable_by(|a, b| b.cmp(a));
            for index in to_remove {
                accepted.remove(index);
            }
            accepted.push(ResolvedSuggestion {
                suggestion: s,
                group_id,
            });
        }

        accepted.sort_by_key(|s| s.suggestion.start);
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(
        start: usize,
        end: usize,
        after: &str,
        confidence: f64,
        source: &str,
        kind: SuggestionType,
    ) -> RawSuggestion {
        RawSuggestion {
            start,
            end,
            before: "x".repeat(end - start),
            after: after.to_string(),
            reason: "test".to_string(),
            confidence,
            kind,
            source: source.to_string(),
        }
    }

    fn priorities(sources: &[&str]) -> HashMap<String, usize> {
        sources
            .iter()
            .enumerate()
            .map(|(i, s)| (s.to_string(), i))
            .collect()
    }

    #[test]
    fn test_priority_accepts_non_overlapping() {
        let resolver = PriorityResolution::new(priorities(&["a", "b"]));
        let resolved = resolver.resolve(vec![
            raw(0, 3, "가", 0.9, "a", SuggestionType::Orthography),
            raw(5, 8, "나", 0.9, "b", SuggestionType::Orthography),
        ]);
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_priority_never_emits_overlaps() {
        let resolver = PriorityResolution::new(priorities(&["a", "b", "c"]));
        let resolved = resolver.resolve(vec![
            raw(0, 4, "가", 0.8, "b", SuggestionType::Orthography),
            raw(2, 6, "나", 0.85, "c", SuggestionType::Spacing),
            raw(3, 5, "다", 0.95, "a", SuggestionType::Orthography),
        ]);
        for (i, a) in resolved.iter().enumerate() {
            for b in resolved.iter().skip(i + 1) {
                assert!(!overlaps(&a.suggestion, &b.suggestion));
            }
        }
    }

    #[test]
    fn test_priority_wins_within_confidence_band() {
        // The curated source (priority 0) displaces a heuristic overlap when
        // its confidence is no more than 0.1 lower.
        let resolver = PriorityResolution::new(priorities(&["curated", "heuristic"]));
        let resolved = resolver.resolve(vec![
            raw(0, 4, "heu", 0.9, "heuristic", SuggestionType::Orthography),
            raw(0, 4, "cur", 0.85, "curated", SuggestionType::Custom),
        ]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].suggestion.source, "curated");
    }

    #[test]
    fn test_decisively_higher_confidence_displaces_priority() {
        let resolver = PriorityResolution::new(priorities(&["curated", "heuristic"]));
        let resolved = resolver.resolve(vec![
            raw(0, 4, "cur", 0.5, "curated", SuggestionType::Custom),
            raw(0, 4, "heu", 0.9, "heuristic", SuggestionType::Orthography),
        ]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].suggestion.source, "heuristic");
    }

    #[test]
    fn test_priority_deduplicates_exact_matches() {
        let resolver = PriorityResolution::new(priorities(&["a", "b"]));
        let resolved = resolver.resolve(vec![
            raw(0, 3, "같음", 0.7, "a", SuggestionType::Orthography),
            raw(0, 3, "같음", 0.95, "b", SuggestionType::Orthography),
        ]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].suggestion.confidence, 0.95);
    }

    #[test]
    fn test_grouping_short_match_floor() {
        let resolver = GroupingResolution::default();
        let mut short = raw(0, 1, "갔", 0.9, "rules", SuggestionType::Orthography);
        short.before = "갓".to_string();
        let resolved = resolver.resolve(vec![short]);
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_grouping_short_allowlist() {
        let resolver = GroupingResolution::default();
        let mut allowed = raw(0, 3, "됐", 0.9, "rules", SuggestionType::Orthography);
        allowed.before = "됬".to_string();
        let resolved = resolver.resolve(vec![allowed]);
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn test_grouping_containment_prefers_longer() {
        let resolver = GroupingResolution::default();
        let mut long = raw(0, 9, "긴 교정", 0.9, "rules", SuggestionType::Orthography);
        long.before = "아주긴오타".to_string();
        let mut short = raw(0, 6, "짧은", 0.5, "rules", SuggestionType::Orthography);
        short.before = "짧은오타".to_string();
        let resolved = resolver.resolve(vec![long.clone(), short]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].suggestion.after, "긴 교정");
    }

    #[test]
    fn test_grouping_cross_category_shares_group() {
        let resolver = GroupingResolution::default();
        let mut spacing = raw(0, 6, "띄어 쓰기", 0.8, "rules", SuggestionType::Spacing);
        spacing.before = "띄어쓰기".to_string();
        let mut ortho = raw(0, 6, "철자", 0.75, "rules", SuggestionType::Orthography);
        ortho.before = "철자오타".to_string();
        // Same span would dedupe; offset the second span by a char.
        ortho.start = 3;
        ortho.end = 9;
        let resolved = resolver.resolve(vec![spacing, ortho]);
        assert_eq!(resolved.len(), 2);
        assert!(resolved.iter().all(|r| r.group_id.is_some()));
        assert_eq!(resolved[0].group_id, resolved[1].group_id);
    }
}
