//! Iterative rule engine: categorized rule groups applied until a fixed
//! point, because fixing one error can expose another (a restored verb
//! ending lets a downstream spacing rule fire).

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone)]
pub struct HybridOptions {
    pub enable_normalization: bool,
    pub enable_spelling: bool,
    pub enable_spacing: bool,
    pub enable_particles: bool,
    pub enable_punctuation: bool,
    pub confidence_threshold: f64,
    pub max_iterations: usize,
}

impl Default for HybridOptions {
    fn default() -> Self {
        Self {
            enable_normalization: true,
            enable_spelling: true,
            enable_spacing: true,
            enable_particles: true,
            enable_punctuation: true,
            confidence_threshold: 0.6,
            max_iterations: 5,
        }
    }
}

/// One applied rewrite. Offsets are byte offsets into the text as it was
/// when the rule ran (intermediate text for later iterations). `rule` is the
/// rule id suffixed with `#<iteration>`.
#[derive(Debug, Clone)]
pub struct HybridChange {
    pub start: usize,
    pub end: usize,
    pub before: String,
    pub after: String,
    pub rule: String,
    pub confidence: f64,
}

#[derive(Debug, Clone)]
pub struct HybridOutcome {
    pub corrected: String,
    pub changes: Vec<HybridChange>,
}

struct HybridRule {
    id: &'static str,
    pattern: Regex,
    replace: &'static str,
    confidence: f64,
}

fn h(id: &'static str, pattern: &str, replace: &'static str, confidence: f64) -> HybridRule {
    HybridRule {
        id,
        pattern: Regex::new(pattern).expect("invalid hybrid rule pattern"),
        replace,
        confidence,
    }
}

lazy_static! {
    static ref SPELLING_RULES: Vec<HybridRule> = vec![
        h("spell_있엇다", "있엇다", "있었다", 0.95),
        h("spell_울엇다", "울엇다", "울었다", 0.95),
        h("spell_몰랏다", "몰랏다", "몰랐다", 0.95),
        h("spell_끝낫다", "끝낫다", "끝났다", 0.95),
        h("spell_헷갈렷다", "헷갈렷다", "헷갈렸다", 0.95),
        h("spell_웃엇다", "웃엇다", "웃었다", 0.95),
        h("spell_누웟다", "누웟다", "누웠다", 0.95),
        h("spell_괜찬아진", "괜찬아진", "괜찮아진", 0.95),
        h("spell_걸엇다", "걸엇다", "걸었다", 0.9),
        h("spell_걸엇어", "걸엇어", "걸었어", 0.9),
        h("spell_이유없는", "이유없는", "이유 없는", 0.9),
        h("spell_안했", "안했", "안 했", 0.85),
        h("spell_싫은거야", "싫은거야", "싫은 거야", 0.9),
        h("spell_몇개", "몇개", "몇 개", 0.9),
        h("spell_쎄게", "쎄게", "세게", 0.9),
        h("spell_잇", "잇", "있", 0.8),
        h("spell_됫", "됫", "됐", 0.8),
        h("spell_되요", "되요", "돼요", 0.85),
        h("spell_되서", "되서", "돼서", 0.85),
    ];
    static ref SPACING_RULES: Vec<HybridRule> = vec![
        h("space_안가지고", "안가지고", "안 가지고", 0.8),
        h("space_왜그랬는지", "왜그랬는지", "왜 그랬는지", 0.8),
        h("space_어릴때", "어릴때", "어릴 때", 0.9),
        h("space_비오는날", "비오는날", "비 오는 날", 0.9),
        h("space_복잡한줄", "복잡한줄", "복잡한 줄", 0.9),
        h("space_학교가고", "학교가고", "학교 가고", 0.8),
        h("space_밥먹고", "밥먹고", "밥 먹고", 0.8),
        h("space_뭘하고", "뭘하고", "뭘 하고", 0.8),
        h("space_안한채", "안한채", "안 한 채", 0.9),
        h("space_걷고잇엇다", "걷고잇엇다", "걷고 있었다", 0.9),
        h("space_걷고있었다", "걷고있었다", "걷고 있었다", 0.9),
        h("space_안했지만", r"안[ \t]?했지만", "안 했지만", 0.9),
        h("space_있는걸까", "있는걸까", "있는 걸까", 0.85),
        h("space_있는건지", "있는건지", "있는 건지", 0.85),
        h("space_올거라고", "올거라고", "올 거라고", 0.85),
    ];
    static ref PARTICLE_RULES: Vec<HybridRule> = vec![
        h("particle_한테", r"([가-힣]+)\s+(한테)", "${1}${2}", 0.9),
        h("particle_에게", r"([가-힣]+)\s+(에게)", "${1}${2}", 0.9),
        h("particle_께", r"([가-힣]+)\s+(께)", "${1}${2}", 0.9),
    ];
    static ref AUXILIARY_RULES: Vec<HybridRule> = vec![
        h("aux_보였다", r"([가-힣]+)보였다", "${1} 보였다", 0.85),
        h("aux_보인다", r"([가-힣]+)보인다", "${1} 보인다", 0.8),
        h("aux_보이고", r"([가-힣]+)보이고", "${1} 보이고", 0.8),
        h("aux_보엿다", "보엿다", "보였다", 0.85),
    ];
    static ref PUNCTUATION_RULES: Vec<HybridRule> = vec![
        h("punc_quote", "[\u{201C}\u{201D}]", "\"", 0.6),
        h("punc_single_quote", "[\u{2018}\u{2019}]", "'", 0.6),
        h("punc_double_space", r"[ \t]{2,}", " ", 0.6),
    ];
}

/// Light normalization ahead of the iterations: NFC, LF newlines, straight
/// quotes, tabs to spaces.
fn pre_normalize(text: &str) -> String {
    let composed: String = text.nfc().collect();
    let mut out = String::with_capacity(composed.len());
    let mut chars = composed.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\t' => out.push(' '),
            _ => out.push(ch),
        }
    }
    out
}

/// Run one rule group over the text, splicing in replacements and recording
/// changes. Rules below the confidence threshold are no-ops.
fn apply_rules(text: &str, rules: &[&HybridRule], threshold: f64) -> (String, Vec<HybridChange>) {
    let mut working = text.to_string();
    let mut changes = Vec::new();

    for rule in rules {
        if rule.confidence < threshold {
            continue;
        }
        let mut rebuilt = String::with_capacity(working.len());
        let mut cursor = 0;
        let mut touched = false;
        for caps in rule.pattern.captures_iter(&working) {
            let m = caps.get(0).expect("group 0 always present");
            let mut after = String::new();
            caps.expand(rule.replace, &mut after);
            if after == m.as_str() {
                continue;
            }
            changes.push(HybridChange {
                start: m.start(),
                end: m.end(),
                before: m.as_str().to_string(),
                after: after.clone(),
                rule: rule.id.to_string(),
                confidence: rule.confidence,
            });
            rebuilt.push_str(&working[cursor..m.start()]);
            rebuilt.push_str(&after);
            cursor = m.end();
            touched = true;
        }
        if touched {
            rebuilt.push_str(&working[cursor..]);
            working = rebuilt;
        }
    }

    (working, changes)
}

/// Apply all enabled rule groups repeatedly until no group changes the text
/// or the iteration cap is hit.
pub fn run_hybrid(text: &str, options: &HybridOptions) -> HybridOutcome {
    let mut working = if options.enable_normalization {
        pre_normalize(text)
    } else {
        text.to_string()
    };
    let mut all_changes = Vec::new();

    let particles: Vec<&HybridRule> = PARTICLE_RULES.iter().chain(AUXILIARY_RULES.iter()).collect();
    for iteration in 1..=options.max_iterations {
        let mut iteration_changes = 0;

        let steps: [(bool, Vec<&HybridRule>); 4] = [
            (options.enable_spelling, SPELLING_RULES.iter().collect()),
            (options.enable_spacing, SPACING_RULES.iter().collect()),
            (options.enable_particles, particles.clone()),
            (options.enable_punctuation, PUNCTUATION_RULES.iter().collect()),
        ];

        for (enabled, rules) in steps {
            if !enabled {
                continue;
            }
            let (next, changes) = apply_rules(&working, &rules, options.confidence_threshold);
            if !changes.is_empty() {
                iteration_changes += changes.len();
                all_changes.extend(changes.into_iter().map(|mut change| {
                    change.rule = format!("{}#{}", change.rule, iteration);
                    change
                }));
                working = next;
            }
        }

        if iteration_changes == 0 {
            break;
        }
    }

    HybridOutcome {
        corrected: working,
        changes: all_changes,
    }
}
