//! Stylistic cleanup: repeated punctuation and emoticon runs, stray spaces
//! around sentence-final marks.

use super::{typed_rule, RuleEntry};
use crate::SuggestionType;
use lazy_static::lazy_static;

fn r(pattern: &str, replace: &str, reason: &str, confidence: f64) -> RuleEntry {
    typed_rule(pattern, replace, reason, confidence, SuggestionType::Style)
}

lazy_static! {
    pub static ref STYLE_RULES: Vec<RuleEntry> = vec![
        r("!{3,}", "!!", "과도한 반복 부호 정리", 0.5),
        r(r"\?{3,}", "??", "과도한 반복 부호 정리", 0.5),
        r("~{3,}", "~~", "과도한 반복 부호 정리", 0.5),
        r(",{3,}", ",", "과도한 반복 부호 정리", 0.5),
        r(r"\.{3,}", ".", "과도한 반복 부호 정리", 0.5),
        r(r"\s*([!?])\s*", "${1} ", "문장부호 주변 공백 정리", 0.45),
        r("\u{00A0}+", " ", "특수 공백 정리", 0.45),
        r("ㅋ{4,}", "ㅋㅋ", "반복 축약 (스타일)", 0.35),
        r("ㅎ{4,}", "ㅎㅎ", "반복 축약 (스타일)", 0.35),
        r("ㅠ{3,}", "ㅠㅠ", "반복 축약 (스타일)", 0.35),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_punctuation_collapse() {
        let rule = &STYLE_RULES[0];
        assert_eq!(rule.pattern.replace_all("와!!!!", rule.replace.as_str()), "와!!");
    }

    #[test]
    fn test_emoticon_run_collapse() {
        let rule = STYLE_RULES.iter().find(|r| r.pattern.is_match("ㅋㅋㅋㅋㅋ")).unwrap();
        assert_eq!(rule.pattern.replace_all("ㅋㅋㅋㅋㅋ", rule.replace.as_str()), "ㅋㅋ");
    }
}
