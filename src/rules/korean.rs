//! The built-in Korean orthography and spacing rule table.
//!
//! Most of the table is generated: frequent past-tense misspellings are a
//! stem-pair × ending product, and the spacing set is a dependent-noun ×
//! modifier product. A curated set covers the common fixed corrections that
//! do not fit either product. Everything is compiled once and deduplicated.

use super::{dedupe_rules, rule, RuleEntry};
use lazy_static::lazy_static;

/// Past-tense stems commonly typed with ㅅ instead of ㅆ.
fn past_typo_rules() -> Vec<RuleEntry> {
    let pairs: [(&str, &str); 22] = [
        ("햇", "했"),
        ("참앗", "참았"),
        ("있엇", "있었"),
        ("없엇", "없었"),
        ("같앗", "같았"),
        ("싫엇", "싫었"),
        ("좋앗", "좋았"),
        ("많앗", "많았"),
        ("말햇", "말했"),
        ("생각햇", "생각했"),
        ("잊엇", "잊었"),
        ("겪엇", "겪었"),
        ("먹엇", "먹었"),
        ("마셧", "마셨"),
        ("보앗", "보았"),
        ("그랫", "그랬"),
        ("버렷", "버렸"),
        ("걸엇", "걸었"),
        ("웃엇", "웃었"),
        ("들어왓", "들어왔"),
        ("나왓", "나왔"),
        ("봣", "봤"),
    ];
    let endings = ["다", "어", "는데", "지만", "던", "을", "지", "고"];

    let mut rules = Vec::with_capacity(pairs.len() * endings.len());
    for (bad, good) in pairs {
        for ending in endings {
            rules.push(rule(
                &format!("{}{}", bad, ending),
                &format!("{}{}", good, ending),
                &format!("과거형 표기: {}{}", good, ending),
                0.95,
            ));
        }
    }
    rules
}

/// Spacing around the dependent nouns 수/거/듯/때 and a few fixed compounds.
fn spacing_rules() -> Vec<RuleEntry> {
    let mut rules = Vec::new();

    let su = ["할", "될", "볼", "갈", "울", "있을", "없을", "그럴", "이럴", "저럴"];
    for v in su {
        rules.push(rule(&format!("{}수", v), &format!("{} 수", v), "띄어쓰기: '수'", 0.98));
        rules.push(rule(
            &format!("{}수있", v),
            &format!("{} 수 있", v),
            "띄어쓰기: '수'",
            0.98,
        ));
        rules.push(rule(
            &format!("{}수없", v),
            &format!("{} 수 없", v),
            "띄어쓰기: '수'",
            0.98,
        ));
    }

    let geo = ["인", "하는", "되는", "있는", "없는", "같은", "할", "볼", "갈", "될"];
    for p in geo {
        rules.push(rule(&format!("{}거", p), &format!("{} 거", p), "띄어쓰기: '거'", 0.9));
    }

    let deut = ["할", "될", "볼", "갈", "끊길", "울", "죽을"];
    for p in deut {
        rules.push(rule(&format!("{}듯", p), &format!("{} 듯", p), "띄어쓰기: '듯'", 0.9));
    }

    let ttae = ["할", "될", "볼", "갈", "올", "쉴"];
    for p in ttae {
        rules.push(rule(&format!("{}때", p), &format!("{} 때", p), "띄어쓰기: '때'", 0.85));
    }

    rules.push(rule("밖에없", "밖에 없", "띄어쓰기: '밖에 없다'", 0.8));
    rules.push(rule("뿐만아니라", "뿐만 아니라", "띄어쓰기: '뿐만 아니라'", 0.9));
    rules.push(rule("몇개", "몇 개", "띄어쓰기: '몇 개'", 0.9));
    rules.push(rule("안했", "안 했", "띄어쓰기: '안 했-'", 0.85));
    rules
}

/// Curated fixed corrections that the generators do not cover.
fn fixed_common_rules() -> Vec<RuleEntry> {
    vec![
        rule("됬", "됐", "'됐' 표기", 0.98),
        rule("됫", "됐", "'됐' 표기", 0.98),
        rule("할께", "할게", "표준어 '할게'", 0.97),
        rule("갈께", "갈게", "표준어 '갈게'", 0.97),
        rule("볼께", "볼게", "표준어 '볼게'", 0.97),
        rule("줄께", "줄게", "표준어 '줄게'", 0.97),
        rule("올께", "올게", "표준어 '올게'", 0.97),
        rule("할려고", "하려고", "표준어 '하려고'", 0.9),
        rule("할려", "하려", "표준어 '하려-'", 0.7),
        rule("될려고", "되려고", "표준어 '되려고'", 0.9),
        rule("갈려고", "가려고", "표준어 '가려고'", 0.9),
        rule("볼려고", "보려고", "표준어 '보려고'", 0.9),
        rule("줄려고", "주려고", "표준어 '주려고'", 0.9),
        rule("올려고", "오려고", "표준어 '오려고'", 0.9),
        rule("되요", "돼요", "'돼요' 표기", 0.85),
        rule("안되요", "안 돼요", "띄어쓰기+'돼요' 표기", 0.8),
        rule("되서", "돼서", "'돼서' 표기", 0.75),
        rule("어쨋든", "어쨌든", "표준어", 0.85),
        rule("오랫만", "오랜만", "표준어", 0.9),
        rule("금새", "금세", "표준어", 0.9),
        rule("헷깔", "헷갈", "표준어", 0.9),
        rule("햇갈", "헷갈", "표준어", 0.9),
        rule("왠일", "웬일", "표준어", 0.9),
        rule("왠만", "웬만", "표준어", 0.9),
        rule("왠걸", "웬걸", "표준어", 0.85),
        rule("웬지", "왠지", "표준어 '왠지'", 0.7),
        rule("어제밤", "어젯밤", "표준어 '어젯밤'", 0.9),
        rule("머리속", "머릿속", "표준어", 0.75),
        rule("던대", "던데", "'던데' 표기", 0.92),
        rule("어떻해", "어떻게", "표준어 '어떻게'(오타)", 0.7),
        rule("어떻케", "어떻게", "표준어 '어떻게'(오타)", 0.7),
        rule("어떡해", "어떻게", "표준어 '어떻게' (제안)", 0.55),
        rule("안되", "안 돼", "'안 돼' 표기(제안)", 0.55),
        rule("해야됨", "해야 됨", "띄어쓰기", 0.85),
        rule("됌", "됨", "표준어(제안)", 0.6),
        rule("암튼", "아무튼", "표준어(제안)", 0.4),
        rule("쎄게", "세게", "표준어 '세게'", 0.9),
        rule("앉아있", "앉아 있", "띄어쓰기(제안)", 0.7),
    ]
}

/// Repeated punctuation cleanup shared with the board-style rule set.
fn punctuation_cleanup_rules() -> Vec<RuleEntry> {
    vec![
        rule(" {2,}", " ", "중복 공백 제거", 0.9),
        rule(",{2,}", ",", "중복 쉼표 제거", 0.7),
        rule(r"\.{4,}", "...", "말줄임표 정리", 0.7),
        rule("!{2,}", "!", "중복 느낌표 정리", 0.6),
        rule(r"\?{2,}", "?", "중복 물음표 정리", 0.6),
    ]
}

lazy_static! {
    /// The Korean table on its own: generated sets plus curated corrections.
    pub static ref KO_RULES: Vec<RuleEntry> = dedupe_rules(
        fixed_common_rules()
            .into_iter()
            .chain(past_typo_rules())
            .chain(spacing_rules())
            .chain(punctuation_cleanup_rules())
            .collect()
    );

    /// Everything the local-rules provider scans with: the Korean table plus
    /// the foreign/unit and style tables.
    pub static ref ALL_RULES: Vec<RuleEntry> = dedupe_rules(
        KO_RULES
            .iter()
            .cloned()
            .chain(super::foreign::FOREIGN_RULES.iter().cloned())
            .chain(super::style::STYLE_RULES.iter().cloned())
            .collect()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_compile_and_dedupe() {
        assert!(KO_RULES.len() > 150);
        assert!(ALL_RULES.len() > KO_RULES.len());
    }

    #[test]
    fn test_past_typo_coverage() {
        let hits: Vec<_> = KO_RULES
            .iter()
            .filter(|r| r.pattern.is_match("걸엇어"))
            .collect();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].pattern.replace("걸엇어", hits[0].replace.as_str()), "걸었어");
    }

    #[test]
    fn test_spacing_coverage() {
        assert!(KO_RULES.iter().any(|r| r.pattern.is_match("할수있")));
        assert!(KO_RULES.iter().any(|r| r.pattern.is_match("있는거")));
    }
}
