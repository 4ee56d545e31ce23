//! Numeral/unit spacing and audio-format token rules.

use super::{typed_rule, RuleEntry};
use crate::SuggestionType;
use lazy_static::lazy_static;

fn r(pattern: &str, replace: &str, reason: &str, confidence: f64) -> RuleEntry {
    typed_rule(pattern, replace, reason, confidence, SuggestionType::Foreign)
}

lazy_static! {
    pub static ref FOREIGN_RULES: Vec<RuleEntry> = vec![
        r(
            r"(?i)(\d+)\s+(kg|g|mg|cm|mm|m|km|km/h|m/s|hz|khz|mhz|ghz|kb|mb|gb|tb)\b",
            "${1}${2}",
            "숫자-단위 표기",
            0.7,
        ),
        r(r"(\d+)\s+(시간|분|초|일|주|개월|년)\b", "${1}${2}", "숫자-단위 표기", 0.7),
        r(r"(\d+)\s+(%|％)", "${1}${2}", "퍼센트 표기", 0.7),
        r(r"(?i)(\d+)\s+(℃|°C|도)\b", "${1}${2}", "온도 표기", 0.7),
        r(r"(\d+)\s+(명|개|곡|회|차|번)\b", "${1}${2}", "수량 표기", 0.7),
        r(
            r"(\d+)\s+(시|분|초)\s*(\d+)\s*(분|초)",
            "${1}${2} ${3}${4}",
            "시간 표기 정리",
            0.6,
        ),
        r(r"(?i)\bEP\s*앨범\b", "EP 앨범", "영문 약어 표기", 0.7),
        r(r"(?i)\bLP\s*앨범\b", "LP 앨범", "영문 약어 표기", 0.7),
        r(r"(?i)\bMV\s*영상\b", "MV 영상", "영문 약어 표기", 0.7),
        r(r"(?i)\bDolby\s*Atmos\b", "Dolby Atmos", "음원 포맷 표기", 0.7),
        r(r"(?i)\bHi[- ]?Res\b", "Hi-Res", "음원 포맷 표기", 0.7),
        r(r"(?i)\b24\s*bit\b", "24bit", "비트 표기", 0.7),
        r(r"(?i)\b96\s*kHz\b", "96kHz", "샘플링 레이트 표기", 0.7),
    ];
}
