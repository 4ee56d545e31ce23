//! Evasion-resistant normalizer used by the profanity engine.
//!
//! Collapses the usual obfuscation tricks (leet substitutions, separator
//! padding, character repetition, split jamo) so rule patterns can match a
//! canonical form. Must stay idempotent: every step either removes its own
//! trigger characters or is a fixed point on its own output.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::hangul;

lazy_static! {
    static ref CONTROL_CHARS: Regex = Regex::new(
        r"[\u{0000}-\u{001F}\u{007F}-\u{009F}\u{200B}-\u{200F}\u{202A}-\u{202E}\u{2060}\u{FEFF}]"
    )
    .unwrap();
    static ref INLINE_EXCLAMATION: Regex =
        Regex::new(r"([\p{L}\p{N}])!([\p{L}\p{N}])").unwrap();
}

fn leet_fold(ch: char) -> char {
    match ch {
        '@' => 'a',
        '0' => 'o',
        '1' => 'i',
        '$' => 's',
        '3' => 'e',
        '7' => 't',
        _ => ch,
    }
}

fn is_separator(ch: char) -> bool {
    matches!(
        ch,
        '-' | '_'
            | '.'
            | '*'
            | '/'
            | '\\'
            | '|'
            | '+'
            | '~'
            | '`'
            | '^'
            | '\''
            | '"'
            | ':'
            | ';'
            | '!'
            | '?'
            | '('
            | ')'
            | '['
            | ']'
            | '{'
            | '}'
            | '<'
            | '>'
            | '#'
            | ','
    )
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse runs of three or more identical characters down to two. The
/// regex crate has no backreferences, so this is an explicit scan.
fn collapse_repeats(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut last: Option<char> = None;
    let mut run = 0usize;
    for ch in text.chars() {
        if last == Some(ch) {
            run += 1;
        } else {
            last = Some(ch);
            run = 1;
        }
        if run <= 2 {
            output.push(ch);
        }
    }
    output
}

/// Remove whitespace sandwiched between two jamo characters, so spread-out
/// jamo like "ㅅ ㅣ ㅂ ㅏ ㄹ" become a composable run.
fn strip_jamo_gaps(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut output = String::with_capacity(text.len());
    let mut index = 0;
    while index < chars.len() {
        let ch = chars[index];
        if ch.is_whitespace() {
            let prev_jamo = output.chars().last().map(hangul::is_jamo).unwrap_or(false);
            let mut next = index;
            while next < chars.len() && chars[next].is_whitespace() {
                next += 1;
            }
            let next_jamo = chars.get(next).map(|&c| hangul::is_jamo(c)).unwrap_or(false);
            if prev_jamo && next_jamo {
                index = next;
                continue;
            }
        }
        output.push(ch);
        index += 1;
    }
    output
}

/// Full evasion-resistant normalization. Pure, total, idempotent.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out: String = text.nfkc().collect();
    out = hangul::map_to_compatibility(&out);
    out = out.to_lowercase();
    out = CONTROL_CHARS.replace_all(&out, "").into_owned();
    // "sh!t" style inline bangs read as "i"; must run before "!" becomes a
    // separator below.
    out = INLINE_EXCLAMATION.replace_all(&out, "${1}i${2}").into_owned();
    out = out.chars().map(leet_fold).collect();
    out = out
        .chars()
        .map(|ch| if is_separator(ch) { ' ' } else { ch })
        .collect();
    out = collapse_whitespace(&out);
    // Gap stripping must precede repeat collapsing: removing a space between
    // jamo can join two short runs into one long one, and collapsing that
    // run afterwards is what keeps the whole function idempotent.
    out = strip_jamo_gaps(&out);
    out = collapse_repeats(&out);
    out = hangul::compose_jamo_runs(&out);
    collapse_whitespace(&out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leet_and_repeat_collapse() {
        assert_eq!(normalize("fuuuuuck!!!"), "fuuck");
        assert_eq!(normalize("sh1t"), "shit");
        assert_eq!(normalize("s#h!t"), "s hit");
        assert_eq!(normalize("f*uck"), "f uck");
    }

    #[test]
    fn test_jamo_recomposition() {
        assert_eq!(normalize("ㅆㅣㅂㅏㄹ"), "씨발");
        assert_eq!(normalize("ㅅ ㅣ ㅂ ㅏ ㄹ"), "시발");
        assert_eq!(normalize("ㅅ.ㅣ*ㅂ-ㅏ/ㄹ"), "시발");
        assert_eq!(normalize("존ㄴㅏ"), "존나");
        assert_eq!(normalize("ㅅ ㅂ"), "ㅅㅂ");
    }

    #[test]
    fn test_inline_exclamation_substitution() {
        assert_eq!(normalize("sh!t happens"), "shit happens");
    }

    #[test]
    fn test_empty_and_plain_text() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("오늘 날씨가 좋다"), "오늘 날씨가 좋다");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "fuuuuuck!!!",
            "ㅅ ㅣ ㅂ ㅏ ㄹ",
            "F*U*C*K 2023!!",
            "가나다 ABC",
            "ㅋㅋㅋㅋㅋㅋ 존ㄴㅏ",
            // Gap removal joins the runs; the joined run must still collapse.
            "ㅋㅋㅋ ㅋㅋㅋ",
        ];
        for sample in samples {
            let once = normalize(sample);
            let twice = normalize(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", sample);
        }
    }
}
