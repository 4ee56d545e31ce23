//! Hangul syllable arithmetic and jamo index tables.
//!
//! Composed syllables live at U+AC00 + (lead * 21 + vowel) * 28 + trail.
//! Input may carry either compatibility jamo (U+3131..) or conjoining jamo
//! (U+1100..); both map into the same index space here.

/// First composed Hangul syllable (가).
pub const SYLLABLE_BASE: u32 = 0xAC00;
/// First conjoining leading consonant (ᄀ).
pub const LEAD_BASE: u32 = 0x1100;
/// First conjoining vowel (ᅡ).
pub const VOWEL_BASE: u32 = 0x1161;
/// Conjoining trailing consonants start one past this code point.
pub const TRAIL_BASE: u32 = 0x11A7;

pub const LEAD_COUNT: u32 = 19;
pub const VOWEL_COUNT: u32 = 21;
pub const TRAIL_COUNT: u32 = 28;
pub const SYLLABLE_COUNT: u32 = LEAD_COUNT * VOWEL_COUNT * TRAIL_COUNT;

/// Compatibility jamo for the 19 leading consonants, in lead-index order.
pub const COMPAT_LEADS: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ',
    'ㅋ', 'ㅌ', 'ㅍ', 'ㅎ',
];

/// Compatibility jamo for the 21 vowels, in vowel-index order. These are
/// contiguous at U+314F..=U+3163.
pub const COMPAT_VOWELS: [char; 21] = [
    'ㅏ', 'ㅐ', 'ㅑ', 'ㅒ', 'ㅓ', 'ㅔ', 'ㅕ', 'ㅖ', 'ㅗ', 'ㅘ', 'ㅙ', 'ㅚ', 'ㅛ', 'ㅜ', 'ㅝ',
    'ㅞ', 'ㅟ', 'ㅠ', 'ㅡ', 'ㅢ', 'ㅣ',
];

/// Compatibility jamo for trailing consonants, indices 1..=27 (index 0 means
/// "no trailing consonant" and has no character).
pub const COMPAT_TRAILS: [char; 27] = [
    'ㄱ', 'ㄲ', 'ㄳ', 'ㄴ', 'ㄵ', 'ㄶ', 'ㄷ', 'ㄹ', 'ㄺ', 'ㄻ', 'ㄼ', 'ㄽ', 'ㄾ', 'ㄿ', 'ㅀ',
    'ㅁ', 'ㅂ', 'ㅄ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅊ', 'ㅋ', 'ㅌ', 'ㅍ', 'ㅎ',
];

/// True for a composed syllable block.
pub fn is_syllable(ch: char) -> bool {
    let code = ch as u32;
    (SYLLABLE_BASE..SYLLABLE_BASE + SYLLABLE_COUNT).contains(&code)
}

/// True for any standalone jamo, compatibility or conjoining.
pub fn is_jamo(ch: char) -> bool {
    matches!(ch, 'ㄱ'..='ㅎ' | 'ㅏ'..='ㅣ' | '\u{1100}'..='\u{11FF}')
}

/// Leading-consonant index for a compatibility or conjoining jamo.
pub fn lead_index(ch: char) -> Option<u32> {
    let code = ch as u32;
    if (LEAD_BASE..LEAD_BASE + LEAD_COUNT).contains(&code) {
        return Some(code - LEAD_BASE);
    }
    COMPAT_LEADS.iter().position(|&c| c == ch).map(|i| i as u32)
}

/// Vowel index for a compatibility or conjoining jamo.
pub fn vowel_index(ch: char) -> Option<u32> {
    let code = ch as u32;
    if (VOWEL_BASE..VOWEL_BASE + VOWEL_COUNT).contains(&code) {
        return Some(code - VOWEL_BASE);
    }
    let compat = ch as u32;
    if (0x314F..=0x3163).contains(&compat) {
        return Some(compat - 0x314F);
    }
    None
}

/// Trailing-consonant index (1..=27). Accepts conjoining trails, compatibility
/// jamo, and conjoining leads whose consonant can also close a syllable.
pub fn trail_index(ch: char) -> Option<u32> {
    let code = ch as u32;
    if (TRAIL_BASE + 1..TRAIL_BASE + TRAIL_COUNT).contains(&code) {
        return Some(code - TRAIL_BASE);
    }
    if (LEAD_BASE..LEAD_BASE + LEAD_COUNT).contains(&code) {
        let compat = COMPAT_LEADS[(code - LEAD_BASE) as usize];
        return COMPAT_TRAILS
            .iter()
            .position(|&c| c == compat)
            .map(|i| i as u32 + 1);
    }
    COMPAT_TRAILS
        .iter()
        .position(|&c| c == ch)
        .map(|i| i as u32 + 1)
}

/// Compose lead/vowel/trail indices into a syllable block.
pub fn compose_syllable(lead: u32, vowel: u32, trail: u32) -> Option<char> {
    if lead >= LEAD_COUNT || vowel >= VOWEL_COUNT || trail >= TRAIL_COUNT {
        return None;
    }
    char::from_u32(SYLLABLE_BASE + (lead * VOWEL_COUNT + vowel) * TRAIL_COUNT + trail)
}

/// Decompose a syllable block into (lead, vowel, trail) indices.
pub fn decompose_syllable(ch: char) -> Option<(u32, u32, u32)> {
    if !is_syllable(ch) {
        return None;
    }
    let offset = ch as u32 - SYLLABLE_BASE;
    Some((
        offset / (VOWEL_COUNT * TRAIL_COUNT),
        (offset / TRAIL_COUNT) % VOWEL_COUNT,
        offset % TRAIL_COUNT,
    ))
}

/// Map conjoining jamo to their compatibility forms, leaving everything else
/// untouched. NFKC turns isolated compatibility jamo into conjoining ones;
/// this folds them back so rule patterns see a single representation.
pub fn map_to_compatibility(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for ch in text.chars() {
        let code = ch as u32;
        if (LEAD_BASE..LEAD_BASE + LEAD_COUNT).contains(&code) {
            output.push(COMPAT_LEADS[(code - LEAD_BASE) as usize]);
        } else if (VOWEL_BASE..VOWEL_BASE + VOWEL_COUNT).contains(&code) {
            output.push(COMPAT_VOWELS[(code - VOWEL_BASE) as usize]);
        } else if (TRAIL_BASE + 1..TRAIL_BASE + TRAIL_COUNT).contains(&code) {
            output.push(COMPAT_TRAILS[(code - TRAIL_BASE - 1) as usize]);
        } else {
            output.push(ch);
        }
    }
    output
}

/// Recompose split jamo runs into syllable blocks.
///
/// A lead+vowel pair starts a syllable; a following trailing candidate is
/// consumed only when it is not itself followed by a vowel, so that
/// lead+vowel+consonant+vowel parses as two syllables. A composed open
/// syllable followed by an isolated trailing jamo is merged the same way.
pub fn compose_jamo_runs(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut output = String::with_capacity(text.len());
    let mut index = 0;

    while index < chars.len() {
        let ch = chars[index];

        if is_syllable(ch) {
            if index + 1 < chars.len() {
                let trail = trail_index(chars[index + 1]);
                let next_vowel = chars.get(index + 2).and_then(|&c| vowel_index(c));
                if let Some(trail) = trail {
                    if next_vowel.is_none() {
                        if let Some((lead, vowel, 0)) = decompose_syllable(ch) {
                            if let Some(merged) = compose_syllable(lead, vowel, trail) {
                                output.push(merged);
                                index += 2;
                                continue;
                            }
                        }
                    }
                }
            }
            output.push(ch);
            index += 1;
            continue;
        }

        if let Some(lead) = lead_index(ch) {
            if let Some(vowel) = chars.get(index + 1).and_then(|&c| vowel_index(c)) {
                let mut trail = 0;
                let mut next_index = index + 2;
                if let Some(&candidate) = chars.get(next_index) {
                    let after_vowel = chars.get(next_index + 1).and_then(|&c| vowel_index(c));
                    if let Some(t) = trail_index(candidate) {
                        if after_vowel.is_none() {
                            trail = t;
                            next_index += 1;
                        }
                    }
                }
                if let Some(composed) = compose_syllable(lead, vowel, trail) {
                    output.push(composed);
                    index = next_index;
                    continue;
                }
            }
        }

        output.push(ch);
        index += 1;
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_syllable() {
        assert_eq!(compose_syllable(0, 0, 0), Some('가'));
        assert_eq!(compose_syllable(0, 0, 1), Some('각'));
        assert_eq!(compose_syllable(18, 0, 4), Some('한'));
        assert_eq!(compose_syllable(19, 0, 0), None);
    }

    #[test]
    fn test_decompose_syllable() {
        assert_eq!(decompose_syllable('한'), Some((18, 0, 4)));
        assert_eq!(decompose_syllable('가'), Some((0, 0, 0)));
        assert_eq!(decompose_syllable('a'), None);
    }

    #[test]
    fn test_index_lookups() {
        assert_eq!(lead_index('ㅅ'), Some(9));
        assert_eq!(lead_index('\u{1100}'), Some(0));
        assert_eq!(vowel_index('ㅏ'), Some(0));
        assert_eq!(vowel_index('ㅣ'), Some(20));
        assert_eq!(trail_index('ㄹ'), Some(8));
        assert_eq!(trail_index('ㅏ'), None);
    }

    #[test]
    fn test_compose_jamo_runs() {
        // Trailing consonant claimed by the next vowel stays a lead.
        assert_eq!(compose_jamo_runs("ㅅㅣㅂㅏㄹ"), "시발");
        assert_eq!(compose_jamo_runs("ㅂㅕㅇㅅㅣㄴ"), "병신");
        // Composed open syllable plus isolated trailing jamo merges.
        assert_eq!(compose_jamo_runs("존나"), "존나");
        assert_eq!(compose_jamo_runs("가ㄱ"), "각");
        // Consonant-only runs are left alone.
        assert_eq!(compose_jamo_runs("ㅅㅂ"), "ㅅㅂ");
    }

    #[test]
    fn test_map_to_compatibility() {
        assert_eq!(map_to_compatibility("\u{1100}\u{1161}"), "ㄱㅏ");
        assert_eq!(map_to_compatibility("abc 한글"), "abc 한글");
    }
}
