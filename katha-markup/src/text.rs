//! Text cleanup applied to every emitted segment

/// Check whether a code point falls in the emoji, pictograph, or dingbat
/// blocks stripped from spoken text. Covers the common emoticon, symbol,
/// transport, flag, and supplemental pictograph ranges plus the scattered
/// legacy symbols (trademark, information source, arrows, enclosed letters).
pub fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x00A9
            | 0x00AE
            | 0x203C
            | 0x2049
            | 0x2122
            | 0x2139
            | 0x2194..=0x2199
            | 0x21A9..=0x21AA
            | 0x231A..=0x231B
            | 0x2328
            | 0x23CF
            | 0x23E9..=0x23F3
            | 0x23F8..=0x23FA
            | 0x24C2
            | 0x25AA..=0x25AB
            | 0x25B6
            | 0x25C0
            | 0x25FB..=0x25FE
            | 0x2600..=0x26FF
            | 0x2700..=0x27BF
            | 0x2934..=0x2935
            | 0x2B05..=0x2B07
            | 0x2B1B..=0x2B1C
            | 0x2B50
            | 0x2B55
            | 0x3030
            | 0x303D
            | 0x3297
            | 0x3299
            | 0x1F004
            | 0x1F0CF
            | 0x1F170..=0x1F171
            | 0x1F17E..=0x1F17F
            | 0x1F18E
            | 0x1F191..=0x1F251
            | 0x1F300..=0x1F5FF
            | 0x1F600..=0x1F64F
            | 0x1F680..=0x1F6FF
            | 0x1F700..=0x1F8FF
            | 0x1F900..=0x1FAFF
    )
}

/// Strip emoji, collapse whitespace runs to single spaces, and trim. Text
/// that survives this is ready to hand to a synthesis engine.
pub fn clean_text(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| !is_emoji(*c)).collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
