//! Character-level Unicode classification for Japanese text.

/// Full Hiragana block (U+3040..U+309F).
pub fn is_hiragana(c: char) -> bool {
    ('\u{3040}'..='\u{309F}').contains(&c)
}

/// Full Katakana block (U+30A0..U+30FF), including the long-vowel mark ー.
pub fn is_katakana(c: char) -> bool {
    ('\u{30A0}'..='\u{30FF}').contains(&c)
}

pub fn is_kanji(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
        || ('\u{3400}'..='\u{4DBF}').contains(&c)
        || ('\u{20000}'..='\u{2A6DF}').contains(&c)
}

pub fn is_japanese(c: char) -> bool {
    is_hiragana(c) || is_katakana(c) || is_kanji(c)
}

/// Whether `text` already contains hiragana, katakana or kanji.
pub fn contains_japanese(text: &str) -> bool {
    text.chars().any(is_japanese)
}

/// Characters that belong to a romaji word: ASCII letters plus the
/// long-vowel hyphen and the nasal apostrophe.
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '-' || c == '\''
}
