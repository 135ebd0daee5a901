//! Hiragana → romaji key derivation for dictionary datasets.
//!
//! Base dataset records carry only a hiragana reading; the romaji key users
//! type is derived here, syllable by syllable (digraphs such as きゃ first,
//! then single kana). A sokuon doubles the first letter of the next syllable.

use std::collections::HashMap;
use std::sync::OnceLock;

#[rustfmt::skip]
const KANA_ROMAJI: &[(&str, &str)] = &[
    ("あ", "a"), ("い", "i"), ("う", "u"), ("え", "e"), ("お", "o"),
    ("か", "ka"), ("き", "ki"), ("く", "ku"), ("け", "ke"), ("こ", "ko"),
    ("が", "ga"), ("ぎ", "gi"), ("ぐ", "gu"), ("げ", "ge"), ("ご", "go"),
    ("さ", "sa"), ("し", "shi"), ("す", "su"), ("せ", "se"), ("そ", "so"),
    ("ざ", "za"), ("じ", "ji"), ("ず", "zu"), ("ぜ", "ze"), ("ぞ", "zo"),
    ("た", "ta"), ("ち", "chi"), ("つ", "tsu"), ("て", "te"), ("と", "to"),
    ("だ", "da"), ("ぢ", "di"), ("づ", "du"), ("で", "de"), ("ど", "do"),
    ("な", "na"), ("に", "ni"), ("ぬ", "nu"), ("ね", "ne"), ("の", "no"),
    ("は", "ha"), ("ひ", "hi"), ("ふ", "fu"), ("へ", "he"), ("ほ", "ho"),
    ("ば", "ba"), ("び", "bi"), ("ぶ", "bu"), ("べ", "be"), ("ぼ", "bo"),
    ("ぱ", "pa"), ("ぴ", "pi"), ("ぷ", "pu"), ("ぺ", "pe"), ("ぽ", "po"),
    ("ま", "ma"), ("み", "mi"), ("む", "mu"), ("め", "me"), ("も", "mo"),
    ("や", "ya"), ("ゆ", "yu"), ("よ", "yo"),
    ("ら", "ra"), ("り", "ri"), ("る", "ru"), ("れ", "re"), ("ろ", "ro"),
    ("わ", "wa"), ("ゐ", "wi"), ("ゑ", "we"), ("を", "wo"), ("ん", "n"),
    ("ゔ", "vu"), ("ー", "-"),
    ("ぁ", "la"), ("ぃ", "li"), ("ぅ", "lu"), ("ぇ", "le"), ("ぉ", "lo"),
    ("ゃ", "lya"), ("ゅ", "lyu"), ("ょ", "lyo"), ("ゎ", "lwa"),
    ("きゃ", "kya"), ("きゅ", "kyu"), ("きょ", "kyo"),
    ("ぎゃ", "gya"), ("ぎゅ", "gyu"), ("ぎょ", "gyo"),
    ("しゃ", "sha"), ("しゅ", "shu"), ("しょ", "sho"), ("しぇ", "she"),
    ("じゃ", "ja"), ("じゅ", "ju"), ("じょ", "jo"), ("じぇ", "je"),
    ("ちゃ", "cha"), ("ちゅ", "chu"), ("ちょ", "cho"), ("ちぇ", "che"),
    ("ぢゃ", "dya"), ("ぢゅ", "dyu"), ("ぢょ", "dyo"),
    ("にゃ", "nya"), ("にゅ", "nyu"), ("にょ", "nyo"),
    ("ひゃ", "hya"), ("ひゅ", "hyu"), ("ひょ", "hyo"),
    ("びゃ", "bya"), ("びゅ", "byu"), ("びょ", "byo"),
    ("ぴゃ", "pya"), ("ぴゅ", "pyu"), ("ぴょ", "pyo"),
    ("みゃ", "mya"), ("みゅ", "myu"), ("みょ", "myo"),
    ("りゃ", "rya"), ("りゅ", "ryu"), ("りょ", "ryo"),
    ("ふぁ", "fa"), ("ふぃ", "fi"), ("ふぇ", "fe"), ("ふぉ", "fo"),
    ("てぃ", "thi"), ("でぃ", "dhi"),
    ("つぁ", "tsa"), ("つぃ", "tsi"), ("つぇ", "tse"), ("つぉ", "tso"),
    ("ゔぁ", "va"), ("ゔぃ", "vi"), ("ゔぇ", "ve"), ("ゔぉ", "vo"),
];

const SOKUON: char = 'っ';

fn kana_map() -> &'static HashMap<&'static str, &'static str> {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| KANA_ROMAJI.iter().copied().collect())
}

/// Romaji for the syllable starting at `pos`, and how many kana it consumed.
fn syllable_at(chars: &[char], pos: usize) -> Option<(&'static str, usize)> {
    let &first = chars.get(pos)?;
    let map = kana_map();
    let mut buf = [0u8; 8];
    if let Some(&next) = chars.get(pos + 1) {
        let pair: String = [first, next].iter().collect();
        if let Some(romaji) = map.get(pair.as_str()) {
            return Some((*romaji, 2));
        }
    }
    let single: &str = first.encode_utf8(&mut buf);
    map.get(single).map(|romaji| (*romaji, 1))
}

/// Derive the romaji key for a hiragana reading.
///
/// Characters outside the table are copied through, so the result is always
/// defined; the caller decides whether such a key is useful.
pub fn hiragana_to_romaji(hiragana: &str) -> String {
    let chars: Vec<char> = hiragana.chars().collect();
    let mut out = String::with_capacity(hiragana.len());
    let mut pos = 0;

    while pos < chars.len() {
        if chars[pos] == SOKUON {
            let doubled = syllable_at(&chars, pos + 1)
                .and_then(|(next, _)| next.chars().next())
                .filter(|&c| c.is_ascii_alphabetic() && !"aiueonlx".contains(c));
            match doubled {
                Some(c) => out.push(c),
                None => out.push_str("xtu"),
            }
            pos += 1;
            continue;
        }
        match syllable_at(&chars, pos) {
            Some((romaji, len)) => {
                out.push_str(romaji);
                pos += len;
            }
            None => {
                out.push(chars[pos]);
                pos += 1;
            }
        }
    }

    out
}
