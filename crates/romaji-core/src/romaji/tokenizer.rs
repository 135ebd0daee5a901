use tracing::trace;

use super::table::RomajiTable;

const SOKUON: char = 'っ';
const HATSUON: &str = "ん";

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'i' | 'u' | 'e' | 'o')
}

fn is_vowel_or_y(c: char) -> bool {
    is_vowel(c) || c == 'y'
}

/// Consonants that may be doubled into a sokuon. `n`, `l` and `x` carry other
/// meanings when doubled ("nn" = ん, "ll"/"xx" = small-kana prefixes).
fn is_geminable(c: char) -> bool {
    c.is_ascii_lowercase() && !is_vowel(c) && !matches!(c, 'n' | 'l' | 'x')
}

/// "n" + vowel/y is a syllable only when the next character is not itself a
/// vowel/y; otherwise the "n" stands alone.
fn is_standalone_n(chars: &[char], pos: usize) -> bool {
    chars[pos] == 'n'
        && chars.get(pos + 1).is_some_and(|&c| is_vowel_or_y(c))
        && chars.get(pos + 2).is_some_and(|&c| is_vowel_or_y(c))
}

impl RomajiTable {
    /// Convert a romaji word to kana.
    ///
    /// Characters that no rule covers are copied through unchanged.
    pub fn transliterate(&self, word: &str) -> String {
        let chars: Vec<char> = word.to_lowercase().chars().collect();
        let mut out = String::with_capacity(word.len() * 3);
        let mut pos = 0;

        while pos < chars.len() {
            if self.is_geminate_at(&chars, pos) {
                out.push(SOKUON);
                pos += 1;
                continue;
            }
            match self.match_at(&chars, pos) {
                Some((len, kana)) => {
                    out.push_str(kana);
                    pos += len;
                }
                None => {
                    trace!(ch = %chars[pos], pos, "no romaji rule, passing through");
                    out.push(chars[pos]);
                    pos += 1;
                }
            }
        }

        out
    }

    /// Whether any substring of `word` matches a rule.
    pub fn contains_romaji(&self, word: &str) -> bool {
        let chars: Vec<char> = word.to_lowercase().chars().collect();
        (0..chars.len()).any(|pos| self.matches_at(&chars, pos).next().is_some())
    }

    /// Longest rule at `pos`, with the standalone-"n" exception applied to
    /// two-character "n" + vowel/y matches.
    fn match_at<'a>(&'a self, chars: &'a [char], pos: usize) -> Option<(usize, &'a str)> {
        let (len, kana) = self.matches_at(chars, pos).next()?;
        if len == 2 && is_standalone_n(chars, pos) {
            return Some((1, HATSUON));
        }
        Some((len, kana))
    }

    fn is_geminate_at(&self, chars: &[char], pos: usize) -> bool {
        let c = chars[pos];
        chars.get(pos + 1) == Some(&c)
            && is_geminable(c)
            && self.matches_at(chars, pos + 1).next().is_some()
    }
}

/// Convert a romaji word to kana with the process-wide table.
pub fn transliterate(word: &str) -> String {
    RomajiTable::global().transliterate(word)
}

/// Whether `word` looks like romaji under the process-wide table.
pub fn contains_romaji(word: &str) -> bool {
    RomajiTable::global().contains_romaji(word)
}
