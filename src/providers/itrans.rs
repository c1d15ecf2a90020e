use crate::errors::ProviderError;
use crate::language_utils::Language;
use crate::providers::TransliterationProvider;

const HALANTA: char = '\u{094d}';

/// Vowels as (ITRANS, independent form, dependent sign); longest first
const VOWELS: &[(&str, &str, &str)] = &[
    ("aa", "आ", "ा"),
    ("ai", "ऐ", "ै"),
    ("au", "औ", "ौ"),
    ("ii", "ई", "ी"),
    ("ee", "ई", "ी"),
    ("uu", "ऊ", "ू"),
    ("oo", "ऊ", "ू"),
    ("a", "अ", ""),
    ("i", "इ", "ि"),
    ("u", "उ", "ु"),
    ("e", "ए", "े"),
    ("o", "ओ", "ो"),
];

/// Consonants as (ITRANS, Devanagari); longest first
const CONSONANTS: &[(&str, &str)] = &[
    ("ksh", "क्ष"),
    ("chh", "छ"),
    ("kh", "ख"),
    ("gh", "घ"),
    ("ch", "च"),
    ("jh", "झ"),
    ("th", "थ"),
    ("dh", "ध"),
    ("ph", "फ"),
    ("bh", "भ"),
    ("sh", "श"),
    ("gy", "ज्ञ"),
    ("k", "क"),
    ("g", "ग"),
    ("c", "च"),
    ("j", "ज"),
    ("t", "त"),
    ("d", "द"),
    ("n", "न"),
    ("p", "प"),
    ("b", "ब"),
    ("m", "म"),
    ("y", "य"),
    ("r", "र"),
    ("l", "ल"),
    ("v", "व"),
    ("w", "व"),
    ("s", "स"),
    ("h", "ह"),
    ("f", "फ़"),
    ("z", "ज़"),
    ("q", "क़"),
    ("x", "क्स"),
];

/// ITRANS-style romanization to Devanagari
///
/// Expects lowercase input; capital ITRANS letters (retroflex series) are not
/// distinguished. A consonant not followed by a vowel carries a virama, as in
/// ITRANS ("namaste" -> "नमस्ते", "ram" -> "राम्").
#[derive(Debug, Default, Clone)]
pub struct ItransTransliterator;

impl ItransTransliterator {
    pub fn new() -> Self {
        Self
    }

    /// Transliterates a full roman string.
    pub fn to_devanagari(&self, roman: &str) -> String {
        let mut result = String::with_capacity(roman.len() * 3);
        let mut rest = roman;
        let mut last_was_consonant = false;

        while let Some(c) = rest.chars().next() {
            if let Some((token, devanagari)) = match_prefix(rest, CONSONANTS) {
                if last_was_consonant {
                    result.push(HALANTA);
                }
                result.push_str(devanagari);
                last_was_consonant = true;
                rest = &rest[token.len()..];
                continue;
            }

            if let Some((token, independent, sign)) = match_vowel(rest) {
                result.push_str(if last_was_consonant { sign } else { independent });
                last_was_consonant = false;
                rest = &rest[token.len()..];
                continue;
            }

            if last_was_consonant {
                result.push(HALANTA);
                last_was_consonant = false;
            }
            result.push(map_symbol(c));
            rest = &rest[c.len_utf8()..];
        }

        if last_was_consonant {
            result.push(HALANTA);
        }

        result
    }
}

fn match_prefix<'a>(text: &str, table: &'a [(&'a str, &'a str)]) -> Option<(&'a str, &'a str)> {
    table.iter().find(|(token, _)| text.starts_with(token)).copied()
}

fn match_vowel(text: &str) -> Option<(&'static str, &'static str, &'static str)> {
    VOWELS.iter().find(|(token, _, _)| text.starts_with(token)).copied()
}

fn map_symbol(c: char) -> char {
    match c {
        '0'..='9' => char::from_u32('०' as u32 + (c as u32 - '0' as u32)).unwrap_or(c),
        '|' => '।',
        _ => c,
    }
}

impl TransliterationProvider for ItransTransliterator {
    fn transliterate(&self, text: &str, target: Language) -> Result<String, ProviderError> {
        if !target.uses_devanagari() {
            return Err(ProviderError::Unavailable(format!(
                "No transliteration scheme for {}",
                target
            )));
        }
        // Hindi and Marathi share Devanagari.
        Ok(self.to_devanagari(text))
    }

    fn scheme(&self) -> &str {
        "ITRANS"
    }
}
