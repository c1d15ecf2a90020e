use std::fmt;
use std::str::FromStr;

use isolang::Language as IsoLanguage;
use serde::{Deserialize, Serialize};

use crate::errors::TranslationError;

/// Language utilities for the supported language set
///
/// Only English, Hindi and Marathi are supported. Codes are accepted as
/// display names, ISO 639-1 or ISO 639-3, case-insensitively; anything else
/// is rejected instead of being passed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    Hindi,
    Marathi,
}

impl Language {
    /// All supported languages, in UI order
    pub const ALL: [Language; 3] = [Language::English, Language::Hindi, Language::Marathi];

    fn iso(self) -> IsoLanguage {
        match self {
            Self::English => IsoLanguage::Eng,
            Self::Hindi => IsoLanguage::Hin,
            Self::Marathi => IsoLanguage::Mar,
        }
    }

    /// ISO 639-1 code ("en", "hi", "mr")
    pub fn code(self) -> &'static str {
        self.iso().to_639_1().unwrap_or_else(|| self.iso().to_639_3())
    }

    /// English display name ("Hindi")
    pub fn name(self) -> &'static str {
        self.iso().to_name()
    }

    /// Whether the language is written in Devanagari
    pub fn uses_devanagari(self) -> bool {
        matches!(self, Self::Hindi | Self::Marathi)
    }

    fn from_iso(lang: IsoLanguage) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.iso() == lang)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Language {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();

        if let Some(lang) = Self::ALL
            .into_iter()
            .find(|l| l.name().to_lowercase() == normalized)
        {
            return Ok(lang);
        }

        let iso = match normalized.len() {
            2 => IsoLanguage::from_639_1(&normalized),
            3 => IsoLanguage::from_639_3(&normalized),
            _ => None,
        };

        iso.and_then(Self::from_iso)
            .ok_or_else(|| TranslationError::UnsupportedLanguage(s.trim().to_string()))
    }
}

/// Normalize a "source_target" pair token, e.g. "EN-hi" -> "en_hi"
///
/// Both halves must be supported languages.
pub fn normalize_pair_key(key: &str) -> Result<String, TranslationError> {
    let (source, target) = key
        .trim()
        .split_once(['_', '-'])
        .ok_or_else(|| TranslationError::UnsupportedLanguage(key.to_string()))?;
    let source: Language = source.parse()?;
    let target: Language = target.parse()?;
    Ok(pair_key(source, target))
}

/// Build the canonical pair token for two languages
pub fn pair_key(source: Language, target: Language) -> String {
    format!("{}_{}", source.code(), target.code())
}

/// Whether a character belongs to the Devanagari block (or its extension)
pub fn is_devanagari(c: char) -> bool {
    matches!(c, '\u{0900}'..='\u{097F}' | '\u{A8E0}'..='\u{A8FF}')
}

/// Whether text looks like romanized input: ASCII only, no target-script characters
pub fn looks_romanized(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii() && (c.is_ascii_graphic() || c.is_ascii_whitespace()))
}
