/*!
 * Text normalization before transliteration and fixed Hindi output rules.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Common romanized spellings mapped to the form ITRANS renders correctly
const ROMANIZED_VARIANTS: &[(&str, &str)] = &[
    ("namastey", "namaste"),
    ("namasthe", "namaste"),
    ("dhanyawad", "dhanyavad"),
    ("shukriyaa", "shukriya"),
];

/// Acronyms and their Hindi letter-name spelling
pub const HINDI_ACRONYMS: &[(&str, &str)] = &[
    ("NLP", "एनएलपी"),
    ("AI", "एआई"),
    ("ML", "एमएल"),
    ("API", "एपीआई"),
    ("CPU", "सीपीयू"),
    ("GPU", "जीपीयू"),
    ("URL", "यूआरएल"),
    ("USB", "यूएसबी"),
    ("PDF", "पीडीएफ"),
    ("SMS", "एसएमएस"),
];

/// Progressive verbs ("-ing" form) and their Hindi stems
const PROGRESSIVE_VERBS: &[(&str, &str)] = &[
    ("learning", "सीख"),
    ("reading", "पढ़"),
    ("writing", "लिख"),
    ("eating", "खा"),
    ("going", "जा"),
    ("coming", "आ"),
    ("playing", "खेल"),
    ("working", "काम कर"),
    ("studying", "पढ़ाई कर"),
    ("speaking", "बोल"),
    ("watching", "देख"),
    ("teaching", "सिखा"),
    ("doing", "कर"),
];

static VARIANT_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    ROMANIZED_VARIANTS
        .iter()
        .filter_map(|(variant, canonical)| {
            Regex::new(&format!(r"\b{}\b", regex::escape(variant)))
                .ok()
                .map(|re| (re, *canonical))
        })
        .collect()
});

static ACRONYM_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    let alternatives: Vec<String> = HINDI_ACRONYMS.iter().map(|(a, _)| regex::escape(a)).collect();
    Regex::new(&format!(r"\b({})\b", alternatives.join("|"))).ok()
});

static PROGRESSIVE_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^(?i:i\s+am|i'm|im)\s+([A-Za-z]+ing)\b(.*)$").ok()
});

/// Normalize romanized input before transliteration
///
/// Lowercases (ITRANS treats capitals as retroflex, e.g. "Na" -> ण) and
/// rewrites whole-word spelling variants such as "namastey".
pub fn normalize_romanized(text: &str) -> String {
    let mut normalized = text.trim().to_lowercase();
    for (pattern, canonical) in VARIANT_PATTERNS.iter() {
        normalized = pattern.replace_all(&normalized, *canonical).into_owned();
    }
    normalized
}

fn hindi_acronym(acronym: &str) -> Option<&'static str> {
    HINDI_ACRONYMS
        .iter()
        .find(|(a, _)| *a == acronym)
        .map(|(_, spelling)| *spelling)
}

/// Standalone acronyms found in `text`, in order of first appearance
pub fn find_acronyms(text: &str) -> Vec<&'static str> {
    let Some(pattern) = ACRONYM_PATTERN.as_ref() else {
        return Vec::new();
    };
    let mut found: Vec<&'static str> = Vec::new();
    for capture in pattern.find_iter(text) {
        if let Some((acronym, _)) = HINDI_ACRONYMS.iter().find(|(a, _)| *a == capture.as_str()) {
            if !found.contains(acronym) {
                found.push(acronym);
            }
        }
    }
    found
}

/// A piece of source text around known acronyms
#[derive(Debug, Clone, PartialEq)]
pub enum TextPiece<'a> {
    /// Text between acronyms, unmodified
    Plain(&'a str),
    /// A known acronym, already in its Hindi spelling
    Acronym(&'static str),
}

/// Split `text` so acronyms can bypass transliteration
pub fn split_acronyms(text: &str) -> Vec<TextPiece<'_>> {
    let Some(pattern) = ACRONYM_PATTERN.as_ref() else {
        return vec![TextPiece::Plain(text)];
    };
    let mut pieces = Vec::new();
    let mut last = 0;
    for found in pattern.find_iter(text) {
        let Some(spelling) = hindi_acronym(found.as_str()) else {
            continue;
        };
        if found.start() > last {
            pieces.push(TextPiece::Plain(&text[last..found.start()]));
        }
        pieces.push(TextPiece::Acronym(spelling));
        last = found.end();
    }
    if last < text.len() {
        pieces.push(TextPiece::Plain(&text[last..]));
    }
    pieces
}

/// Replace Latin acronyms in `output` with their Hindi spelling
///
/// Acronyms seen in the source but missing from the output in either script
/// are appended so the term is not lost.
pub fn apply_acronym_rule(source: &str, output: &str) -> String {
    let mut result = match ACRONYM_PATTERN.as_ref() {
        Some(pattern) => pattern
            .replace_all(output, |caps: &regex::Captures| {
                hindi_acronym(&caps[1]).unwrap_or(&caps[1]).to_string()
            })
            .into_owned(),
        None => output.to_string(),
    };

    for acronym in find_acronyms(source) {
        if let Some(spelling) = hindi_acronym(acronym) {
            if !result.contains(spelling) {
                debug!("Appending missing acronym {} to output", acronym);
                result = format!("{} {}", result.trim_end(), spelling);
            }
        }
    }
    result
}

/// Corrected phrasing for "I am <verb>ing [ACRONYM...]"
///
/// Applies only when the verb is known and every remaining word is a known
/// acronym, so the whole sentence can be rendered without a model.
pub fn progressive_phrase(source: &str) -> Option<String> {
    let captures = PROGRESSIVE_PATTERN.as_ref()?.captures(source.trim())?;
    let verb = captures.get(1)?.as_str().to_lowercase();
    let stem = PROGRESSIVE_VERBS
        .iter()
        .find(|(v, _)| *v == verb)
        .map(|(_, stem)| *stem)?;

    let rest = captures.get(2).map_or("", |m| m.as_str());
    let mut objects = Vec::new();
    for word in rest.split_whitespace() {
        let word = word.trim_matches(|c: char| c.is_ascii_punctuation());
        if word.is_empty() {
            continue;
        }
        objects.push(hindi_acronym(word)?);
    }

    let mut phrase = String::from("मैं ");
    for object in objects {
        phrase.push_str(object);
        phrase.push(' ');
    }
    phrase.push_str(stem);
    phrase.push_str(" रहा हूँ");
    Some(phrase)
}

/// Apply every fixed Hindi rule to a model output
pub fn apply_hindi_rules(source: &str, output: &str) -> String {
    if let Some(phrase) = progressive_phrase(source) {
        debug!("Progressive-aspect rule rewrote output to '{}'", phrase);
        return phrase;
    }
    apply_acronym_rule(source, output)
}
