use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

/// Keypad glyphs and their ASCII operator equivalents.
const OPERATOR_GLYPHS: &[(char, &str)] = &[
    ('×', "*"),
    ('÷', "/"),
    ('−', "-"),
    ('–', "-"),
    ('＋', "+"),
    ('≠', "!="),
    ('≥', ">="),
    ('≤', "<="),
];

/// Words that are part of the formula language rather than variables.
const RESERVED_WORDS: &[&str] = &["AND", "OR", "NOT", "true", "false"];

static IDENTIFIER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z][A-Za-z0-9_]*\b").unwrap());

static STRING_LITERAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#).unwrap());

static NUMERIC_LITERAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").unwrap());

/// Replaces keypad operator glyphs with their ASCII equivalents.
pub fn normalize_operators(formula: &str) -> String {
    if formula.is_ascii() {
        return formula.to_string();
    }
    let mut normalized = String::with_capacity(formula.len());
    for ch in formula.chars() {
        match OPERATOR_GLYPHS.iter().find(|(glyph, _)| *glyph == ch) {
            Some((_, ascii)) => normalized.push_str(ascii),
            None => normalized.push(ch),
        }
    }
    normalized
}

/// Returns true when `text`, ignoring surrounding whitespace, is a decimal number.
pub fn is_numeric_literal(text: &str) -> bool {
    NUMERIC_LITERAL_PATTERN.is_match(text.trim())
}

pub fn is_reserved_word(word: &str) -> bool {
    word.eq_ignore_ascii_case("IF") || RESERVED_WORDS.contains(&word)
}

/// Extracts the distinct variable names a formula refers to, in order of first appearance.
///
/// This never fails: it is called on every keystroke, when the formula is often
/// half-typed. Text inside quoted literals is not scanned.
pub fn extract_identifiers(formula: &str) -> Vec<String> {
    let normalized = normalize_operators(formula);
    let masked = STRING_LITERAL_PATTERN.replace_all(&normalized, |caps: &regex::Captures| {
        " ".repeat(caps[0].len())
    });
    IDENTIFIER_PATTERN
        .find_iter(&masked)
        .map(|m| m.as_str())
        .filter(|word| !is_reserved_word(word) && !is_numeric_literal(word))
        .unique()
        .map(str::to_string)
        .collect()
}
