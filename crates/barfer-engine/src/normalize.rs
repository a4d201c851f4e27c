//! Text normalization for free-text product and option labels.
//!
//! [`normalize`] is the minimal case/whitespace fold. [`normalize_label`]
//! builds on it and is what the classifier and matcher compare against:
//! accents folded, punctuation dropped, quantity descriptors rewritten to one
//! canonical spelling, and noise words trimmed from both ends.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use rust_decimal::Decimal;

/// Words operators prepend or append to labels that carry no product identity.
const NOISE_WORDS: &[&str] = &["BARFER", "PRODUCTO", "PROMO", "OFERTA", "NUEVO", "NUEVA"];

macro_rules! pattern {
    ($name:ident, $pat:expr) => {
        pub(crate) fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("valid weight regex"))
        }
    };
}

// Patterns run against upper-cased text.
pattern!(
    kilogram_pattern,
    r"(\d+(?:[.,]\d+)?)\s*(?:KILOGRAMOS?|KILOS?|KGS?)\b"
);
pattern!(gram_pattern, r"(\d+(?:[.,]\d+)?)\s*(?:GRAMOS?|GRS?|G)\b");
pattern!(multiplier_pattern, r"\bX\s*(\d+)\b");
pattern!(weight_token_pattern, r"^(?:\d+(?:\.\d+)?(?:KG|GRS)|X\d+)$");

/// Upper-cases, collapses whitespace runs to a single space, and trims.
///
/// Pure and total: the empty string maps to the empty string.
#[must_use]
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes a label for comparison.
///
/// On top of [`normalize`]: folds Spanish diacritics, turns punctuation into
/// spaces (decimal separators between digits survive), rewrites quantity
/// descriptors with [`canonicalize_weights`], and strips [`NOISE_WORDS`]
/// from either end. A label made only of noise keeps its last word.
#[must_use]
pub fn normalize_label(s: &str) -> String {
    let upper = normalize(s);
    let chars: Vec<char> = upper.chars().map(fold_accent).collect();

    let mut cleaned = String::with_capacity(chars.len());
    for (idx, &c) in chars.iter().enumerate() {
        let between_digits = idx > 0
            && chars[idx - 1].is_ascii_digit()
            && chars.get(idx + 1).is_some_and(char::is_ascii_digit);
        if c.is_alphanumeric() || ((c == '.' || c == ',') && between_digits) {
            cleaned.push(c);
        } else {
            cleaned.push(' ');
        }
    }

    let canonical = canonicalize_weights(&cleaned);
    let mut words: Vec<&str> = canonical.split_whitespace().collect();

    while words.len() > 1 && NOISE_WORDS.contains(&words[0]) {
        words.remove(0);
    }
    while words.len() > 1 && words.last().is_some_and(|w| NOISE_WORDS.contains(w)) {
        words.pop();
    }

    words.join(" ")
}

/// Rewrites quantity descriptors in upper-cased text to a single spelling:
/// `10 KGS` → `10KG`, `2,5 KILOS` → `2.5KG`, `200 GR` → `200GRS`,
/// `X 50` → `X50`. Numbers lose redundant zeros (`10.0KG` → `10KG`).
#[must_use]
pub fn canonicalize_weights(upper: &str) -> String {
    let kg = kilogram_pattern().replace_all(upper, |caps: &Captures| {
        format!("{}KG", canonical_number(&caps[1]))
    });
    let grams = gram_pattern().replace_all(&kg, |caps: &Captures| {
        format!("{}GRS", canonical_number(&caps[1]))
    });
    multiplier_pattern()
        .replace_all(&grams, |caps: &Captures| {
            format!("X{}", canonical_number(&caps[1]))
        })
        .into_owned()
}

/// `true` for a canonical quantity token such as `10KG`, `200GRS` or `X50`.
#[must_use]
pub fn is_weight_token(word: &str) -> bool {
    weight_token_pattern().is_match(word)
}

/// Parses a captured number (`.` or `,` decimal separator) into a [`Decimal`].
pub(crate) fn parse_number(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&raw.replace(',', ".")).ok()
}

fn canonical_number(raw: &str) -> String {
    parse_number(raw).map_or_else(|| raw.replace(',', "."), |d| d.normalize().to_string())
}

fn fold_accent(c: char) -> char {
    match c {
        'Á' | 'À' | 'Ä' | 'Â' | 'Ã' => 'A',
        'É' | 'È' | 'Ë' | 'Ê' => 'E',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'Ó' | 'Ò' | 'Ö' | 'Ô' | 'Õ' => 'O',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
        'Ñ' => 'N',
        'Ç' => 'C',
        other => other,
    }
}
