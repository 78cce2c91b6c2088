// src/matching/normalize.rs - Canonical-form transform for raw country names

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// Parenthesized annotations and the whitespace around them, e.g.
// "Congo (Kinshasa)" or "Iran (Islamic Republic of)".
static PAREN_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([^)]*\)\s*").expect("parenthetical pattern is valid"));

/// Normalizes one raw country name:
/// underscores become single spaces, parenthesized segments are stripped
/// together with surrounding whitespace, and accented characters are
/// NFKD-decomposed with non-ASCII remnants dropped. Casing and remaining
/// internal spacing are preserved.
///
/// A name consisting solely of a parenthetical collapses to the empty
/// string; downstream treats that as an unresolved mismatch, never as a
/// silent match.
pub fn normalize_name(raw: &str) -> String {
    let spaced = raw.replace('_', " ");
    let stripped = PAREN_SEGMENT.replace_all(&spaced, "");
    stripped.nfkd().filter(|c| c.is_ascii()).collect()
}

/// Normalizes a whole name column. Returns a new vector of the same length
/// and order; the caller's data is never touched in place.
pub fn normalize_names(names: &[String]) -> Vec<String> {
    names.iter().map(|name| normalize_name(name)).collect()
}
