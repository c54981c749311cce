//! Canonical normal form for noisy scanned text.
//!
//! # Responsibility
//! - Collapse the input variations seen on shop-floor labels: stray
//!   whitespace, full-width alphanumerics from IME input, letter case.
//!
//! # Invariants
//! - `normalize` is idempotent.
//! - The output contains no whitespace of any kind.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// First code point of the full-width ASCII block (`！` U+FF01).
const FULLWIDTH_FIRST: char = '\u{FF01}';
/// Last code point of the full-width ASCII block (`～` U+FF5E).
const FULLWIDTH_LAST: char = '\u{FF5E}';
/// Fixed offset between a full-width form and its ASCII equivalent.
const FULLWIDTH_OFFSET: u32 = 0xFEE0;

/// Canonicalizes free text for fuzzy comparison.
///
/// Steps, in order:
/// 1. trim leading/trailing whitespace;
/// 2. remove every internal whitespace run entirely (identifiers in this
///    domain are space-insensitive);
/// 3. fold the full-width block U+FF01..=U+FF5E onto its half-width
///    equivalents;
/// 4. lowercase.
///
/// Empty input normalizes to the empty string.
pub fn normalize(text: &str) -> String {
    let compact = WHITESPACE_RE.replace_all(text.trim(), "");
    compact
        .chars()
        .map(to_half_width)
        .collect::<String>()
        .to_lowercase()
}

fn to_half_width(ch: char) -> char {
    if (FULLWIDTH_FIRST..=FULLWIDTH_LAST).contains(&ch) {
        // The block is a contiguous mirror of ASCII, so a fixed offset is safe.
        char::from_u32(ch as u32 - FULLWIDTH_OFFSET).unwrap_or(ch)
    } else {
        ch
    }
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn trims_and_removes_internal_whitespace() {
        assert_eq!(normalize("  Door Unit 1  "), "doorunit1");
        assert_eq!(normalize("a\t b\nc"), "abc");
    }

    #[test]
    fn removes_ideographic_space() {
        assert_eq!(normalize("building\u{3000}a"), "buildinga");
    }

    #[test]
    fn folds_full_width_block_to_ascii() {
        assert_eq!(normalize("ＰＡＯ１０１２ＢＬ"), "pao1012bl");
        assert_eq!(normalize("（ＦＲ－０１）"), "(fr-01)");
    }

    #[test]
    fn lowercases_after_folding() {
        assert_eq!(normalize("ＡbＣ"), "abc");
    }

    #[test]
    fn empty_and_blank_normalize_to_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \u{3000} "), "");
    }

    #[test]
    fn is_idempotent() {
        for raw in ["  Ｄｏｏｒ Unit １ ", "芯材 カット", "", "ABC"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn output_never_contains_whitespace() {
        for raw in [" a b ", "x\u{3000}y", "\t\n", "ｗ ｉｄｅ"] {
            assert!(!normalize(raw).chars().any(char::is_whitespace));
        }
    }
}
