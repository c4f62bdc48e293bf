//! Hitter name validation and canonicalization
//!
//! Extracted names are noisy: line-score fragments, venue abbreviations and
//! run-on phrases show up in the `name` field. Anything that does not look
//! like "First" or "First Last" is dropped before identity resolution.

use std::collections::HashSet;

/// Why a raw name was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    ContainsDigit,
    TooManyParts,
    StopWord,
    TooFewLetters,
}

/// Name filter with a configurable stop-list
#[derive(Debug, Clone)]
pub struct NameValidator {
    /// Upper-cased non-player tokens
    stop_words: HashSet<String>,
}

impl NameValidator {
    pub fn new<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stop_words: stop_words
                .into_iter()
                .map(|w| w.as_ref().trim().to_uppercase())
                .collect(),
        }
    }

    /// Validator with the built-in venue/team stop-list
    pub fn with_default_stop_words() -> Self {
        Self::new(gs_common::config::DEFAULT_STOP_WORDS)
    }

    pub fn check(&self, raw: &str) -> Result<(), Rejection> {
        if raw.chars().any(is_decimal_digit) {
            return Err(Rejection::ContainsDigit);
        }

        let parts: Vec<&str> = raw.split_whitespace().collect();
        if parts.len() > 2 {
            return Err(Rejection::TooManyParts);
        }
        if parts
            .iter()
            .any(|p| self.stop_words.contains(&p.to_uppercase()))
        {
            return Err(Rejection::StopWord);
        }

        if raw.chars().filter(|c| c.is_alphabetic()).count() < 2 {
            return Err(Rejection::TooFewLetters);
        }
        Ok(())
    }

    pub fn is_valid(&self, raw: &str) -> bool {
        self.check(raw).is_ok()
    }

    /// Validate and canonicalize in one step
    pub fn accept(&self, raw: &str) -> Option<String> {
        self.is_valid(raw).then(|| canonical_key(raw))
    }
}

impl Default for NameValidator {
    fn default() -> Self {
        Self::with_default_stop_words()
    }
}

/// First code point of each ten-digit decimal run (Unicode Nd) in the BMP
const DECIMAL_ZEROS: &[u32] = &[
    0x0030, 0x0660, 0x06F0, 0x07C0, 0x0966, 0x09E6, 0x0A66, 0x0AE6, 0x0B66, 0x0BE6, 0x0C66,
    0x0CE6, 0x0D66, 0x0DE6, 0x0E50, 0x0ED0, 0x0F20, 0x1040, 0x1090, 0x17E0, 0x1810, 0x1946,
    0x19D0, 0x1A80, 0x1A90, 0x1B50, 0x1BB0, 0x1C40, 0x1C50, 0xA620, 0xA8D0, 0xA900, 0xA9D0,
    0xA9F0, 0xAA50, 0xABF0, 0xFF10,
];

/// Decimal digit in any script; fractions, superscripts and numeral letters do not count
fn is_decimal_digit(c: char) -> bool {
    let cp = u32::from(c);
    DECIMAL_ZEROS.iter().any(|&zero| (zero..zero + 10).contains(&cp))
        || (0x1D7CE..=0x1D7FF).contains(&cp)
}

/// Comparison key for a name: lower-case, punctuation replaced by spaces,
/// whitespace collapsed. `"O'Neil,  J."` becomes `"o neil j"`.
pub fn canonical_key(raw: &str) -> String {
    let spaced: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
