//! OCR substitution repair and whitespace normalization.

use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use tracing::{debug, trace};

/// Known OCR corruptions on food labels and their corrections, applied in order.
///
/// Word entries only match whole words; ligature entries match anywhere.
pub const DEFAULT_CORRECTIONS: &[(&str, &str)] = &[
    ("Mea", "Meal"),
    ("Eaible", "Edible"),
    ("Palmelein", "Palmolein"),
    ("Com", "Corn"),
    ("Orion", "Onion"),
    ("tng", "Ginger"),
    ("\u{FB01}", "fi"),
    ("\u{FB02}", "fl"),
];

lazy_static! {
    static ref WHITESPACE_RUN: Regex =
        Regex::new(r"\s+").expect("Whitespace pattern should be valid");
    static ref DEFAULT_RULES: Vec<CorrectionRule> = compile_rules(DEFAULT_CORRECTIONS)
        .expect("Default OCR correction patterns should be valid");
}

#[derive(Debug, Clone)]
struct CorrectionRule {
    pattern: Regex,
    replacement: String,
}

fn compile_rules(corrections: &[(&str, &str)]) -> Result<Vec<CorrectionRule>, regex::Error> {
    corrections
        .iter()
        .map(|(from, to)| {
            let escaped = regex::escape(from);
            let is_word = from.chars().all(|c| c.is_ascii_alphanumeric());
            let pattern = if is_word {
                format!(r"(?i)\b{}\b", escaped)
            } else {
                format!("(?i){}", escaped)
            };
            Ok(CorrectionRule {
                pattern: Regex::new(&pattern)?,
                replacement: to.to_string(),
            })
        })
        .collect()
}

/// Repairs documented OCR substitution errors in label text.
///
/// ```rust
/// use label_verdict::text_processing::TextNormalizer;
///
/// let normalizer = TextNormalizer::new();
/// assert_eq!(
///     normalizer.normalize("Com  Starch,\x0cEaible Oil"),
///     "Corn Starch, Edible Oil"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    rules: Vec<CorrectionRule>,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    /// Create a normalizer with the built-in correction table
    pub fn new() -> Self {
        Self {
            rules: DEFAULT_RULES.clone(),
        }
    }

    /// Create a normalizer with a custom ordered correction table
    pub fn with_corrections(corrections: &[(&str, &str)]) -> Result<Self, regex::Error> {
        Ok(Self {
            rules: compile_rules(corrections)?,
        })
    }

    /// Apply the substitution table only, keeping line structure intact.
    ///
    /// Form-feed page breaks become line breaks.
    pub fn correct(&self, text: &str) -> String {
        let mut corrected = text.replace('\x0c', "\n");
        for rule in &self.rules {
            let replaced = rule
                .pattern
                .replace_all(&corrected, rule.replacement.as_str());
            if let Cow::Owned(rewritten) = replaced {
                trace!(
                    pattern = %rule.pattern.as_str(),
                    replacement = %rule.replacement,
                    "OCR correction applied"
                );
                corrected = rewritten;
            }
        }
        corrected
    }

    /// Apply the substitution table, then collapse every whitespace run
    /// (line breaks and page breaks included) to one space and trim.
    pub fn normalize(&self, text: &str) -> String {
        let corrected = self.correct(text);
        let normalized = WHITESPACE_RUN.replace_all(&corrected, " ").trim().to_string();
        debug!(
            input_len = text.len(),
            output_len = normalized.len(),
            "Normalized OCR text"
        );
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_corrections_are_case_insensitive() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("COM flour"), "Corn flour");
        assert_eq!(normalizer.normalize("orion powder"), "Onion powder");
        assert_eq!(normalizer.normalize("Soya Mea"), "Soya Meal");
    }

    #[test]
    fn test_word_corrections_need_word_boundaries() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("Compound"), "Compound");
        assert_eq!(normalizer.normalize("Meal"), "Meal");
    }

    #[test]
    fn test_ligatures_are_expanded_inside_words() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("re\u{FB01}ned \u{FB02}our"), "refined flour");
    }

    #[test]
    fn test_whitespace_and_page_breaks_collapse() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("  Sugar,\n\n Salt\t\x0c Water  "),
            "Sugar, Salt Water"
        );
    }

    #[test]
    fn test_correct_keeps_line_breaks() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.correct("Energy 250\x0cCom 12\nSalt 1"),
            "Energy 250\nCorn 12\nSalt 1"
        );
    }

    #[test]
    fn test_numbers_are_untouched() {
        let normalizer = TextNormalizer::new();
        let text = "Palm Oil 24.5%, Salt 1.2 %, E150d";
        assert_eq!(normalizer.normalize(text), text);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let normalizer = TextNormalizer::new();
        let samples = [
            "INGREDIENTS: Com, Mea, tng\n\x0cPalmelein Oil (24%)",
            "  ",
            "Eaible   Vegetable Oil, Orion",
            "\u{FB01}\u{FB02}",
        ];
        for sample in samples {
            let once = normalizer.normalize(sample);
            assert_eq!(normalizer.normalize(&once), once, "input: {:?}", sample);
        }
    }

    #[test]
    fn test_later_rules_see_earlier_rewrites() {
        let normalizer =
            TextNormalizer::with_corrections(&[("Suger", "Sugar"), ("Sugar", "Cane Sugar")])
                .unwrap();
        assert_eq!(normalizer.normalize("Suger"), "Cane Sugar");
    }
}
