//! Row-boundary recovery for nutrition panels.
//!
//! Tabular panels come out of OCR with rows glued together
//! (`"Energy 250Protein 5.2"`). Every panel row reads "Name ... Number" and
//! every new row starts with a capitalized word, so line breaks are restored:
//!
//! 1. before a capitalized word (`[A-Z][a-z]+` followed by a non-digit) that
//!    does not already start a line;
//! 2. between a digit and a letter that directly follows it;
//! 3. then runs of line breaks and of horizontal whitespace are collapsed.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

lazy_static! {
    static ref CAPITALIZED_WORD: Regex =
        Regex::new(r"[A-Z][a-z]+[^0-9]").expect("Capitalized word pattern should be valid");
    static ref DIGIT_THEN_LETTER: Regex =
        Regex::new(r"(\d)([A-Za-z])").expect("Digit-letter pattern should be valid");
    static ref HORIZONTAL_SPACE_RUN: Regex =
        Regex::new(r"[ \t]+").expect("Horizontal whitespace pattern should be valid");
    static ref LINE_BREAK_RUN: Regex =
        Regex::new(r"\s*\n\s*").expect("Line break pattern should be valid");
}

/// Reinsert the line breaks an OCR pass dropped from a nutrition panel.
///
/// ```rust
/// use label_verdict::text_processing::reconstruct_lines;
///
/// assert_eq!(reconstruct_lines("Energy 250Protein 5.2"), "Energy 250\nProtein 5.2");
/// ```
pub fn reconstruct_lines(text: &str) -> String {
    let text = text.replace('\x0c', "");

    let names_split = break_before_capitalized_words(&text);
    let values_split = DIGIT_THEN_LETTER.replace_all(&names_split, "${1}\n${2}");
    let spaces_collapsed = HORIZONTAL_SPACE_RUN.replace_all(&values_split, " ");
    let lines_collapsed = LINE_BREAK_RUN.replace_all(&spaces_collapsed, "\n");

    let reconstructed = lines_collapsed.trim().to_string();
    trace!(
        line_count = reconstructed.lines().count(),
        "Reconstructed nutrition panel lines"
    );
    reconstructed
}

fn break_before_capitalized_words(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 16);
    let mut last_end = 0;

    for word in CAPITALIZED_WORD.find_iter(text) {
        let start = word.start();
        result.push_str(&text[last_end..start]);
        let preceded_by_break = start == 0 || text[..start].ends_with('\n');
        if !preceded_by_break {
            result.push('\n');
        }
        last_end = start;
    }
    result.push_str(&text[last_end..]);

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_value_glued_to_next_name() {
        assert_eq!(
            reconstruct_lines("Energy 250Protein 5.2"),
            "Energy 250\nProtein 5.2"
        );
    }

    #[test]
    fn test_splits_unit_suffix_from_value() {
        assert_eq!(
            reconstruct_lines("Sodium 600mgVitamin C 12mg"),
            "Sodium 600\nmg\nVitamin C 12\nmg"
        );
    }

    #[test]
    fn test_existing_line_breaks_are_not_doubled() {
        assert_eq!(
            reconstruct_lines("Energy 250\n\n\nProtein 5"),
            "Energy 250\nProtein 5"
        );
    }

    #[test]
    fn test_horizontal_whitespace_collapses() {
        assert_eq!(reconstruct_lines("Sugars \t  10"), "Sugars 10");
    }

    #[test]
    fn test_capitalized_word_before_digit_is_not_split() {
        // "Fe" is followed directly by a digit, so it does not open a row
        assert_eq!(reconstruct_lines("Zn 2 Fe5"), "Zn 2 Fe5");
    }

    #[test]
    fn test_page_breaks_are_dropped() {
        assert_eq!(reconstruct_lines("\x0cEnergy 250"), "Energy 250");
    }

    #[test]
    fn test_multi_word_names_are_split_per_capitalized_word() {
        assert_eq!(reconstruct_lines("Total Fat 17"), "Total\nFat 17");
    }
}
