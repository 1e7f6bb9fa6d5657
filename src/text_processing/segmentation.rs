//! Ingredient-list isolation and tokenization.
//!
//! The label text is expected to be normalized already (see
//! [`TextNormalizer::normalize`](super::TextNormalizer::normalize)).

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

lazy_static! {
    static ref INGREDIENTS_LABEL: Regex =
        Regex::new(r"(?is)ingredients[:\- ]*(.*)").expect("Ingredients label pattern should be valid");
    static ref BULLET_MARKER: Regex =
        Regex::new(r"(?s)\*(.*)").expect("Bullet marker pattern should be valid");
    static ref ALLERGEN_BOUNDARY: Regex =
        Regex::new(r"(?i)\bcontains\b").expect("Allergen boundary pattern should be valid");
    static ref TRAILING_PERCENTAGE: Regex =
        Regex::new(r"\s*\b\d+(?:\.\d+)?\s*%$").expect("Percentage pattern should be valid");
}

/// Extract candidate ingredient tokens from normalized label text.
///
/// Tokens keep their original spelling and appear in source order;
/// repeated ingredients are kept.
///
/// ```rust
/// use label_verdict::text_processing::extract_ingredient_tokens;
///
/// let tokens = extract_ingredient_tokens("Wheat Flour, Sugar (Cane, Beet), Salt");
/// assert_eq!(tokens, vec!["Wheat Flour", "Sugar (Cane, Beet)", "Salt"]);
/// ```
pub fn extract_ingredient_tokens(text: &str) -> Vec<String> {
    let section = locate_ingredient_section(text);
    let section = truncate_at_allergens(section);

    let tokens: Vec<String> = split_top_level_commas(section)
        .iter()
        .filter_map(|part| clean_token(part))
        .collect();

    debug!(
        section_len = section.len(),
        token_count = tokens.len(),
        "Extracted ingredient tokens"
    );
    tokens
}

/// Return the text following the "ingredients" label, falling back to the
/// text after the first `*` bullet, and finally to the whole input.
pub fn locate_ingredient_section(text: &str) -> &str {
    if let Some(section) = INGREDIENTS_LABEL.captures(text).and_then(|c| c.get(1)) {
        trace!("Ingredient section located by label");
        return section.as_str();
    }
    if let Some(section) = BULLET_MARKER.captures(text).and_then(|c| c.get(1)) {
        trace!("Ingredient section located by bullet marker");
        return section.as_str();
    }
    trace!("No ingredient section marker, using whole text");
    text
}

/// Drop the allergen declaration starting at the word "contains".
pub fn truncate_at_allergens(section: &str) -> &str {
    match ALLERGEN_BOUNDARY.find(section) {
        Some(boundary) => &section[..boundary.start()],
        None => section,
    }
}

/// Split on commas outside parentheses.
///
/// Unbalanced closing parentheses are ignored rather than driving the depth
/// negative. Each part is trimmed of edge punctuation and empty parts are
/// discarded.
pub fn split_top_level_commas(section: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth: usize = 0;

    for ch in section.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                push_trimmed(&mut parts, &current);
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    push_trimmed(&mut parts, &current);

    parts
}

fn push_trimmed(parts: &mut Vec<String>, raw: &str) {
    let trimmed = trim_edge_punctuation(raw);
    if !trimmed.is_empty() {
        parts.push(trimmed.to_string());
    }
}

/// Opening brackets survive at the start and closing brackets or `%` at the end.
fn trim_edge_punctuation(raw: &str) -> &str {
    raw.trim_start_matches(|c: char| !(c.is_alphanumeric() || matches!(c, '-' | '(' | '[')))
        .trim_end_matches(|c: char| !(c.is_alphanumeric() || matches!(c, '-' | ')' | ']' | '%')))
}

fn clean_token(part: &str) -> Option<String> {
    let without_percentage = TRAILING_PERCENTAGE.replace(part, "");
    let cleaned = without_percentage.trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ';'));
    if cleaned.is_empty() {
        trace!(part = %part, "Discarding empty ingredient token");
        None
    } else {
        Some(cleaned.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_respects_parentheses() {
        assert_eq!(
            split_top_level_commas("Wheat Flour, Sugar (Cane, Beet), Salt"),
            vec!["Wheat Flour", "Sugar (Cane, Beet)", "Salt"]
        );
    }

    #[test]
    fn test_split_tolerates_unbalanced_closing_parenthesis() {
        assert_eq!(
            split_top_level_commas("Salt), Sugar (Cane, Beet), Water"),
            vec!["Salt)", "Sugar (Cane, Beet)", "Water"]
        );
    }

    #[test]
    fn test_split_with_unclosed_parenthesis_keeps_tail_together() {
        assert_eq!(
            split_top_level_commas("Salt, Sugar (Cane, Beet"),
            vec!["Salt", "Sugar (Cane, Beet"]
        );
    }

    #[test]
    fn test_split_drops_empty_parts() {
        assert_eq!(split_top_level_commas(",, Salt ,;, ."), vec!["Salt"]);
    }

    #[test]
    fn test_percentage_is_stripped() {
        assert_eq!(extract_ingredient_tokens("Palm Oil 24.5%"), vec!["Palm Oil"]);
        assert_eq!(extract_ingredient_tokens("Salt 2 %."), vec!["Salt"]);
    }

    #[test]
    fn test_inner_percentage_is_kept() {
        assert_eq!(
            extract_ingredient_tokens("Cocoa Solids (12%)"),
            vec!["Cocoa Solids (12%)"]
        );
    }

    #[test]
    fn test_section_after_label_and_before_allergens() {
        let text = "Net Wt 200g INGREDIENTS: Wheat, Sugar. CONTAINS: Gluten.";
        assert_eq!(extract_ingredient_tokens(text), vec!["Wheat", "Sugar"]);
    }

    #[test]
    fn test_label_separators() {
        assert_eq!(
            extract_ingredient_tokens("Ingredients - Oats, Honey"),
            vec!["Oats", "Honey"]
        );
        assert_eq!(
            extract_ingredient_tokens("ingredients:Oats,Honey"),
            vec!["Oats", "Honey"]
        );
    }

    #[test]
    fn test_bullet_fallback() {
        assert_eq!(
            extract_ingredient_tokens("Best before 12/2026 * Rice, Salt"),
            vec!["Rice", "Salt"]
        );
    }

    #[test]
    fn test_whole_text_fallback_keeps_duplicates() {
        assert_eq!(
            extract_ingredient_tokens("Salt, Sugar, Salt"),
            vec!["Salt", "Sugar", "Salt"]
        );
    }

    #[test]
    fn test_contains_requires_whole_word() {
        assert_eq!(
            locate_ingredient_section("Ingredients: Uncontainsed, Salt"),
            "Uncontainsed, Salt"
        );
        assert_eq!(truncate_at_allergens("Uncontainsed, Salt"), "Uncontainsed, Salt");
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_ingredient_tokens("").is_empty());
        assert!(extract_ingredient_tokens("INGREDIENTS:").is_empty());
    }
}
