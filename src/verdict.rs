//! # Verdict Engine
//!
//! Turns a resolved (or unresolved) vocabulary entry into a [`VerdictRecord`].
//! Ingredient verdicts depend on the rule's severity class only; nutrient
//! verdicts compare the measured value with the rule's limit according to its
//! flag.

use serde::Serialize;
use std::fmt;

use crate::vocabulary::{IngredientRule, NutrientFlag, NutrientRule, Severity, VocabularyEntry};

/// Verdict text for a nutrient label with no matching rule
pub const NO_RULE_FOUND: &str = "No rule found";
/// Note attached to an ingredient with no matching rule
pub const NOT_IN_DATASET: &str = "Not found in dataset";
/// Verdict text for a nutrient value within its limit
pub const OK: &str = "OK";

/// Classification of one ingredient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IngredientVerdict {
    Good,
    Moderate,
    Bad,
    Unknown,
}

impl IngredientVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientVerdict::Good => "Good",
            IngredientVerdict::Moderate => "Moderate",
            IngredientVerdict::Bad => "Bad",
            IngredientVerdict::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for IngredientVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&Severity> for IngredientVerdict {
    fn from(severity: &Severity) -> Self {
        match severity {
            Severity::Bad => IngredientVerdict::Bad,
            Severity::Moderate => IngredientVerdict::Moderate,
            Severity::Good => IngredientVerdict::Good,
            Severity::Unrecognized(_) => IngredientVerdict::Unknown,
        }
    }
}

/// Verdict for one extracted token or pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerdictRecord {
    /// Canonical name of the matched entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
    pub verdict: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl VerdictRecord {
    fn bare(verdict: impl Into<String>) -> Self {
        Self {
            matched: None,
            verdict: verdict.into(),
            note: None,
            value: None,
            limit: None,
            flag: None,
            severity: None,
            category: None,
            score: None,
        }
    }
}

/// Classify an ingredient by the severity of its matched rule
pub fn classify_ingredient(entry: Option<&VocabularyEntry<IngredientRule>>) -> IngredientVerdict {
    entry
        .map(|e| IngredientVerdict::from(&e.rule.severity))
        .unwrap_or(IngredientVerdict::Unknown)
}

/// Build the verdict record for an ingredient token
pub fn evaluate_ingredient(entry: Option<&VocabularyEntry<IngredientRule>>) -> VerdictRecord {
    let verdict = classify_ingredient(entry);
    match entry {
        Some(entry) => {
            let rule = &entry.rule;
            VerdictRecord {
                matched: Some(entry.name.clone()),
                note: Some(rule.note.clone()),
                severity: Some(rule.severity_label.clone()),
                category: Some(rule.category.clone()),
                score: rule.score,
                ..VerdictRecord::bare(verdict.as_str())
            }
        }
        None => VerdictRecord {
            note: Some(NOT_IN_DATASET.to_string()),
            ..VerdictRecord::bare(verdict.as_str())
        },
    }
}

/// Verdict text for a measured nutrient value under `rule`.
///
/// ```rust
/// use label_verdict::verdict::nutrient_verdict;
/// use label_verdict::vocabulary::{NutrientFlag, NutrientRule};
///
/// let rule = NutrientRule { limit: 5.0, flag: NutrientFlag::High, note: "X".to_string() };
/// assert_eq!(nutrient_verdict(10.0, &rule), "High - X");
/// assert_eq!(nutrient_verdict(3.0, &rule), "OK");
/// ```
pub fn nutrient_verdict(value: f64, rule: &NutrientRule) -> String {
    let marker = match &rule.flag {
        NutrientFlag::High if value > rule.limit => "High",
        NutrientFlag::Low if value < rule.limit => "Low",
        NutrientFlag::Caution if value > rule.limit => "Caution",
        NutrientFlag::Harmful if value > rule.limit => "Avoid Immediately",
        NutrientFlag::High
        | NutrientFlag::Low
        | NutrientFlag::Caution
        | NutrientFlag::Harmful
        | NutrientFlag::Ok => return OK.to_string(),
        NutrientFlag::Unrecognized(_) => return OK.to_string(),
    };
    format!("{} - {}", marker, rule.note)
}

/// Build the verdict record for a measured nutrient value
pub fn evaluate_nutrient(value: f64, entry: Option<&VocabularyEntry<NutrientRule>>) -> VerdictRecord {
    match entry {
        Some(entry) => {
            let rule = &entry.rule;
            VerdictRecord {
                matched: Some(entry.name.clone()),
                note: Some(rule.note.clone()),
                value: Some(value),
                limit: Some(rule.limit),
                flag: Some(rule.flag.to_string()),
                ..VerdictRecord::bare(nutrient_verdict(value, rule))
            }
        }
        None => VerdictRecord {
            value: Some(value),
            ..VerdictRecord::bare(NO_RULE_FOUND)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nutrient(limit: f64, flag: NutrientFlag) -> VocabularyEntry<NutrientRule> {
        VocabularyEntry {
            name: "Sugars, g".to_string(),
            key: "sugarsg".to_string(),
            rule: NutrientRule {
                limit,
                flag,
                note: "X".to_string(),
            },
        }
    }

    fn ingredient(severity: &str) -> VocabularyEntry<IngredientRule> {
        VocabularyEntry {
            name: "Sugar".to_string(),
            key: "sugar".to_string(),
            rule: IngredientRule {
                severity_label: severity.to_string(),
                severity: Severity::parse(severity),
                category: "sweetener".to_string(),
                note: "Added sugar".to_string(),
                score: Some(-2.0),
                extra: Vec::new(),
            },
        }
    }

    #[test]
    fn test_high_flag_crossing_and_not() {
        let entry = nutrient(5.0, NutrientFlag::High);
        let over = evaluate_nutrient(10.0, Some(&entry));
        assert!(over.verdict.contains("High"));
        assert!(over.verdict.contains('X'));
        assert_eq!(evaluate_nutrient(3.0, Some(&entry)).verdict, "OK");
        // the limit itself is not a crossing
        assert_eq!(evaluate_nutrient(5.0, Some(&entry)).verdict, "OK");
    }

    #[test]
    fn test_each_flag_template() {
        assert_eq!(nutrient_verdict(1.0, &nutrient(3.0, NutrientFlag::Low).rule), "Low - X");
        assert_eq!(nutrient_verdict(4.0, &nutrient(3.0, NutrientFlag::Low).rule), "OK");
        assert_eq!(
            nutrient_verdict(101.0, &nutrient(100.0, NutrientFlag::Caution).rule),
            "Caution - X"
        );
        assert_eq!(
            nutrient_verdict(0.1, &nutrient(0.0, NutrientFlag::Harmful).rule),
            "Avoid Immediately - X"
        );
        assert_eq!(nutrient_verdict(999.0, &nutrient(0.0, NutrientFlag::Ok).rule), "OK");
        assert_eq!(
            nutrient_verdict(
                999.0,
                &nutrient(0.0, NutrientFlag::Unrecognized("odd".to_string())).rule
            ),
            "OK"
        );
    }

    #[test]
    fn test_matched_nutrient_record_fields() {
        let record = evaluate_nutrient(12.0, Some(&nutrient(5.0, NutrientFlag::High)));
        assert_eq!(record.matched.as_deref(), Some("Sugars, g"));
        assert_eq!(record.value, Some(12.0));
        assert_eq!(record.limit, Some(5.0));
        assert_eq!(record.flag.as_deref(), Some("high"));
        assert_eq!(record.note.as_deref(), Some("X"));
    }

    #[test]
    fn test_unmatched_nutrient() {
        let record = evaluate_nutrient(7.0, None);
        assert_eq!(record.verdict, NO_RULE_FOUND);
        assert_eq!(record.matched, None);
        assert_eq!(record.value, Some(7.0));
    }

    #[test]
    fn test_ingredient_severity_classes() {
        assert_eq!(classify_ingredient(Some(&ingredient("HARMFUL"))), IngredientVerdict::Bad);
        assert_eq!(classify_ingredient(Some(&ingredient("caution"))), IngredientVerdict::Moderate);
        assert_eq!(classify_ingredient(Some(&ingredient("Safe"))), IngredientVerdict::Good);
        assert_eq!(classify_ingredient(Some(&ingredient("spicy"))), IngredientVerdict::Unknown);
        assert_eq!(classify_ingredient(None), IngredientVerdict::Unknown);
    }

    #[test]
    fn test_ingredient_records() {
        let record = evaluate_ingredient(Some(&ingredient("bad")));
        assert_eq!(record.verdict, "Bad");
        assert_eq!(record.matched.as_deref(), Some("Sugar"));
        assert_eq!(record.severity.as_deref(), Some("bad"));
        assert_eq!(record.score, Some(-2.0));

        let missing = evaluate_ingredient(None);
        assert_eq!(missing.verdict, "Unknown");
        assert_eq!(missing.note.as_deref(), Some(NOT_IN_DATASET));
        assert_eq!(missing.matched, None);
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let json = serde_json::to_value(evaluate_nutrient(7.0, None)).unwrap();
        assert_eq!(json, serde_json::json!({"verdict": "No rule found", "value": 7.0}));
    }
}
