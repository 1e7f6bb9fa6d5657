//! Aggregate ratings over a whole label.

use serde::Serialize;
use std::fmt;

use crate::verdict::IngredientVerdict;

/// Overall rating of an ingredient list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IngredientRating {
    #[serde(rename = "Healthy/Safe")]
    HealthySafe,
    Moderate,
    Unhealthy,
}

impl IngredientRating {
    /// +1 per good ingredient, -1 per bad one
    pub fn score<'a, I>(verdicts: I) -> i64
    where
        I: IntoIterator<Item = &'a IngredientVerdict>,
    {
        verdicts
            .into_iter()
            .map(|verdict| match verdict {
                IngredientVerdict::Good => 1,
                IngredientVerdict::Moderate | IngredientVerdict::Unknown => 0,
                IngredientVerdict::Bad => -1,
            })
            .sum()
    }

    pub fn from_score(score: i64) -> Self {
        if score > 2 {
            IngredientRating::HealthySafe
        } else if score >= -1 {
            IngredientRating::Moderate
        } else {
            IngredientRating::Unhealthy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientRating::HealthySafe => "Healthy/Safe",
            IngredientRating::Moderate => "Moderate",
            IngredientRating::Unhealthy => "Unhealthy",
        }
    }
}

impl fmt::Display for IngredientRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall rating of a nutrition panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NutritionRating {
    Good,
    #[serde(rename = "Mixed/Moderate")]
    MixedModerate,
    Poor,
}

impl NutritionRating {
    /// Whether a verdict text counts as an issue
    pub fn is_issue(verdict: &str) -> bool {
        let verdict = verdict.to_lowercase();
        verdict.contains("high") || verdict.contains("harmful")
    }

    /// Number of verdict texts that count as issues
    pub fn count_issues<'a, I>(verdicts: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        verdicts.into_iter().filter(|v| Self::is_issue(v)).count()
    }

    pub fn from_issue_count(issues: usize) -> Self {
        match issues {
            0 => NutritionRating::Good,
            1..=2 => NutritionRating::MixedModerate,
            _ => NutritionRating::Poor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NutritionRating::Good => "Good",
            NutritionRating::MixedModerate => "Mixed/Moderate",
            NutritionRating::Poor => "Poor",
        }
    }
}

impl fmt::Display for NutritionRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
