//! # Analysis Pipelines
//!
//! Wires the text processing, matching and verdict stages together:
//!
//! - ingredients: normalize → isolate and split the list → match each token →
//!   verdict per token → aggregate score;
//! - nutrition: correct → reconstruct rows → extract pairs → match each label →
//!   verdict per pair → issue count.
//!
//! Analyzers borrow their vocabulary and scorer, so one loaded table can back
//! any number of analyzers across threads.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info};

use crate::matching::{MatchPolicy, VocabularyMatcher};
use crate::observability;
use crate::rating::{IngredientRating, NutritionRating};
use crate::similarity::SimilarityScorer;
use crate::text_processing::{extract_ingredient_tokens, extract_pairs, reconstruct_lines, TextNormalizer};
use crate::verdict::{classify_ingredient, evaluate_ingredient, evaluate_nutrient, IngredientVerdict, VerdictRecord};
use crate::vocabulary::{IngredientVocabulary, NutrientVocabulary};

/// Which kind of label is being analysed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Ingredients,
    Nutrition,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Ingredients => "ingredients",
            AnalysisMode::Nutrition => "nutrition",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = String;

    /// Accepts the menu numbers as well as the mode names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "ingredients" | "ingredient" => Ok(AnalysisMode::Ingredients),
            "2" | "nutrition" | "nutrients" => Ok(AnalysisMode::Nutrition),
            other => Err(format!("invalid choice '{}'", other)),
        }
    }
}

/// Verdict for one ingredient token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientFinding {
    /// Token as extracted from the label
    pub token: String,
    #[serde(skip)]
    pub verdict: IngredientVerdict,
    #[serde(flatten)]
    pub record: VerdictRecord,
}

/// Result of analysing an ingredient list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientReport {
    /// One finding per token, in extraction order
    pub findings: Vec<IngredientFinding>,
    pub score: i64,
    pub rating: IngredientRating,
}

/// Verdict for one nutrient entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientFinding {
    /// Canonical nutrient name, or the raw label when nothing matched
    pub name: String,
    #[serde(flatten)]
    pub record: VerdictRecord,
}

/// Result of analysing a nutrition panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionReport {
    /// One finding per distinct name, in first-appearance order
    pub findings: Vec<NutrientFinding>,
    pub issues: usize,
    pub rating: NutritionRating,
}

impl NutritionReport {
    /// Finding for a canonical name or raw label
    pub fn get(&self, name: &str) -> Option<&VerdictRecord> {
        self.findings
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.record)
    }
}

/// Ingredient list pipeline
pub struct IngredientAnalyzer<'a> {
    vocabulary: &'a IngredientVocabulary,
    matcher: VocabularyMatcher<'a>,
    normalizer: TextNormalizer,
}

impl<'a> IngredientAnalyzer<'a> {
    pub fn new(
        vocabulary: &'a IngredientVocabulary,
        scorer: &'a dyn SimilarityScorer,
        cutoff: f64,
    ) -> Self {
        Self {
            vocabulary,
            matcher: VocabularyMatcher::new(scorer, MatchPolicy::ingredients(cutoff)),
            normalizer: TextNormalizer::new(),
        }
    }

    /// Replace the default OCR correction table
    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn analyze(&self, raw: &str) -> IngredientReport {
        let _span = observability::analysis_span(AnalysisMode::Ingredients.as_str()).entered();
        let start = Instant::now();

        let text = self.normalizer.normalize(raw);
        let tokens = extract_ingredient_tokens(&text);

        let findings: Vec<IngredientFinding> = tokens
            .into_iter()
            .map(|token| {
                let result = self.matcher.match_query(&token, self.vocabulary);
                let verdict = classify_ingredient(result.entry());
                let record = evaluate_ingredient(result.entry());
                observability::record_verdict(AnalysisMode::Ingredients.as_str(), verdict.as_str());
                IngredientFinding {
                    token,
                    verdict,
                    record,
                }
            })
            .collect();

        let score = IngredientRating::score(findings.iter().map(|f| &f.verdict));
        let rating = IngredientRating::from_score(score);

        let duration = start.elapsed();
        observability::record_analysis(AnalysisMode::Ingredients.as_str(), duration);
        info!(
            tokens = findings.len(),
            matched = findings.iter().filter(|f| f.record.matched.is_some()).count(),
            score,
            rating = %rating,
            duration_ms = duration.as_millis(),
            "Ingredient analysis completed"
        );

        IngredientReport {
            findings,
            score,
            rating,
        }
    }
}

/// Nutrition panel pipeline
pub struct NutritionAnalyzer<'a> {
    vocabulary: &'a NutrientVocabulary,
    matcher: VocabularyMatcher<'a>,
    normalizer: TextNormalizer,
}

impl<'a> NutritionAnalyzer<'a> {
    pub fn new(
        vocabulary: &'a NutrientVocabulary,
        scorer: &'a dyn SimilarityScorer,
        cutoff: f64,
    ) -> Self {
        Self {
            vocabulary,
            matcher: VocabularyMatcher::new(scorer, MatchPolicy::nutrients(cutoff)),
            normalizer: TextNormalizer::new(),
        }
    }

    /// Replace the default OCR correction table
    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn analyze(&self, raw: &str) -> NutritionReport {
        let _span = observability::analysis_span(AnalysisMode::Nutrition.as_str()).entered();
        let start = Instant::now();

        let text = reconstruct_lines(&self.normalizer.correct(raw));
        let pairs = extract_pairs(&text);

        let mut findings: Vec<NutrientFinding> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for pair in pairs {
            let result = self.matcher.match_query(&pair.label, self.vocabulary);
            let name = result
                .entry()
                .map(|entry| entry.name.clone())
                .unwrap_or_else(|| pair.label.clone());
            let record = evaluate_nutrient(pair.value, result.entry());
            observability::record_verdict(
                AnalysisMode::Nutrition.as_str(),
                verdict_class(&record.verdict),
            );

            match positions.get(&name) {
                Some(&index) => {
                    debug!(name = %name, label = %pair.label, "Later label resolves to the same nutrient, overwriting");
                    findings[index].record = record;
                }
                None => {
                    positions.insert(name.clone(), findings.len());
                    findings.push(NutrientFinding { name, record });
                }
            }
        }

        let issues = NutritionRating::count_issues(findings.iter().map(|f| f.record.verdict.as_str()));
        let rating = NutritionRating::from_issue_count(issues);

        let duration = start.elapsed();
        observability::record_analysis(AnalysisMode::Nutrition.as_str(), duration);
        info!(
            nutrients = findings.len(),
            issues,
            rating = %rating,
            duration_ms = duration.as_millis(),
            "Nutrition analysis completed"
        );

        NutritionReport {
            findings,
            issues,
            rating,
        }
    }
}

/// Result of one analysis, either kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AnalysisReport {
    Ingredients(IngredientReport),
    Nutrition(NutritionReport),
}

impl AnalysisReport {
    pub fn mode(&self) -> AnalysisMode {
        match self {
            AnalysisReport::Ingredients(_) => AnalysisMode::Ingredients,
            AnalysisReport::Nutrition(_) => AnalysisMode::Nutrition,
        }
    }

    /// Overall rating label
    pub fn rating(&self) -> &'static str {
        match self {
            AnalysisReport::Ingredients(report) => report.rating.as_str(),
            AnalysisReport::Nutrition(report) => report.rating.as_str(),
        }
    }
}

impl From<IngredientReport> for AnalysisReport {
    fn from(report: IngredientReport) -> Self {
        AnalysisReport::Ingredients(report)
    }
}

impl From<NutritionReport> for AnalysisReport {
    fn from(report: NutritionReport) -> Self {
        AnalysisReport::Nutrition(report)
    }
}

/// Both pipelines over one pair of loaded vocabularies
pub struct LabelAnalyzer<'a> {
    ingredients: IngredientAnalyzer<'a>,
    nutrition: NutritionAnalyzer<'a>,
}

impl<'a> LabelAnalyzer<'a> {
    pub fn new(
        ingredients: &'a IngredientVocabulary,
        nutrients: &'a NutrientVocabulary,
        scorer: &'a dyn SimilarityScorer,
        cutoff: f64,
    ) -> Self {
        Self {
            ingredients: IngredientAnalyzer::new(ingredients, scorer, cutoff),
            nutrition: NutritionAnalyzer::new(nutrients, scorer, cutoff),
        }
    }

    pub fn analyze(&self, mode: AnalysisMode, raw: &str) -> AnalysisReport {
        match mode {
            AnalysisMode::Ingredients => self.ingredients.analyze(raw).into(),
            AnalysisMode::Nutrition => self.nutrition.analyze(raw).into(),
        }
    }
}

/// Verdict text without its note, for low-cardinality metric labels
fn verdict_class(verdict: &str) -> &str {
    verdict.split(" - ").next().unwrap_or(verdict)
}
