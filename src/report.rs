//! Report rendering: localized text for people, JSON for machines.

use std::fmt;
use std::str::FromStr;

use crate::analysis::{AnalysisReport, IngredientReport, NutritionReport};
use crate::errors::AppResult;
use crate::localization::LocalizationManager;
use crate::rating::{IngredientRating, NutritionRating};
use crate::verdict::IngredientVerdict;

/// Output format of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format '{}'", other)),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// Render in the requested format
pub fn render(
    report: &AnalysisReport,
    format: ReportFormat,
    localization: &LocalizationManager,
    language: &str,
) -> AppResult<String> {
    match format {
        ReportFormat::Text => Ok(render_text(report, localization, language)),
        ReportFormat::Json => render_json(report),
    }
}

/// Pretty-printed JSON document with a `mode` tag
pub fn render_json(report: &AnalysisReport) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Localized plain-text report ending with the overall rating
pub fn render_text(
    report: &AnalysisReport,
    localization: &LocalizationManager,
    language: &str,
) -> String {
    match report {
        AnalysisReport::Ingredients(report) => ingredient_text(report, localization, language),
        AnalysisReport::Nutrition(report) => nutrition_text(report, localization, language),
    }
}

fn ingredient_text(report: &IngredientReport, l10n: &LocalizationManager, language: &str) -> String {
    let mut lines = vec![l10n.get_message_in_language("report-ingredients-title", language, None)];

    if report.findings.is_empty() {
        lines.push(l10n.get_message_in_language("report-no-ingredients", language, None));
    }

    for finding in &report.findings {
        let verdict = l10n.get_message_in_language(verdict_key(finding.verdict), language, None);
        let note = finding.record.note.as_deref().unwrap_or("");
        let mut line = l10n.get_message_with_args_in_language(
            "report-ingredient-line",
            language,
            &[("token", finding.token.as_str()), ("verdict", verdict.as_str()), ("note", note)],
        );
        if let Some(matched) = &finding.record.matched {
            if !matched.eq_ignore_ascii_case(&finding.token) {
                line.push_str(", ");
                line.push_str(&l10n.get_message_with_args_in_language(
                    "report-ingredient-matched",
                    language,
                    &[("matched", matched.as_str())],
                ));
            }
        }
        lines.push(line);
    }

    let rating = l10n.get_message_in_language(ingredient_rating_key(report.rating), language, None);
    let score = report.score.to_string();
    lines.push(String::new());
    lines.push(l10n.get_message_with_args_in_language(
        "report-ingredient-rating",
        language,
        &[("rating", rating.as_str()), ("score", score.as_str())],
    ));

    lines.join("\n")
}

fn nutrition_text(report: &NutritionReport, l10n: &LocalizationManager, language: &str) -> String {
    let mut lines = vec![l10n.get_message_in_language("report-nutrition-title", language, None)];

    if report.findings.is_empty() {
        lines.push(l10n.get_message_in_language("report-no-nutrients", language, None));
    }

    for finding in &report.findings {
        let value = finding
            .record
            .value
            .map(|v| v.to_string())
            .unwrap_or_default();
        let mut line = l10n.get_message_with_args_in_language(
            "report-nutrient-line",
            language,
            &[
                ("name", finding.name.as_str()),
                ("value", value.as_str()),
                ("verdict", finding.record.verdict.as_str()),
            ],
        );
        if let Some(limit) = finding.record.limit {
            let limit = limit.to_string();
            line.push_str(&format!(
                " ({})",
                l10n.get_message_with_args_in_language("report-nutrient-limit", language, &[("limit", limit.as_str())])
            ));
        }
        lines.push(line);
    }

    let rating = l10n.get_message_in_language(nutrition_rating_key(report.rating), language, None);
    let issues = report.issues.to_string();
    lines.push(String::new());
    lines.push(l10n.get_message_with_args_in_language(
        "report-nutrition-rating",
        language,
        &[("rating", rating.as_str()), ("issues", issues.as_str())],
    ));

    lines.join("\n")
}

fn verdict_key(verdict: IngredientVerdict) -> &'static str {
    match verdict {
        IngredientVerdict::Good => "verdict-good",
        IngredientVerdict::Moderate => "verdict-moderate",
        IngredientVerdict::Bad => "verdict-bad",
        IngredientVerdict::Unknown => "verdict-unknown",
    }
}

fn ingredient_rating_key(rating: IngredientRating) -> &'static str {
    match rating {
        IngredientRating::HealthySafe => "rating-healthy-safe",
        IngredientRating::Moderate => "rating-moderate",
        IngredientRating::Unhealthy => "rating-unhealthy",
    }
}

fn nutrition_rating_key(rating: NutritionRating) -> &'static str {
    match rating {
        NutritionRating::Good => "rating-good",
        NutritionRating::MixedModerate => "rating-mixed-moderate",
        NutritionRating::Poor => "rating-poor",
    }
}
