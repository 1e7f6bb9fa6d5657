//! # Report Tests
//!
//! Rendering complete analyses in both output formats.

use label_verdict::analysis::{AnalysisMode, AnalysisReport, LabelAnalyzer};
use label_verdict::localization::LocalizationManager;
use label_verdict::matching::DEFAULT_CUTOFF;
use label_verdict::report::{render, render_json, ReportFormat};
use label_verdict::similarity::SequenceRatio;
use label_verdict::vocabulary::{load_ingredient_vocabulary, NutrientVocabulary};
use std::path::PathBuf;

fn analyze(mode: AnalysisMode, text: &str) -> AnalysisReport {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/ingredient_dataset.csv");
    let ingredients = load_ingredient_vocabulary(&path).unwrap();
    let nutrients = NutrientVocabulary::builtin().unwrap();
    LabelAnalyzer::new(&ingredients, &nutrients, &SequenceRatio, DEFAULT_CUTOFF).analyze(mode, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_json_document() {
        let report = analyze(AnalysisMode::Ingredients, "Ingredients: Sugr, Xylophone Dust");
        let value: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();

        assert_eq!(value["mode"], "ingredients");
        assert_eq!(value["score"], -1);
        assert_eq!(value["rating"], "Moderate");

        let findings = value["findings"].as_array().unwrap();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0]["token"], "Sugr");
        assert_eq!(findings[0]["matched"], "Sugar");
        assert_eq!(findings[0]["verdict"], "Bad");
        assert_eq!(findings[0]["category"], "sweetener");
        assert_eq!(findings[1]["verdict"], "Unknown");
        assert_eq!(findings[1]["note"], "Not found in dataset");
        assert!(findings[1].get("matched").is_none());
    }

    #[test]
    fn test_nutrition_json_document() {
        let report = analyze(AnalysisMode::Nutrition, "Energy 300Sodium 100");
        let value: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();

        assert_eq!(value["mode"], "nutrition");
        assert_eq!(value["issues"], 1);
        assert_eq!(value["rating"], "Mixed/Moderate");

        let energy = &value["findings"][0];
        assert_eq!(energy["name"], "Energy, kcal");
        assert_eq!(energy["value"], 300.0);
        assert_eq!(energy["limit"], 250.0);
        assert_eq!(energy["flag"], "high");
        assert_eq!(energy["verdict"], "High - High calorie density");
        assert_eq!(value["findings"][1]["verdict"], "OK");
    }

    #[test]
    fn test_english_text_report() {
        let l10n = LocalizationManager::new().unwrap();
        let report = analyze(AnalysisMode::Ingredients, "Ingredients: Sugr, Oats");
        let text = render(&report, ReportFormat::Text, &l10n, "en").unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Ingredient analysis");
        assert_eq!(
            lines[1],
            "- Sugr: Bad (Added sugar linked to obesity and diabetes), matched as Sugar"
        );
        assert_eq!(lines[2], "- Oats: Good (Whole grain rich in soluble fibre)");
        assert_eq!(*lines.last().unwrap(), "Overall ingredient rating: Moderate (score 0)");
    }

    #[test]
    fn test_french_nutrition_text_report() {
        let l10n = LocalizationManager::new().unwrap();
        let report = analyze(AnalysisMode::Nutrition, "Sodium 700");
        let text = render(&report, ReportFormat::Text, &l10n, "fr").unwrap();

        assert!(text.starts_with("Analyse nutritionnelle"));
        assert!(text.contains("- Sodium, mg : 700 → High - Excess sodium linked to high BP (limite 600)"));
        assert!(text.ends_with("Évaluation nutritionnelle globale : Mitigé/Modéré (1 signalé(s))"));
    }
}
