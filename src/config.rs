//! # Unified Application Configuration
//!
//! This module consolidates all settings into a single configuration object
//! loaded from environment variables and validated before any work starts.

use std::env;
use std::path::PathBuf;

use crate::errors::{AppError, AppResult};
use crate::matching::DEFAULT_CUTOFF;
use crate::observability_config::ObservabilityConfig;
use crate::ocr_config::OcrConfig;
use crate::report::ReportFormat;
use crate::similarity::SimilarityAlgorithm;

pub const DEFAULT_INGREDIENT_DATASET_PATH: &str = "config/ingredient_dataset.csv";

/// Where the rule tables come from
#[derive(Debug, Clone, PartialEq)]
pub struct VocabularyConfig {
    /// Ingredient dataset (CSV)
    pub ingredient_dataset_path: PathBuf,
    /// Nutrient thresholds (JSON); the built-in table when unset
    pub nutrient_thresholds_path: Option<PathBuf>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            ingredient_dataset_path: PathBuf::from(DEFAULT_INGREDIENT_DATASET_PATH),
            nutrient_thresholds_path: None,
        }
    }
}

impl VocabularyConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.ingredient_dataset_path.as_os_str().is_empty() {
            return Err(AppError::Config(
                "Ingredient dataset path cannot be empty".to_string(),
            ));
        }
        if let Some(path) = &self.nutrient_thresholds_path {
            if path.as_os_str().is_empty() {
                return Err(AppError::Config(
                    "Nutrient thresholds path cannot be empty when set".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Fuzzy matching settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchingConfig {
    /// Minimum similarity for a fuzzy match, in (0, 1]
    pub cutoff: f64,
    pub algorithm: SimilarityAlgorithm,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            algorithm: SimilarityAlgorithm::default(),
        }
    }
}

impl MatchingConfig {
    pub fn validate(&self) -> AppResult<()> {
        if !(self.cutoff > 0.0 && self.cutoff <= 1.0) {
            return Err(AppError::Config(format!(
                "Fuzzy match cutoff must be in (0, 1], got {}",
                self.cutoff
            )));
        }
        Ok(())
    }
}

/// Report output settings
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub format: ReportFormat,
    /// Language of text reports
    pub language: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            language: "en".to_string(),
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> AppResult<()> {
        if !crate::localization::SUPPORTED_LANGUAGES.contains(&self.language.as_str()) {
            return Err(AppError::Config(format!(
                "Unsupported report language '{}'",
                self.language
            )));
        }
        Ok(())
    }
}

/// Unified application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Rule table sources
    pub vocabulary: VocabularyConfig,
    /// Fuzzy matching configuration
    pub matching: MatchingConfig,
    /// OCR processing configuration
    pub ocr: OcrConfig,
    /// Report configuration
    pub report: ReportConfig,
    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();

        // Load rule table locations
        if let Ok(path) = env::var("INGREDIENT_DATASET_PATH") {
            config.vocabulary.ingredient_dataset_path = PathBuf::from(path);
        }
        config.vocabulary.nutrient_thresholds_path =
            env::var("NUTRIENT_THRESHOLDS_PATH").ok().map(PathBuf::from);

        // Load matching configuration
        config.matching.cutoff = env::var("FUZZY_MATCH_CUTOFF")
            .unwrap_or_else(|_| DEFAULT_CUTOFF.to_string())
            .parse()
            .map_err(|_| AppError::Config("FUZZY_MATCH_CUTOFF must be a valid number".to_string()))?;
        config.matching.algorithm = env::var("SIMILARITY_ALGORITHM")
            .unwrap_or_else(|_| "sequence".to_string())
            .parse()
            .map_err(|e: String| AppError::Config(format!("SIMILARITY_ALGORITHM: {}", e)))?;

        // Load report configuration
        config.report.format = env::var("REPORT_FORMAT")
            .unwrap_or_else(|_| "text".to_string())
            .parse()
            .map_err(|e: String| AppError::Config(format!("REPORT_FORMAT: {}", e)))?;
        config.report.language = env::var("REPORT_LANGUAGE")
            .unwrap_or_else(|_| "en".to_string())
            .to_lowercase();

        // Load OCR and observability configuration
        config.ocr = OcrConfig::from_env()?;
        config.observability = ObservabilityConfig::from_env();

        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> AppResult<()> {
        self.vocabulary.validate()?;
        self.matching.validate()?;
        self.ocr.validate()?;
        self.report.validate()?;
        self.observability.validate()?;
        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: ingredients={}, nutrients={}, cutoff={}, algorithm={}, ocr_languages={}, report={}/{}",
            self.vocabulary.ingredient_dataset_path.display(),
            self.vocabulary
                .nutrient_thresholds_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "builtin".to_string()),
            self.matching.cutoff,
            self.matching.algorithm,
            self.ocr.languages,
            self.report.format,
            self.report.language
        )
    }
}
