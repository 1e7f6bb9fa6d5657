//! # Label Verdict
//!
//! Extracts ingredient lists and nutrition facts from OCR text of packaged-food
//! labels, resolves them against canonical rule tables and computes a health
//! verdict per entity plus an overall rating.

pub mod analysis;
pub mod config;
pub mod errors;
pub mod localization;
pub mod matching;
pub mod observability;
pub mod observability_config;
pub mod ocr;
pub mod ocr_config;
pub mod ocr_errors;
pub mod preprocessing;
pub mod rating;
pub mod report;
pub mod similarity;
pub mod text_processing;
pub mod verdict;
pub mod vocabulary;

// Re-export types for easier access
pub use analysis::{AnalysisMode, AnalysisReport, IngredientAnalyzer, LabelAnalyzer, NutritionAnalyzer};
pub use errors::{AppError, AppResult};
pub use vocabulary::{IngredientVocabulary, NutrientVocabulary};
