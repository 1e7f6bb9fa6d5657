//! # Text Processing Module
//!
//! This module turns raw OCR output from packaged-food labels into structured
//! candidates for vocabulary matching.
//!
//! ## Features
//!
//! - OCR substitution repair and whitespace collapse ([`TextNormalizer`])
//! - Ingredient-list isolation and nesting-aware comma splitting
//!   ([`extract_ingredient_tokens`])
//! - Row-boundary recovery for nutrition panels whose lines were merged by OCR
//!   ([`reconstruct_lines`])
//! - `label value` pair extraction from reconstructed panel lines
//!   ([`extract_pairs`])
//!
//! All functions here are pure: they borrow the input text and allocate a new
//! result, so they can be shared freely across threads.

pub mod line_reconstruction;
pub mod normalization;
pub mod pair_extraction;
pub mod segmentation;

pub use line_reconstruction::reconstruct_lines;
pub use normalization::TextNormalizer;
pub use pair_extraction::{extract_pairs, Pair};
pub use segmentation::{extract_ingredient_tokens, split_top_level_commas};
