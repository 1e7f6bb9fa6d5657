//! # OCR Configuration Module
//!
//! This module defines configuration structures for OCR processing:
//! engine parameters, file limits, the timeout and the preprocessing steps.

use std::env;

use crate::errors::{AppError, AppResult};

// Constants for OCR configuration
pub const DEFAULT_LANGUAGES: &str = "eng";
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB limit for image files
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// Page Segmentation Mode for Tesseract OCR
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PageSegMode {
    /// Orientation and script detection (OSD) only
    OsdOnly = 0,
    /// Automatic page segmentation with OSD
    AutoOsd = 1,
    /// Automatic page segmentation, no OSD
    AutoNoOsd = 2,
    /// Fully automatic page segmentation
    #[default]
    Auto = 3,
    /// Assume a single column of text
    SingleColumn = 4,
    /// Assume a single uniform block of vertically aligned text
    SingleBlockVert = 5,
    /// Assume a single uniform block of text
    SingleBlock = 6,
    /// Treat the image as a single text line
    SingleLine = 7,
    /// Treat the image as a single word
    SingleWord = 8,
    /// Treat the image as a single word in a circle
    WordInCircle = 9,
    /// Treat the image as a single character
    SingleChar = 10,
    /// Find as much text as possible in no particular order
    SparseText = 11,
    /// Sparse text with OSD
    SparseTextOsd = 12,
    /// Treat the image as a single text line, bypassing hacks that are Tesseract-specific
    RawLine = 13,
}

impl PageSegMode {
    /// Convert PSM mode to string value for Tesseract
    pub fn as_str(&self) -> &'static str {
        match self {
            PageSegMode::OsdOnly => "0",
            PageSegMode::AutoOsd => "1",
            PageSegMode::AutoNoOsd => "2",
            PageSegMode::Auto => "3",
            PageSegMode::SingleColumn => "4",
            PageSegMode::SingleBlockVert => "5",
            PageSegMode::SingleBlock => "6",
            PageSegMode::SingleLine => "7",
            PageSegMode::SingleWord => "8",
            PageSegMode::WordInCircle => "9",
            PageSegMode::SingleChar => "10",
            PageSegMode::SparseText => "11",
            PageSegMode::SparseTextOsd => "12",
            PageSegMode::RawLine => "13",
        }
    }

    /// Mode for a Tesseract `--psm` number
    pub fn from_number(number: u8) -> Option<Self> {
        let mode = match number {
            0 => PageSegMode::OsdOnly,
            1 => PageSegMode::AutoOsd,
            2 => PageSegMode::AutoNoOsd,
            3 => PageSegMode::Auto,
            4 => PageSegMode::SingleColumn,
            5 => PageSegMode::SingleBlockVert,
            6 => PageSegMode::SingleBlock,
            7 => PageSegMode::SingleLine,
            8 => PageSegMode::SingleWord,
            9 => PageSegMode::WordInCircle,
            10 => PageSegMode::SingleChar,
            11 => PageSegMode::SparseText,
            12 => PageSegMode::SparseTextOsd,
            13 => PageSegMode::RawLine,
            _ => return None,
        };
        Some(mode)
    }
}

/// Pixel-level cleanup applied before recognition
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessingConfig {
    /// Whether images are cleaned up before OCR at all
    pub enabled: bool,
    /// Gaussian blur sigma used for denoising
    pub blur_sigma: f32,
    /// Unsharp mask sigma
    pub sharpen_sigma: f32,
    /// Unsharp mask threshold (0-255)
    pub sharpen_threshold: i32,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            blur_sigma: 1.0,
            sharpen_sigma: 1.0,
            sharpen_threshold: 5,
        }
    }
}

impl PreprocessingConfig {
    pub fn validate(&self) -> AppResult<()> {
        if !self.blur_sigma.is_finite() || self.blur_sigma < 0.0 || self.blur_sigma > 10.0 {
            return Err(AppError::Config(format!(
                "blur_sigma must be between 0.0 and 10.0, got {}",
                self.blur_sigma
            )));
        }
        if !self.sharpen_sigma.is_finite() || self.sharpen_sigma <= 0.0 {
            return Err(AppError::Config(format!(
                "sharpen_sigma must be greater than 0, got {}",
                self.sharpen_sigma
            )));
        }
        if !(0..=255).contains(&self.sharpen_threshold) {
            return Err(AppError::Config(format!(
                "sharpen_threshold must be between 0 and 255, got {}",
                self.sharpen_threshold
            )));
        }
        Ok(())
    }
}

/// Configuration structure for OCR processing
#[derive(Debug, Clone, PartialEq)]
pub struct OcrConfig {
    /// OCR language codes (e.g., "eng", "eng+fra", "deu")
    pub languages: String,
    /// Default page segmentation mode for OCR
    pub psm_mode: PageSegMode,
    /// Tessdata directory; Tesseract's own default when unset
    pub tessdata_path: Option<String>,
    /// Maximum allowed file size in bytes
    pub max_file_size: u64,
    /// Timeout for one OCR run in seconds
    pub timeout_secs: u64,
    /// Image cleanup before recognition
    pub preprocessing: PreprocessingConfig,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.to_string(),
            psm_mode: PageSegMode::default(),
            tessdata_path: None,
            max_file_size: MAX_FILE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            preprocessing: PreprocessingConfig::default(),
        }
    }
}

impl OcrConfig {
    /// Load OCR configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self {
            languages: env::var("OCR_LANGUAGES").unwrap_or_else(|_| DEFAULT_LANGUAGES.to_string()),
            tessdata_path: env::var("TESSDATA_PREFIX").ok(),
            ..Self::default()
        };

        let psm: u8 = env::var("OCR_PSM")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|_| AppError::Config("OCR_PSM must be a valid number".to_string()))?;
        config.psm_mode = PageSegMode::from_number(psm)
            .ok_or_else(|| AppError::Config(format!("OCR_PSM {} is not a Tesseract mode", psm)))?;

        config.max_file_size = env::var("OCR_MAX_FILE_SIZE")
            .unwrap_or_else(|_| MAX_FILE_SIZE.to_string())
            .parse()
            .map_err(|_| AppError::Config("OCR_MAX_FILE_SIZE must be a valid number".to_string()))?;
        config.timeout_secs = env::var("OCR_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .map_err(|_| AppError::Config("OCR_TIMEOUT_SECS must be a valid number".to_string()))?;

        config.preprocessing.enabled = env::var("OCR_PREPROCESS")
            .unwrap_or_else(|_| "true".to_string())
            .to_lowercase()
            == "true";
        config.preprocessing.blur_sigma = env::var("OCR_BLUR_SIGMA")
            .unwrap_or_else(|_| "1.0".to_string())
            .parse()
            .map_err(|_| AppError::Config("OCR_BLUR_SIGMA must be a valid number".to_string()))?;

        Ok(config)
    }

    /// Validate OCR configuration parameters
    pub fn validate(&self) -> AppResult<()> {
        if self.languages.trim().is_empty() {
            return Err(AppError::Config("languages cannot be empty".to_string()));
        }

        if self.max_file_size == 0 {
            return Err(AppError::Config(
                "max_file_size must be greater than 0".to_string(),
            ));
        }

        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(AppError::Config(format!(
                "timeout_secs must be between 1 and {}, got {}",
                MAX_TIMEOUT_SECS, self.timeout_secs
            )));
        }

        self.preprocessing.validate()?;

        Ok(())
    }
}
