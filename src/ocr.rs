//! # OCR Processing Module
//!
//! Turns a label photo into raw text for the analysis pipelines.
//!
//! ## Features
//!
//! - Image validation (existence, size limits, recognised raster format)
//! - Optional cleanup before recognition (see [`crate::preprocessing`])
//! - Tesseract text extraction through `leptess`
//! - A timeout around the blocking OCR call; no retries
//!
//! The [`TextSource`] trait is the seam between the pipelines and the engine,
//! so hosts and tests can substitute their own text provider.

use leptess::LepTess;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::errors::error_logging;
use crate::observability;
use crate::ocr_config::OcrConfig;
use crate::ocr_errors::OcrError;
use crate::preprocessing::prepare_for_ocr;

const FORMAT_DETECTION_BUFFER_SIZE: usize = 32;

/// Something that can read the text printed in an image
pub trait TextSource: Send + Sync {
    fn extract_text(&self, image_path: &Path) -> Result<String, OcrError>;
}

/// Validate an image path and return the file size in bytes
pub fn validate_image_path(image_path: &Path, config: &OcrConfig) -> Result<u64, OcrError> {
    let shown = image_path.display();

    if !image_path.exists() {
        return Err(OcrError::Validation(format!("file does not exist ({})", shown)));
    }
    if !image_path.is_file() {
        return Err(OcrError::Validation(format!("path is not a file ({})", shown)));
    }

    let file_size = image_path
        .metadata()
        .map_err(|e| OcrError::Validation(format!("cannot read file metadata ({}) - {}", shown, e)))?
        .len();
    if file_size == 0 {
        return Err(OcrError::Validation(format!("file is empty ({})", shown)));
    }
    if file_size > config.max_file_size {
        return Err(OcrError::Validation(format!(
            "file too large ({} bytes, maximum allowed: {} bytes)",
            file_size, config.max_file_size
        )));
    }

    let mut header = Vec::with_capacity(FORMAT_DETECTION_BUFFER_SIZE);
    File::open(image_path)
        .and_then(|file| file.take(FORMAT_DETECTION_BUFFER_SIZE as u64).read_to_end(&mut header))
        .map_err(|e| OcrError::Validation(format!("cannot read file ({}) - {}", shown, e)))?;
    image::guess_format(&header)
        .map_err(|_| OcrError::Validation(format!("unsupported or unrecognised image format ({})", shown)))?;

    Ok(file_size)
}

/// Tesseract-backed text source
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    config: OcrConfig,
}

impl TesseractOcr {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    fn recognize(&self, image_path: &Path) -> Result<String, OcrError> {
        let image_uri = image_path
            .to_str()
            .ok_or_else(|| OcrError::ImageLoad(format!("path is not valid UTF-8 ({})", image_path.display())))?;

        let mut tess = LepTess::new(self.config.tessdata_path.as_deref(), &self.config.languages)
            .map_err(|e| OcrError::Initialization(format!("Failed to initialize Tesseract OCR instance: {}", e)))?;
        tess.set_variable(
            leptess::Variable::TesseditPagesegMode,
            self.config.psm_mode.as_str(),
        )
        .map_err(|e| OcrError::Initialization(format!("Failed to set PSM mode: {}", e)))?;

        tess.set_image(image_uri)
            .map_err(|e| OcrError::ImageLoad(format!("Failed to load image for OCR: {e}")))?;
        tess.get_utf8_text()
            .map_err(|e| OcrError::Extraction(format!("Failed to extract text from image: {e}")))
    }
}

impl TextSource for TesseractOcr {
    fn extract_text(&self, image_path: &Path) -> Result<String, OcrError> {
        if self.config.preprocessing.enabled {
            let prepared = prepare_for_ocr(image_path, &self.config.preprocessing)?;
            self.recognize(prepared.path())
        } else {
            self.recognize(image_path)
        }
    }
}

/// Trim every line and drop blank ones
pub fn clean_extracted_text(text: &str) -> String {
    text.trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Run `source` on the blocking pool, giving up after `timeout`
pub async fn extract_text_with_timeout(
    source: Arc<dyn TextSource>,
    image_path: PathBuf,
    timeout: Duration,
) -> Result<String, OcrError> {
    let task = tokio::task::spawn_blocking(move || source.extract_text(&image_path));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(OcrError::Extraction(format!(
            "OCR task failed: {}",
            join_error
        ))),
        Err(_) => Err(OcrError::Timeout(format!(
            "OCR operation timed out after {} seconds",
            timeout.as_secs_f64()
        ))),
    }
}

/// Validate the image, run OCR under the configured timeout and clean the text
pub async fn extract_label_text(
    image_path: &Path,
    config: &OcrConfig,
    source: Arc<dyn TextSource>,
) -> Result<String, OcrError> {
    let span = observability::ocr_span("extract_label_text");
    let _enter = span.enter();
    let start_time = Instant::now();

    let image_size = validate_image_path(image_path, config).inspect_err(|e| {
        error_logging::log_validation_error(e, "extract_label_text", "image_path", image_path.to_str());
    })?;

    info!(image = %image_path.display(), image_size, "Starting OCR text extraction");

    let result = extract_text_with_timeout(
        source,
        image_path.to_path_buf(),
        Duration::from_secs(config.timeout_secs),
    )
    .await;
    let duration = start_time.elapsed();
    observability::record_ocr_metrics(result.is_ok(), duration, image_size);

    match result {
        Ok(text) => {
            let cleaned = clean_extracted_text(&text);
            info!(
                duration_ms = duration.as_millis(),
                characters = cleaned.len(),
                "OCR extraction completed"
            );
            if cleaned.is_empty() {
                warn!(image = %image_path.display(), "OCR produced no text");
            }
            Ok(cleaned)
        }
        Err(e) => {
            error_logging::log_ocr_error(&e, "extract_label_text", Some(image_size), Some(duration));
            Err(e)
        }
    }
}
