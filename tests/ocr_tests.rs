//! # OCR Tests Module
//!
//! Test suite for the OCR collaborator: configuration, image validation,
//! preprocessing and the timeout-guarded extraction path. A fake text source
//! stands in for Tesseract so the tests run without tessdata.

#[cfg(test)]
mod tests {
    use image::{DynamicImage, GrayImage, Luma};
    use label_verdict::ocr::{extract_label_text, validate_image_path, TextSource};
    use label_verdict::ocr_config::{OcrConfig, PreprocessingConfig};
    use label_verdict::ocr_errors::OcrError;
    use label_verdict::preprocessing::prepare_for_ocr;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct FixedText(&'static str);

    impl TextSource for FixedText {
        fn extract_text(&self, _image_path: &Path) -> Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingSource;

    impl TextSource for FailingSource {
        fn extract_text(&self, _image_path: &Path) -> Result<String, OcrError> {
            Err(OcrError::Extraction("engine crashed".to_string()))
        }
    }

    /// Write a small two-tone PNG and return its directory and path
    fn label_png() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label.png");
        let image = GrayImage::from_fn(40, 20, |x, _| if x < 20 { Luma([30]) } else { Luma([220]) });
        DynamicImage::ImageLuma8(image).save(&path).unwrap();
        (dir, path)
    }

    /// Test OCR configuration defaults
    #[test]
    fn test_ocr_config_defaults() {
        let config = OcrConfig::default();

        assert_eq!(config.languages, "eng");
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
        assert!(config.timeout_secs > 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_configurations_are_rejected() {
        let config = OcrConfig {
            languages: String::new(),
            ..OcrConfig::default()
        };
        assert!(config.validate().is_err());

        let config = OcrConfig {
            timeout_secs: 0,
            ..OcrConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_real_png_passes_validation() {
        let (_dir, path) = label_png();
        let size = validate_image_path(&path, &OcrConfig::default()).unwrap();
        assert!(size > 0);
    }

    #[test]
    fn test_prepared_image_keeps_dimensions() {
        let (_dir, path) = label_png();
        let prepared = prepare_for_ocr(&path, &PreprocessingConfig::default()).unwrap();
        let image = image::open(prepared.path()).unwrap().to_luma8();
        assert_eq!(image.dimensions(), (40, 20));
        assert!((30..220).contains(&prepared.threshold));
    }

    #[tokio::test]
    async fn test_extracted_text_is_cleaned() {
        let (_dir, path) = label_png();
        let source: Arc<dyn TextSource> = Arc::new(FixedText("  Energy 250 \n\n\n Protein 5  \n"));

        let text = extract_label_text(&path, &OcrConfig::default(), source)
            .await
            .unwrap();
        assert_eq!(text, "Energy 250\nProtein 5");
    }

    #[tokio::test]
    async fn test_invalid_image_never_reaches_the_engine() {
        let dir = tempfile::tempdir().unwrap();
        let source: Arc<dyn TextSource> = Arc::new(FailingSource);

        let result =
            extract_label_text(&dir.path().join("missing.jpg"), &OcrConfig::default(), source).await;
        assert!(matches!(result, Err(OcrError::Validation(_))));
    }

    #[tokio::test]
    async fn test_engine_failure_is_propagated() {
        let (_dir, path) = label_png();
        let source: Arc<dyn TextSource> = Arc::new(FailingSource);

        let result = extract_label_text(&path, &OcrConfig::default(), source).await;
        match result {
            Err(OcrError::Extraction(msg)) => assert!(msg.contains("engine crashed")),
            other => panic!("expected extraction error, got {:?}", other),
        }
    }
}
