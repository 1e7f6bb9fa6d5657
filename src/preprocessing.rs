//! # Image Preprocessing Module
//!
//! Cleans a label photo up before Tesseract reads it: grayscale conversion,
//! Gaussian denoising, Otsu binarisation and an unsharp mask. The cleaned image
//! is written to a temporary PNG because the OCR engine reads from disk.

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use std::path::Path;
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::ocr_config::PreprocessingConfig;
use crate::ocr_errors::OcrError;

/// A preprocessed image on disk, deleted when dropped
#[derive(Debug)]
pub struct PreparedImage {
    file: NamedTempFile,
    /// Otsu threshold chosen for the image
    pub threshold: u8,
}

impl PreparedImage {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Run the cleanup pipeline on a decoded image
pub fn preprocess(image: &DynamicImage, config: &PreprocessingConfig) -> (GrayImage, u8) {
    let start_time = Instant::now();

    let gray = image.to_luma8();
    let denoised = if config.blur_sigma > 0.0 {
        image::imageops::blur(&gray, config.blur_sigma)
    } else {
        gray
    };
    let (binary, threshold) = apply_otsu_threshold(&denoised);
    let sharpened = image::imageops::unsharpen(&binary, config.sharpen_sigma, config.sharpen_threshold);

    debug!(
        target: "ocr_preprocessing",
        threshold,
        width = sharpened.width(),
        height = sharpened.height(),
        duration_ms = start_time.elapsed().as_millis(),
        "Image preprocessing completed"
    );

    (sharpened, threshold)
}

/// Load `path`, clean it up and write the result to a temporary PNG
pub fn prepare_for_ocr(path: &Path, config: &PreprocessingConfig) -> Result<PreparedImage, OcrError> {
    let image = image::open(path)
        .map_err(|e| OcrError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    let (processed, threshold) = preprocess(&image, config);

    let file = tempfile::Builder::new()
        .prefix("label-")
        .suffix(".png")
        .tempfile()
        .map_err(|e| OcrError::Preprocessing(format!("cannot create temporary file: {}", e)))?;
    processed
        .save_with_format(file.path(), ImageFormat::Png)
        .map_err(|e| OcrError::Preprocessing(format!("cannot write preprocessed image: {}", e)))?;

    Ok(PreparedImage { file, threshold })
}

/// Binarise a grayscale image with Otsu's method.
///
/// Pixels brighter than the chosen threshold become white, the rest black.
pub fn apply_otsu_threshold(gray: &GrayImage) -> (GrayImage, u8) {
    let mut histogram = [0u32; 256];
    for pixel in gray.pixels() {
        histogram[pixel[0] as usize] += 1;
    }
    let total_pixels = (gray.width() as f64) * (gray.height() as f64);
    let threshold = find_otsu_threshold(&histogram, total_pixels);

    let mut binary = GrayImage::new(gray.width(), gray.height());
    for (x, y, pixel) in gray.enumerate_pixels() {
        let value = if pixel[0] > threshold { 255u8 } else { 0u8 };
        binary.put_pixel(x, y, Luma([value]));
    }

    (binary, threshold)
}

/// Threshold maximising the between-class variance; 128 when the histogram
/// has a single class
fn find_otsu_threshold(histogram: &[u32; 256], total_pixels: f64) -> u8 {
    let mut cumulative_sums = [0f64; 256];
    let mut cumulative_weighted_sums = [0f64; 256];
    let mut cumulative_sum = 0f64;
    let mut cumulative_weighted_sum = 0f64;

    for (i, count) in histogram.iter().enumerate() {
        let pixel_count = *count as f64;
        cumulative_sum += pixel_count;
        cumulative_weighted_sum += (i as f64) * pixel_count;
        cumulative_sums[i] = cumulative_sum;
        cumulative_weighted_sums[i] = cumulative_weighted_sum;
    }

    if total_pixels <= 0.0 {
        return 128;
    }

    let total_weighted_sum = cumulative_weighted_sums[255];
    let mut max_variance = 0f64;
    let mut optimal_threshold = 128u8;

    for threshold in 1..255usize {
        // background is pixels <= threshold
        let background = cumulative_sums[threshold];
        let foreground = cumulative_sums[255] - background;
        if background == 0.0 || foreground == 0.0 {
            continue;
        }

        let w0 = background / total_pixels;
        let w1 = foreground / total_pixels;
        let mu0 = cumulative_weighted_sums[threshold] / background;
        let mu1 = (total_weighted_sum - cumulative_weighted_sums[threshold]) / foreground;

        let variance = w0 * w1 * (mu0 - mu1).powi(2);
        if variance > max_variance {
            max_variance = variance;
            optimal_threshold = threshold as u8;
        }
    }

    optimal_threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tone(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Luma([25])
            } else {
                Luma([225])
            }
        })
    }

    #[test]
    fn test_otsu_separates_two_classes() {
        let (binary, threshold) = apply_otsu_threshold(&two_tone(10, 10));
        assert!((25..225).contains(&threshold));
        assert_eq!(binary.get_pixel(0, 0)[0], 0);
        assert_eq!(binary.get_pixel(9, 9)[0], 255);
    }

    #[test]
    fn test_otsu_single_class_falls_back() {
        let mut histogram = [0u32; 256];
        histogram[128] = 100;
        assert_eq!(find_otsu_threshold(&histogram, 100.0), 128);
        assert_eq!(find_otsu_threshold(&[0u32; 256], 0.0), 128);
    }

    #[test]
    fn test_preprocess_output_is_binary() {
        let image = DynamicImage::ImageLuma8(two_tone(32, 16));
        let config = PreprocessingConfig {
            sharpen_threshold: 255,
            ..PreprocessingConfig::default()
        };
        let (processed, _) = preprocess(&image, &config);
        assert_eq!(processed.dimensions(), (32, 16));
        assert!(processed.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_prepare_for_ocr_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("label.png");
        DynamicImage::ImageLuma8(two_tone(20, 20)).save(&source).unwrap();

        let prepared = prepare_for_ocr(&source, &PreprocessingConfig::default()).unwrap();
        let reread = image::open(prepared.path()).unwrap();
        assert_eq!(reread.width(), 20);

        let kept = prepared.path().to_path_buf();
        drop(prepared);
        assert!(!kept.exists());
    }

    #[test]
    fn test_prepare_for_ocr_rejects_undecodable_file() {
        let mut file = NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"not an image").unwrap();
        let err = prepare_for_ocr(file.path(), &PreprocessingConfig::default()).unwrap_err();
        assert!(matches!(err, OcrError::ImageLoad(_)));
    }
}
