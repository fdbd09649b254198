// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR engine: detection plus per-language recognition
//!
//! Expected model layout:
//! ```text
//! <model_dir>/det_model.onnx
//! <model_dir>/rec/<lang>/rec_model.onnx
//! <model_dir>/rec/<lang>/dict.txt
//! ```

use anyhow::{Context, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::detection::OcrDetectionModel;
use super::preprocessing::{crop_region, preprocess_for_detection, preprocess_for_recognition};
use super::recognition::{OcrRecognitionModel, RecognizedText};
use super::session::SessionOptions;
use crate::engine::{EngineFactory, OcrEngine, RawValue};
use crate::vision::image_utils::decode_image_bytes;

pub const DET_MODEL_FILE: &str = "det_model.onnx";
pub const REC_MODEL_FILE: &str = "rec_model.onnx";
pub const DICT_FILE: &str = "dict.txt";

#[derive(Debug, Clone)]
pub struct PaddleEngineConfig {
    pub model_dir: PathBuf,
    pub intra_threads: usize,
}

/// Builds `PaddleOcrEngine`s from a model directory
#[derive(Debug, Clone)]
pub struct PaddleEngineFactory {
    config: PaddleEngineConfig,
}

impl PaddleEngineFactory {
    pub fn new(config: PaddleEngineConfig) -> Self {
        Self { config }
    }

    pub fn detection_model_path(&self) -> PathBuf {
        self.config.model_dir.join(DET_MODEL_FILE)
    }

    pub fn language_dir(&self, language: &str) -> PathBuf {
        self.config.model_dir.join("rec").join(language)
    }

    /// Language codes with a recognition model on disk, sorted
    pub fn available_languages(&self) -> Vec<String> {
        let rec_dir = self.config.model_dir.join("rec");
        let mut languages = std::fs::read_dir(rec_dir)
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .filter(|entry| entry.path().join(REC_MODEL_FILE).is_file())
                    .filter_map(|entry| entry.file_name().into_string().ok())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        languages.sort();
        languages
    }

    /// Check every requested language has a recognition model
    pub fn validate_languages(&self, languages: &[String]) -> Result<()> {
        if languages.is_empty() {
            anyhow::bail!("at least one language must be specified");
        }

        for language in languages {
            if !is_safe_code(language) || !self.language_dir(language).join(REC_MODEL_FILE).is_file()
            {
                anyhow::bail!("unsupported language code '{}'", language);
            }
        }

        Ok(())
    }
}

/// Language codes name a directory; reject anything that could escape it
fn is_safe_code(language: &str) -> bool {
    !language.is_empty()
        && language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl EngineFactory for PaddleEngineFactory {
    fn create(&self, languages: &[String], use_gpu: bool) -> Result<Arc<dyn OcrEngine>> {
        self.validate_languages(languages)?;

        let start = Instant::now();
        let options = SessionOptions {
            use_gpu,
            intra_threads: self.config.intra_threads,
        };

        let detector = OcrDetectionModel::load(&self.detection_model_path(), &options)?;

        let mut recognizers: Vec<OcrRecognitionModel> = Vec::with_capacity(languages.len());
        for language in languages {
            if recognizers.iter().any(|r| r.language() == language) {
                continue;
            }
            let dir = self.language_dir(language);
            let recognizer = OcrRecognitionModel::load(
                language,
                &dir.join(REC_MODEL_FILE),
                &dir.join(DICT_FILE),
                &options,
            )
            .with_context(|| format!("Failed to load recognizer for '{}'", language))?;
            recognizers.push(recognizer);
        }

        info!(
            "PaddleOCR engine ready for [{}] in {}ms",
            languages.join(","),
            start.elapsed().as_millis()
        );

        Ok(Arc::new(PaddleOcrEngine {
            detector,
            recognizers,
        }))
    }
}

/// A recognized text line in original image coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct TextRegion {
    /// Top-left, top-right, bottom-right, bottom-left
    pub corners: [[i32; 2]; 4],
    pub text: String,
    pub confidence: f32,
}

impl TextRegion {
    fn into_raw(self, detail: i64) -> RawValue {
        if detail == 0 {
            return RawValue::Text(self.text);
        }

        let corners = self
            .corners
            .iter()
            .map(|[x, y]| RawValue::List(vec![RawValue::I32(*x), RawValue::I32(*y)]))
            .collect();

        RawValue::Tuple(vec![
            RawValue::List(corners),
            RawValue::Text(self.text),
            RawValue::F64(self.confidence as f64),
        ])
    }
}

/// Result tree for a set of regions: flat strings when `detail == 0`,
/// `(box, text, confidence)` entries otherwise
pub fn regions_to_raw(regions: Vec<TextRegion>, detail: i64) -> RawValue {
    RawValue::List(
        regions
            .into_iter()
            .map(|region| region.into_raw(detail))
            .collect(),
    )
}

#[derive(Debug)]
pub struct PaddleOcrEngine {
    detector: OcrDetectionModel,
    recognizers: Vec<OcrRecognitionModel>,
}

impl PaddleOcrEngine {
    fn recognize_regions(&self, image: &DynamicImage) -> Result<Vec<TextRegion>> {
        let (tensor, prep) = preprocess_for_detection(image);
        let boxes = self.detector.detect(&tensor)?;

        let mut regions = Vec::with_capacity(boxes.len());
        for text_box in boxes.iter().filter(|b| b.is_valid()) {
            let (x0, y0) = prep.map_to_original(text_box.x, text_box.y);
            let (x1, y1) =
                prep.map_to_original(text_box.x + text_box.width, text_box.y + text_box.height);

            let Some(crop) = crop_region(image, x0, y0, x1 - x0, y1 - y0) else {
                continue;
            };

            let input = preprocess_for_recognition(&crop);
            let Some(best) = self.best_reading(&input)? else {
                continue;
            };

            let (left, top, right, bottom) = (
                x0.round() as i32,
                y0.round() as i32,
                x1.round() as i32,
                y1.round() as i32,
            );
            regions.push(TextRegion {
                corners: [[left, top], [right, top], [right, bottom], [left, bottom]],
                text: best.text,
                confidence: best.confidence,
            });
        }

        Ok(regions)
    }

    /// Highest-confidence non-empty reading across all languages
    fn best_reading(&self, input: &ndarray::Array4<f32>) -> Result<Option<RecognizedText>> {
        let mut best: Option<RecognizedText> = None;
        for recognizer in &self.recognizers {
            let reading = recognizer.recognize(input)?;
            if reading.is_empty() {
                continue;
            }
            if best
                .as_ref()
                .map_or(true, |current| reading.confidence > current.confidence)
            {
                best = Some(reading);
            }
        }
        Ok(best)
    }
}

impl OcrEngine for PaddleOcrEngine {
    fn read_text(&self, image: &[u8], detail: i64) -> Result<RawValue> {
        let start = Instant::now();

        let (img, info) = decode_image_bytes(image).context("Failed to read image")?;
        debug!(
            "Decoded {:?} image {}x{} ({} bytes)",
            info.format, info.width, info.height, info.size_bytes
        );

        let regions = self.recognize_regions(&img)?;

        debug!(
            "Recognized {} regions in {}ms",
            regions.len(),
            start.elapsed().as_millis()
        );

        Ok(regions_to_raw(regions, detail))
    }
}

pub fn model_dir_exists(path: &Path) -> bool {
    path.join(DET_MODEL_FILE).is_file()
}
