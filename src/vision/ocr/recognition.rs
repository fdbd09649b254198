// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text recognition model
//!
//! One recognizer per language: a CRNN model plus the character
//! dictionary it was trained with.

use anyhow::{Context, Result};
use ndarray::{Array4, ArrayView2, ArrayViewD, Axis, Ix2};
use ort::session::Session;
use ort::value::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

use super::preprocessing::REC_INPUT_HEIGHT;
use super::session::{build_session, io_names, SessionOptions};

/// Recognized text with confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    /// Mean of the per-character confidences (0.0-1.0)
    pub confidence: f32,
    pub char_confidences: Vec<f32>,
}

impl RecognizedText {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

pub struct OcrRecognitionModel {
    language: String,
    session: Mutex<Session>,
    /// Index 0 is the CTC blank
    dictionary: Vec<String>,
    input_name: String,
    output_name: String,
}

impl std::fmt::Debug for OcrRecognitionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrRecognitionModel")
            .field("language", &self.language)
            .field("dictionary_size", &self.dictionary.len())
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .finish_non_exhaustive()
    }
}

impl OcrRecognitionModel {
    /// Load a recognizer from `rec_model.onnx` and its `dict.txt`
    pub fn load(
        language: &str,
        model_path: &Path,
        dict_path: &Path,
        options: &SessionOptions,
    ) -> Result<Self> {
        if !model_path.exists() {
            anyhow::bail!("OCR recognition model not found: {}", model_path.display());
        }
        if !dict_path.exists() {
            anyhow::bail!(
                "OCR character dictionary not found: {}",
                dict_path.display()
            );
        }

        let dictionary = load_dictionary(dict_path)?;
        info!(
            "Loaded '{}' dictionary with {} characters",
            language,
            dictionary.len()
        );

        let session = build_session(model_path, options)?;
        let (input_name, output_name) = io_names(&session, "softmax_0.tmp_0");

        debug!(
            "Recognition model '{}' loaded - input: {}, output: {}",
            language, input_name, output_name
        );

        Ok(Self {
            language: language.to_string(),
            session: Mutex::new(session),
            dictionary,
            input_name,
            output_name,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Recognize text in a `[1, 3, 48, W]` tensor from `preprocess_for_recognition`
    pub fn recognize(&self, input: &Array4<f32>) -> Result<RecognizedText> {
        let shape = input.shape();
        if shape[0] != 1 || shape[1] != 3 || shape[2] != REC_INPUT_HEIGHT as usize || shape[3] < 4
        {
            anyhow::bail!(
                "Invalid input shape: {:?}, expected [1, 3, {}, W>=4]",
                shape,
                REC_INPUT_HEIGHT
            );
        }

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Recognition session lock poisoned"))?;

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Recognition inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let probs = sequence_probabilities(output_tensor.view())?;
        Ok(ctc_greedy_decode(probs, &self.dictionary))
    }
}

/// Read a PaddleOCR character dictionary, one token per line.
///
/// The blank token is prepended and a space token appended, matching how
/// the recognition models were exported.
pub fn load_dictionary(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).context(format!("Failed to open dictionary: {}", path.display()))?;

    let mut dictionary = vec![String::new()];
    for line in BufReader::new(file).lines() {
        let line = line.context("Failed to read dictionary line")?;
        let token = line.trim_end_matches(['\r', '\n']);
        if !token.is_empty() {
            dictionary.push(token.to_string());
        }
    }
    dictionary.push(" ".to_string());

    Ok(dictionary)
}

/// View a `[1, T, C]` or `[T, C]` output as `[T, C]`
fn sequence_probabilities(output: ArrayViewD<'_, f32>) -> Result<ArrayView2<'_, f32>> {
    let shape = output.shape().to_vec();
    let view = match shape.len() {
        3 if shape[0] == 1 => output.index_axis_move(Axis(0), 0),
        2 => output,
        _ => anyhow::bail!("Unexpected recognition output shape: {:?}", shape),
    };

    view.into_dimensionality::<Ix2>()
        .context("Recognition output is not a [T, C] sequence")
}

/// Best-path CTC decoding: argmax per step, collapse repeats, drop blanks
pub fn ctc_greedy_decode(probs: ArrayView2<'_, f32>, dictionary: &[String]) -> RecognizedText {
    let mut text = String::new();
    let mut char_confidences = Vec::new();
    let mut prev_index = 0usize;

    for step in probs.outer_iter() {
        let (max_index, max_prob) = step
            .iter()
            .copied()
            .enumerate()
            .fold((0usize, f32::NEG_INFINITY), |best, (i, p)| {
                if p > best.1 {
                    (i, p)
                } else {
                    best
                }
            });

        if max_index != 0 && max_index != prev_index {
            if let Some(token) = dictionary.get(max_index) {
                text.push_str(token);
                char_confidences.push(max_prob);
            }
        }
        prev_index = max_index;
    }

    let confidence = if char_confidences.is_empty() {
        0.0
    } else {
        (char_confidences.iter().sum::<f32>() / char_confidences.len() as f32).clamp(0.0, 1.0)
    };

    RecognizedText {
        text,
        confidence,
        char_confidences,
    }
}
