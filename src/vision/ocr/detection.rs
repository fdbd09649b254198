// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text detection model
//!
//! Runs the DB detection network and turns its probability map into
//! axis-aligned text boxes.

use anyhow::{Context, Result};
use ndarray::{Array2, Array4, ArrayViewD, Axis};
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

use super::session::{build_session, io_names, SessionOptions};

/// Pixels with probability at or above this are text
pub const DEFAULT_BOX_THRESHOLD: f32 = 0.3;

/// Components smaller than this (in probability-map pixels) are noise
pub const MIN_COMPONENT_PIXELS: usize = 10;

/// Boxes are grown by this fraction of their height on every side; the DB
/// map marks a shrunk text kernel
pub const UNCLIP_RATIO: f32 = 0.3;

/// A detected text box in detection-input coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Mean probability over the component
    pub confidence: f32,
}

impl TextBox {
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.confidence > 0.0
    }

    /// Grow the box by `ratio * height` on every side
    pub fn expanded(&self, ratio: f32) -> Self {
        let pad = self.height * ratio;
        Self {
            x: self.x - pad,
            y: self.y - pad,
            width: self.width + 2.0 * pad,
            height: self.height + 2.0 * pad,
            confidence: self.confidence,
        }
    }
}

pub struct OcrDetectionModel {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl std::fmt::Debug for OcrDetectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrDetectionModel")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .finish_non_exhaustive()
    }
}

impl OcrDetectionModel {
    /// Load the detection model (det_model.onnx)
    pub fn load(model_path: &Path, options: &SessionOptions) -> Result<Self> {
        if !model_path.exists() {
            anyhow::bail!("OCR detection model not found: {}", model_path.display());
        }

        let session = build_session(model_path, options)?;
        let (input_name, output_name) = io_names(&session, "sigmoid_0.tmp_0");

        debug!(
            "Detection model loaded - input: {}, output: {}",
            input_name, output_name
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    /// Detect text boxes in a `[1, 3, H, W]` tensor from `preprocess_for_detection`
    ///
    /// Boxes are returned in tensor coordinates, top-to-bottom then
    /// left-to-right.
    pub fn detect(&self, input: &Array4<f32>) -> Result<Vec<TextBox>> {
        let shape = input.shape();
        if shape[0] != 1 || shape[1] != 3 {
            anyhow::bail!("Invalid input shape: {:?}, expected [1, 3, H, W]", shape);
        }
        let (input_height, input_width) = (shape[2], shape[3]);

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Detection session lock poisoned"))?;

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Detection inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let prob_map = probability_map(output_tensor.view())?;
        debug!("Detection probability map: {:?}", prob_map.dim());

        let (map_height, map_width) = prob_map.dim();
        let scale_x = input_width as f32 / map_width as f32;
        let scale_y = input_height as f32 / map_height as f32;

        let boxes = boxes_from_probability_map(&prob_map, DEFAULT_BOX_THRESHOLD)
            .into_iter()
            .map(|b| TextBox {
                x: b.x * scale_x,
                y: b.y * scale_y,
                width: b.width * scale_x,
                height: b.height * scale_y,
                confidence: b.confidence,
            })
            .map(|b| b.expanded(UNCLIP_RATIO))
            .collect::<Vec<_>>();

        debug!("Detected {} text regions", boxes.len());

        Ok(boxes)
    }
}

/// Squeeze a `[1, 1, H, W]` or `[1, H, W]` output down to `[H, W]`
fn probability_map(output: ArrayViewD<f32>) -> Result<Array2<f32>> {
    let shape = output.shape().to_vec();
    let mut view = output;
    while view.ndim() > 2 {
        if view.shape()[0] != 1 {
            anyhow::bail!("Unexpected detection output shape: {:?}", shape);
        }
        view = view.index_axis_move(Axis(0), 0);
    }

    view.into_dimensionality::<ndarray::Ix2>()
        .map(|v| v.to_owned())
        .context("Detection output is not a 2D probability map")
}

/// Group above-threshold pixels into 4-connected components and box them.
///
/// Coordinates are in probability-map pixels.
pub fn boxes_from_probability_map(map: &Array2<f32>, threshold: f32) -> Vec<TextBox> {
    let (height, width) = map.dim();
    let mut visited = Array2::<bool>::default((height, width));
    let mut boxes = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if visited[[y, x]] || map[[y, x]] < threshold {
                continue;
            }

            let mut stack = vec![(x, y)];
            let (mut min_x, mut max_x, mut min_y, mut max_y) = (x, x, y, y);
            let mut count = 0usize;
            let mut sum = 0.0f32;

            while let Some((cx, cy)) = stack.pop() {
                if visited[[cy, cx]] || map[[cy, cx]] < threshold {
                    continue;
                }
                visited[[cy, cx]] = true;
                count += 1;
                sum += map[[cy, cx]];

                min_x = min_x.min(cx);
                max_x = max_x.max(cx);
                min_y = min_y.min(cy);
                max_y = max_y.max(cy);

                if cx > 0 {
                    stack.push((cx - 1, cy));
                }
                if cx + 1 < width {
                    stack.push((cx + 1, cy));
                }
                if cy > 0 {
                    stack.push((cx, cy - 1));
                }
                if cy + 1 < height {
                    stack.push((cx, cy + 1));
                }
            }

            if count < MIN_COMPONENT_PIXELS {
                continue;
            }

            boxes.push(TextBox {
                x: min_x as f32,
                y: min_y as f32,
                width: (max_x - min_x + 1) as f32,
                height: (max_y - min_y + 1) as f32,
                confidence: sum / count as f32,
            });
        }
    }

    boxes.sort_by(|a, b| {
        a.y.partial_cmp(&b.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    boxes
}
