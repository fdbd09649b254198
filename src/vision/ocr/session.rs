// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX Runtime session construction shared by the OCR models

use anyhow::{Context, Result};
use ort::execution_providers::{
    CPUExecutionProvider, CUDAExecutionProvider, ExecutionProviderDispatch,
};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use std::path::Path;
use tracing::info;

/// Per-engine session settings
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Register the CUDA execution provider ahead of CPU
    pub use_gpu: bool,
    pub intra_threads: usize,
}

impl SessionOptions {
    fn execution_providers(&self) -> Vec<ExecutionProviderDispatch> {
        if self.use_gpu {
            vec![
                CUDAExecutionProvider::default().build(),
                CPUExecutionProvider::default().build(),
            ]
        } else {
            vec![CPUExecutionProvider::default().build()]
        }
    }

    fn device(&self) -> &'static str {
        if self.use_gpu {
            "CUDA"
        } else {
            "CPU"
        }
    }
}

/// Load an ONNX model file into a session
pub fn build_session(model_path: &Path, options: &SessionOptions) -> Result<Session> {
    info!(
        "Loading ONNX model {} ({})",
        model_path.display(),
        options.device()
    );

    let session = Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers(options.execution_providers())
        .context("Failed to set execution providers")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(options.intra_threads)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .context(format!("Failed to load ONNX model from {}", model_path.display()))?;

    Ok(session)
}

/// First input and output names of a session, with PaddleOCR fallbacks
pub fn io_names(session: &Session, default_output: &str) -> (String, String) {
    let input_name = session
        .inputs
        .first()
        .map(|input| input.name.clone())
        .unwrap_or_else(|| "x".to_string());

    let output_name = session
        .outputs
        .first()
        .map(|output| output.name.clone())
        .unwrap_or_else(|| default_output.to_string());

    (input_name, output_name)
}
