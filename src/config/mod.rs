// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration
//!
//! Every setting has a flag, an environment variable and a default. The
//! defaults serve on 0.0.0.0:80 with models from ./models/paddleocr-onnx.

use clap::Parser;
use std::path::PathBuf;

use crate::vision::ocr::PaddleEngineConfig;

/// Maximum upload size (10MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Text recognition HTTP server
#[derive(Parser, Debug, Clone)]
#[command(name = "readtext-server")]
#[command(about = "Upload an image and get OCR results", long_about = None)]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long, env = "READTEXT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "READTEXT_PORT", default_value_t = 80)]
    pub port: u16,

    /// Directory holding det_model.onnx and rec/<lang>/ models
    #[arg(long, env = "OCR_MODEL_DIR", default_value = "./models/paddleocr-onnx")]
    pub model_dir: PathBuf,

    /// Largest accepted request body in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// ONNX Runtime intra-op threads per session
    #[arg(long, env = "OCR_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,
}

impl ServerArgs {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn engine_config(&self) -> PaddleEngineConfig {
        PaddleEngineConfig {
            model_dir: self.model_dir.clone(),
            intra_threads: self.intra_threads,
        }
    }
}
