// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text recognition over ONNX Runtime
//!
//! Components:
//! - `detection` - text region detection (DB probability map)
//! - `recognition` - per-language CRNN recognition with CTC decoding
//! - `preprocessing` - tensors for both models
//! - `paddle` - the `EngineFactory` / `OcrEngine` pair the server pools

pub mod detection;
pub mod paddle;
pub mod preprocessing;
pub mod recognition;
mod session;

pub use detection::{OcrDetectionModel, TextBox};
pub use paddle::{PaddleEngineConfig, PaddleEngineFactory, PaddleOcrEngine, TextRegion};
pub use recognition::{OcrRecognitionModel, RecognizedText};
pub use session::SessionOptions;
