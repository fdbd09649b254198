// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the readtext server

/// Full version string with feature description
pub const VERSION: &str = "v1.0.0-paddleocr-onnx-2026-10-17";

/// Semantic version number
pub const VERSION_NUMBER: &str = "1.0.0";

/// Build date
pub const BUILD_DATE: &str = "2026-10-17";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "readtext",
    "multipart-upload",
    "engine-pool",
    "multi-language",
    "cuda-acceleration",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("readtext-server {} ({})", VERSION_NUMBER, BUILD_DATE)
}
