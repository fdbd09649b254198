// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image decoding and the PaddleOCR engine

pub mod image_utils;
pub mod ocr;

pub use image_utils::{decode_image_bytes, detect_format, ImageError, ImageInfo};
