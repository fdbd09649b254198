// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart form parsing for POST /readtext

use axum_extra::extract::Multipart;
use bytes::Bytes;

use crate::api::errors::ServiceError;

const DEFAULT_LANGS: &str = "en";
const DEFAULT_DETAIL: i64 = 1;
const DEFAULT_GPU: bool = false;

/// Parsed /readtext form
#[derive(Debug, Clone)]
pub struct ReadTextForm {
    /// Raw uploaded image bytes
    pub file: Bytes,
    /// Client-supplied filename, logged only
    pub filename: Option<String>,
    /// Comma-separated language codes
    pub langs: String,
    /// Passed through to the engine untouched
    pub detail: i64,
    pub gpu: bool,
}

impl ReadTextForm {
    /// Read every field of the multipart body, applying defaults.
    ///
    /// Unknown fields are skipped. A repeated field keeps its last value.
    /// Empty `detail` and `gpu` values fall back to their defaults.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ServiceError> {
        let mut file = None;
        let mut filename = None;
        let mut langs = None;
        let mut detail = None;
        let mut gpu = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ServiceError::InvalidBody(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                // A plain text part named "file" is not an upload
                "file" if field.file_name().is_some() => {
                    filename = field.file_name().map(str::to_string);
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| ServiceError::InvalidBody(e.to_string()))?;
                    file = Some(data);
                }
                "langs" => langs = Some(read_text(field).await?),
                "detail" => {
                    if let Some(value) = non_empty(read_text(field).await?) {
                        detail = Some(parse_detail(&value)?);
                    }
                }
                "gpu" => {
                    if let Some(value) = non_empty(read_text(field).await?) {
                        gpu = Some(parse_gpu(&value)?);
                    }
                }
                _ => {}
            }
        }

        Ok(Self {
            file: file.ok_or_else(|| ServiceError::missing_field("file"))?,
            filename,
            langs: langs.unwrap_or_else(|| DEFAULT_LANGS.to_string()),
            detail: detail.unwrap_or(DEFAULT_DETAIL),
            gpu: gpu.unwrap_or(DEFAULT_GPU),
        })
    }
}

async fn read_text(field: axum_extra::extract::multipart::Field) -> Result<String, ServiceError> {
    field
        .text()
        .await
        .map_err(|e| ServiceError::InvalidBody(e.to_string()))
}

/// Empty form values count as absent so the field default applies
fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Split a language spec on commas, trimming and dropping empty pieces.
///
/// Order and duplicates are preserved: `" en, ,fr,en "` gives `[en, fr, en]`.
pub fn parse_languages(spec: &str) -> Vec<String> {
    spec.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_detail(value: &str) -> Result<i64, ServiceError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ServiceError::Validation {
            field: "detail",
            message: "Input should be a valid integer, unable to parse string as an integer"
                .to_string(),
            kind: "int_parsing",
        })
}

/// Accepts the usual form spellings of a boolean, case-insensitive.
pub fn parse_gpu(value: &str) -> Result<bool, ServiceError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Ok(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Ok(false),
        _ => Err(ServiceError::Validation {
            field: "gpu",
            message: "Input should be a valid boolean, unable to interpret input".to_string(),
            kind: "bool_parsing",
        }),
    }
}
