// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::Json;
use serde::{Deserialize, Serialize};

pub const HEALTH_MESSAGE: &str = "EasyOCR server is running";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: HEALTH_MESSAGE.to_string(),
        }
    }
}

/// GET / - liveness check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
