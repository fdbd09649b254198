// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /readtext response body

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Successful recognition: `{"result": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadTextResponse {
    /// Normalized engine output
    pub result: Value,
}

impl ReadTextResponse {
    pub fn new(result: Value) -> Self {
        Self { result }
    }
}
