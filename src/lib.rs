// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod engine;
pub mod version;
pub mod vision;

pub use api::{create_app, start_server, AppState};
pub use config::ServerArgs;
pub use engine::{normalize, EngineFactory, EngineKey, EnginePool, OcrEngine, RawValue};
pub use vision::ocr::{PaddleEngineConfig, PaddleEngineFactory};
