// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Recognition engine abstraction
//!
//! The service never looks inside an engine. It only needs:
//! - `EngineFactory` - builds an engine for a language list and acceleration flag
//! - `OcrEngine` - turns raw image bytes into a `RawValue` result tree
//! - `EnginePool` - caches built engines for the life of the process
//! - `normalize` - converts a `RawValue` tree into plain JSON

pub mod normalize;
pub mod pool;

use std::sync::Arc;

use ndarray::ArrayD;

pub use normalize::normalize;
pub use pool::{EngineKey, EnginePool};

/// Native result value produced by an engine.
///
/// Engines report numbers in whatever width they computed them in; the
/// handler converts the whole tree with [`normalize`] before serializing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    None,
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    F32(f32),
    F64(f64),
    Text(String),
    /// Numeric buffer, e.g. a box of corner points
    Array(ArrayD<f64>),
    List(Vec<RawValue>),
    Tuple(Vec<RawValue>),
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

/// A ready-to-use recognition engine.
///
/// Implementations are expected to be expensive to build and cheap to share;
/// `read_text` is called from the blocking thread pool and may take seconds.
pub trait OcrEngine: Send + Sync {
    /// Recognize text in an encoded image.
    ///
    /// `detail` is passed through untouched from the request. The engine alone
    /// decides what it means.
    fn read_text(&self, image: &[u8], detail: i64) -> anyhow::Result<RawValue>;
}

/// Builds engines on demand for the pool.
#[cfg_attr(test, mockall::automock)]
pub trait EngineFactory: Send + Sync {
    /// Build an engine for exactly these languages (order preserved) and flag.
    fn create(&self, languages: &[String], use_gpu: bool) -> anyhow::Result<Arc<dyn OcrEngine>>;
}
