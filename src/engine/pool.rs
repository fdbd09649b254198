// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process-wide cache of initialized recognition engines

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{EngineFactory, OcrEngine};

/// Identity of a cached engine.
///
/// Languages are compared as given: order, case and duplicates all count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineKey {
    pub languages: Vec<String>,
    pub use_gpu: bool,
}

impl EngineKey {
    pub fn new(languages: Vec<String>, use_gpu: bool) -> Self {
        Self { languages, use_gpu }
    }
}

impl fmt::Display for EngineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] gpu={}", self.languages.join(","), self.use_gpu)
    }
}

/// Lazily-populated map from `EngineKey` to engine instance
///
/// Entries are never evicted. The lock is released while an engine is being
/// built, so two requests racing on the same unseen key may both build one;
/// the first to finish is stored and handed out from then on.
pub struct EnginePool {
    factory: Arc<dyn EngineFactory>,
    engines: RwLock<HashMap<EngineKey, Arc<dyn OcrEngine>>>,
}

impl EnginePool {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            engines: RwLock::new(HashMap::new()),
        }
    }

    /// Return the engine for `languages`/`use_gpu`, building it on first use.
    ///
    /// Construction runs on the blocking thread pool. A failed construction
    /// leaves the pool unchanged.
    pub async fn acquire(&self, languages: &[String], use_gpu: bool) -> Result<Arc<dyn OcrEngine>> {
        let key = EngineKey::new(languages.to_vec(), use_gpu);

        if let Some(engine) = self.engines.read().await.get(&key) {
            debug!("Engine pool hit for {}", key);
            return Ok(engine.clone());
        }

        info!("Initializing OCR engine for {}", key);
        let started = Instant::now();

        let factory = self.factory.clone();
        let build_languages = key.languages.clone();
        let engine = tokio::task::spawn_blocking(move || factory.create(&build_languages, use_gpu))
            .await
            .context("Engine construction task failed")??;

        let mut engines = self.engines.write().await;
        let engine = engines.entry(key.clone()).or_insert(engine).clone();

        info!(
            "OCR engine ready for {} in {}ms ({} cached)",
            key,
            started.elapsed().as_millis(),
            engines.len()
        );

        Ok(engine)
    }

    /// Number of distinct keys with a cached engine
    pub async fn len(&self) -> usize {
        self.engines.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.engines.read().await.is_empty()
    }

    pub async fn contains(&self, key: &EngineKey) -> bool {
        self.engines.read().await.contains_key(key)
    }
}
