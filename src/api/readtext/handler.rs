// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /readtext handler

use anyhow::Context;
use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use bytes::Bytes;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::request::{parse_languages, ReadTextForm};
use super::response::ReadTextResponse;
use crate::api::errors::ServiceError;
use crate::api::http_server::AppState;
use crate::engine::{normalize, EnginePool};

/// POST /readtext - Recognize text in an uploaded image
///
/// # Form fields
/// - `file`: image to recognize (required)
/// - `langs`: comma-separated language codes, e.g. "en,fr,ch_sim" - defaults to "en"
/// - `detail`: passed to the engine; 1 for full entries, 0 for plain strings - defaults to 1
/// - `gpu`: use hardware acceleration - defaults to false
///
/// # Response
/// - 200 `{"result": [...]}`
/// - 422 missing file or a field that cannot be coerced
/// - 500 `{"detail": "<message>"}` for any failure after the form was accepted
pub async fn readtext_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ReadTextResponse>, ServiceError> {
    let request_id = Uuid::new_v4();

    let form = ReadTextForm::from_multipart(multipart).await.map_err(|e| {
        warn!(%request_id, "Rejected readtext form: {}", e);
        e
    })?;

    info!(
        %request_id,
        "Received file: {}, langs: {}, detail: {}, gpu: {}",
        form.filename.as_deref().unwrap_or("<unnamed>"),
        form.langs,
        form.detail,
        form.gpu
    );

    let started = Instant::now();
    let result = handle(&state.pool, form.file, &form.langs, form.detail, form.gpu)
        .await
        .map_err(|e| {
            debug!(%request_id, "readtext returning {}", e.status_code());
            e
        })?;

    info!(%request_id, "readtext complete in {}ms", started.elapsed().as_millis());

    Ok(Json(ReadTextResponse::new(result)))
}

/// Resolve an engine, run recognition and normalize the output.
///
/// Every failure along the way is reported as a single processing error
/// carrying the flattened error chain.
pub async fn handle(
    pool: &EnginePool,
    image: Bytes,
    language_spec: &str,
    detail: i64,
    use_gpu: bool,
) -> Result<Value, ServiceError> {
    recognize(pool, image, language_spec, detail, use_gpu)
        .await
        .map_err(|e| {
            error!("Recognition failed: {:?}", e);
            ServiceError::processing(&e)
        })
}

async fn recognize(
    pool: &EnginePool,
    image: Bytes,
    language_spec: &str,
    detail: i64,
    use_gpu: bool,
) -> anyhow::Result<Value> {
    let languages = parse_languages(language_spec);
    debug!("Parsed languages: {:?}", languages);

    let engine = pool.acquire(&languages, use_gpu).await?;

    let raw = tokio::task::spawn_blocking(move || engine.read_text(&image, detail))
        .await
        .context("Recognition task failed")??;

    Ok(normalize(raw))
}
