// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! PaddleOCR factory against on-disk model layouts
//!
//! Tests marked `#[ignore]` need real models:
//! `OCR_MODEL_DIR=/path/to/paddleocr-onnx cargo test --test vision_tests -- --ignored`

use readtext_server::{
    engine::{normalize, EngineFactory, EnginePool},
    vision::ocr::{PaddleEngineConfig, PaddleEngineFactory},
};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

fn langs(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|c| c.to_string()).collect()
}

fn factory_for(dir: &TempDir) -> PaddleEngineFactory {
    PaddleEngineFactory::new(PaddleEngineConfig {
        model_dir: dir.path().to_path_buf(),
        intra_threads: 1,
    })
}

fn real_model_dir() -> PathBuf {
    std::env::var("OCR_MODEL_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./models/paddleocr-onnx"))
}

#[test]
fn test_empty_model_dir_has_no_languages() {
    let dir = tempfile::tempdir().unwrap();
    let factory = factory_for(&dir);

    assert!(factory.available_languages().is_empty());
    let err = factory.create(&langs(&["en"]), false).err().unwrap();
    assert_eq!(err.to_string(), "unsupported language code 'en'");
}

#[test]
fn test_missing_detection_model() {
    let dir = tempfile::tempdir().unwrap();
    let lang_dir = dir.path().join("rec").join("en");
    std::fs::create_dir_all(&lang_dir).unwrap();
    std::fs::write(lang_dir.join("rec_model.onnx"), b"onnx").unwrap();
    std::fs::write(lang_dir.join("dict.txt"), "a\n").unwrap();

    let err = factory_for(&dir).create(&langs(&["en"]), false).err().unwrap();
    assert!(err.to_string().contains("detection model not found"));
}

#[tokio::test]
async fn test_pool_does_not_cache_failed_construction() {
    let dir = tempfile::tempdir().unwrap();
    let pool = EnginePool::new(Arc::new(factory_for(&dir)));

    assert!(pool.acquire(&langs(&["en"]), false).await.is_err());
    assert!(pool.acquire(&[], false).await.is_err());
    assert!(pool.is_empty().await);
}

#[test]
#[ignore] // Requires PaddleOCR ONNX models
fn test_real_engine_reads_rendered_text() {
    let factory = PaddleEngineFactory::new(PaddleEngineConfig {
        model_dir: real_model_dir(),
        intra_threads: 2,
    });
    let engine = factory.create(&langs(&["en"]), false).unwrap();

    let image = std::fs::read(real_model_dir().join("samples").join("hello.png")).unwrap();
    let flat = normalize(engine.read_text(&image, 0).unwrap());
    let texts: Vec<&str> = flat
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert!(!texts.is_empty());

    let detailed = normalize(engine.read_text(&image, 1).unwrap());
    let entry = &detailed[0];
    assert_eq!(entry[0].as_array().unwrap().len(), 4);
    assert!(entry[2].as_f64().unwrap() > 0.0);
}

#[test]
#[ignore] // Requires PaddleOCR ONNX models
fn test_real_engine_rejects_corrupt_image() {
    let factory = PaddleEngineFactory::new(PaddleEngineConfig {
        model_dir: real_model_dir(),
        intra_threads: 1,
    });
    let engine = factory.create(&langs(&["en"]), false).unwrap();

    let err = engine.read_text(b"not an image at all", 1).unwrap_err();
    assert!(format!("{:#}", err).contains("Unsupported image format"));
}
