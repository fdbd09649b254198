// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /readtext through the full router
//!
//! Covers:
//! - flat and detailed result shapes
//! - form defaults and field coercion
//! - engine reuse per (languages, gpu) key
//! - error bodies for bad images, bad languages and bad forms

use axum::http::StatusCode;
use readtext_server::engine::EngineKey;
use serde_json::json;
use tower::util::ServiceExt; // for `oneshot`

use super::common::{fake_image, json_body, setup, setup_with_limit, MultipartBody};

fn langs(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|c| c.to_string()).collect()
}

#[tokio::test]
async fn test_flat_result_with_detail_zero() {
    let server = setup();
    let request = MultipartBody::new()
        .file("sign.png", &fake_image("STOP"))
        .text("langs", "en")
        .text("detail", "0")
        .into_request();

    let response = server.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"result": ["STOP|en|false"]}));
}

#[tokio::test]
async fn test_detailed_result_by_default() {
    let server = setup();
    let request = MultipartBody::new()
        .file("sign.png", &fake_image("STOP"))
        .into_request();

    let response = server.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "result": [[
                [[10.0, 20.0], [110.0, 20.0], [110.0, 40.0], [10.0, 40.0]],
                "STOP|en|false",
                0.75
            ]]
        })
    );
}

#[tokio::test]
async fn test_detailed_entries_contain_plain_numbers() {
    let server = setup();
    let request = MultipartBody::new()
        .file("a.png", &fake_image("x"))
        .text("detail", "1")
        .into_request();

    let body = json_body(server.app.oneshot(request).await.unwrap()).await;

    let entry = &body["result"][0];
    assert_eq!(entry.as_array().unwrap().len(), 3);
    for corner in entry[0].as_array().unwrap() {
        assert!(corner[0].is_number());
        assert!(corner[1].is_number());
    }
    assert!(entry[1].is_string());
    assert!(entry[2].is_f64());
}

#[tokio::test]
async fn test_languages_and_gpu_reach_engine() {
    let server = setup();
    let request = MultipartBody::new()
        .file("menu.jpg", &fake_image("bonjour"))
        .text("langs", " fr , en ")
        .text("detail", "0")
        .text("gpu", "true")
        .into_request();

    let response = server.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"result": ["bonjour|fr+en|true"]}));
    assert!(
        server
            .pool
            .contains(&EngineKey::new(langs(&["fr", "en"]), true))
            .await
    );
}

#[tokio::test]
async fn test_engine_reused_for_same_key() {
    let server = setup();

    for payload in ["one", "two", "three"] {
        let request = MultipartBody::new()
            .file("a.png", &fake_image(payload))
            .text("langs", "en,fr")
            .text("detail", "0")
            .into_request();
        let response = server.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(server.factory.build_count(), 1);
    assert_eq!(server.pool.len().await, 1);
}

#[tokio::test]
async fn test_pool_grows_per_distinct_key() {
    let server = setup();
    let variants = [("en", "false"), ("en,fr", "false"), ("fr,en", "false"), ("en", "true")];

    for (langs, gpu) in variants {
        let request = MultipartBody::new()
            .file("a.png", &fake_image("x"))
            .text("langs", langs)
            .text("gpu", gpu)
            .into_request();
        let response = server.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(server.pool.len().await, 4);
    assert_eq!(server.factory.build_count(), 4);
}

#[tokio::test]
async fn test_corrupt_image_is_server_error() {
    let server = setup();
    let request = MultipartBody::new()
        .file("broken.png", b"definitely not an image")
        .into_request();

    let response = server.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body.get("result").is_none());
    let detail = body["detail"].as_str().unwrap();
    assert!(!detail.is_empty());
    assert!(detail.contains("cannot identify image file"));
}

#[tokio::test]
async fn test_corrupt_image_keeps_engine_cached() {
    let server = setup();
    let request = MultipartBody::new()
        .file("broken.png", b"garbage")
        .into_request();

    server.app.clone().oneshot(request).await.unwrap();

    // Engine construction succeeded before recognition failed
    assert_eq!(server.pool.len().await, 1);
}

#[tokio::test]
async fn test_empty_language_list_is_server_error() {
    let server = setup();
    let request = MultipartBody::new()
        .file("a.png", &fake_image("x"))
        .text("langs", " , ,")
        .into_request();

    let response = server.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({"detail": "at least one language must be specified"})
    );
    assert!(server.pool.is_empty().await);
}

#[tokio::test]
async fn test_unsupported_language_is_not_cached() {
    let server = setup();
    let request = MultipartBody::new()
        .file("a.png", &fake_image("x"))
        .text("langs", "en,klingon")
        .into_request();

    let response = server.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({"detail": "unsupported language code 'klingon'"})
    );
    assert!(server.pool.is_empty().await);
    assert_eq!(server.factory.build_count(), 0);
}

#[tokio::test]
async fn test_missing_file_is_validation_error() {
    let server = setup();
    let request = MultipartBody::new().text("langs", "en").into_request();

    let response = server.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        json_body(response).await,
        json!({
            "detail": [{
                "loc": ["body", "file"],
                "msg": "Field required",
                "type": "missing"
            }]
        })
    );
    assert!(server.pool.is_empty().await);
}

#[tokio::test]
async fn test_empty_detail_and_gpu_use_defaults() {
    let server = setup();
    let request = MultipartBody::new()
        .file("sign.png", &fake_image("STOP"))
        .text("detail", "")
        .text("gpu", "")
        .into_request();

    let response = server.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "result": [[
                [[10.0, 20.0], [110.0, 20.0], [110.0, 40.0], [10.0, 40.0]],
                "STOP|en|false",
                0.75
            ]]
        })
    );
    assert!(server.pool.contains(&EngineKey::new(langs(&["en"]), false)).await);
}

#[tokio::test]
async fn test_file_sent_as_plain_field_is_validation_error() {
    let server = setup();
    let request = MultipartBody::new()
        .text("file", "FAKEIMG:not an upload")
        .into_request();

    let response = server.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["detail"][0]["loc"], json!(["body", "file"]));
    assert_eq!(body["detail"][0]["type"], "missing");
    assert!(server.pool.is_empty().await);
}

#[tokio::test]
async fn test_non_integer_detail_is_validation_error() {
    let server = setup();
    let request = MultipartBody::new()
        .file("a.png", &fake_image("x"))
        .text("detail", "full")
        .into_request();

    let response = server.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["detail"][0]["loc"], json!(["body", "detail"]));
    assert_eq!(body["detail"][0]["type"], "int_parsing");
}

#[tokio::test]
async fn test_unrecognized_gpu_flag_is_validation_error() {
    let server = setup();
    let request = MultipartBody::new()
        .file("a.png", &fake_image("x"))
        .text("gpu", "maybe")
        .into_request();

    let response = server.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["detail"][0]["loc"], json!(["body", "gpu"]));
    assert_eq!(body["detail"][0]["type"], "bool_parsing");
}

#[tokio::test]
async fn test_gpu_flag_spellings() {
    let server = setup();

    for (spelling, expected) in [("1", true), ("YES", true), ("off", false), ("0", false)] {
        let request = MultipartBody::new()
            .file("a.png", &fake_image("x"))
            .text("detail", "0")
            .text("gpu", spelling)
            .into_request();
        let response = server.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"result": [format!("x|en|{}", expected)]})
        );
    }

    assert_eq!(server.pool.len().await, 2);
}

#[tokio::test]
async fn test_unknown_fields_are_ignored() {
    let server = setup();
    let request = MultipartBody::new()
        .text("paragraph", "true")
        .file("a.png", &fake_image("x"))
        .text("detail", "0")
        .into_request();

    let response = server.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"result": ["x|en|false"]}));
}

#[tokio::test]
async fn test_non_multipart_body_is_rejected() {
    let server = setup();
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/readtext")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(r#"{"langs": "en"}"#))
        .unwrap();

    let response = server.app.oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
    assert!(server.pool.is_empty().await);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let server = setup_with_limit(1024);
    let request = MultipartBody::new()
        .file("big.png", &fake_image(&"x".repeat(4096)))
        .into_request();

    let response = server.app.oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
    assert!(server.pool.is_empty().await);
}
