//! 中继服务集成测试
//!
//! 通过 `oneshot` 驱动完整路由器，上游由替身代替

#![cfg(feature = "web")]

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use ai_translator::translation::TranslationError;

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::relay::{post_json, router};
use common::{MockCompletion, MockEngine};

fn quota_error() -> TranslationError {
    TranslationError::QuotaExceeded("Maximum number of translated words per month exceeded".into())
}

#[tokio::test]
async fn test_translate_text_success() {
    let engine = Arc::new(MockEngine::new());
    let app = router(engine.clone(), Arc::new(MockCompletion::replying("")));

    let (status, body) = post_json(
        app,
        "/translateText",
        r#"{"text":"Hello","targetLang":"fr"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "translated": "[fr] Hello" }));
    assert_eq!(engine.call_count(), 1);
}

#[tokio::test]
async fn test_missing_fields_rejected_without_upstream_call() {
    let engine = Arc::new(MockEngine::new());
    let completion = Arc::new(MockCompletion::replying(""));

    let cases = [
        ("/translateText", r#"{"targetLang":"fr"}"#, "no text"),
        ("/translateText", r#"{"text":"","targetLang":"fr"}"#, "no text"),
        ("/translateHtml", r#"{"targetLang":"fr"}"#, "no html"),
        ("/translate", r#"{"language":"fr"}"#, "no text"),
        ("/api/generate", r#"{"mood":"happy"}"#, "no text"),
    ];

    for (path, payload, error) in cases {
        let (status, body) = post_json(router(engine.clone(), completion.clone()), path, payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
        assert_eq!(body["error"], error, "{}", path);
    }

    assert_eq!(engine.call_count(), 0);
    assert!(completion.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_locale_never_reaches_engine() {
    let engine = Arc::new(MockEngine::new());
    let completion = Arc::new(MockCompletion::replying(""));

    for target in ["english", "EN", "en-us", "e", "zh_CN", "en-USA"] {
        let payload = json!({ "text": "Hello", "targetLang": target }).to_string();
        let (status, body) =
            post_json(router(engine.clone(), completion.clone()), "/translateText", &payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", target);
        assert_eq!(body["error"], "invalid targetLang");
    }

    let (status, body) = post_json(
        router(engine.clone(), completion.clone()),
        "/translate",
        r#"{"text":"Hello","language":"French"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid language");

    assert_eq!(engine.call_count(), 0);
}

#[tokio::test]
async fn test_region_locale_accepted() {
    let engine = Arc::new(MockEngine::new());
    let app = router(engine.clone(), Arc::new(MockCompletion::replying("")));

    let (status, body) = post_json(
        app,
        "/translateText",
        r#"{"text":"Hello","targetLang":"zh-CN"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["translated"], "[zh-CN] Hello");
}

#[tokio::test]
async fn test_quota_error_returns_402_with_original() {
    let engine = Arc::new(MockEngine::failing(quota_error()));
    let completion = Arc::new(MockCompletion::replying(""));

    let (status, body) = post_json(
        router(engine.clone(), completion.clone()),
        "/translateText",
        r#"{"text":"Hello","targetLang":"fr"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["translated"], "Hello");
    assert_eq!(body["error"], "Translation limit reached");
    assert!(body["message"].as_str().unwrap().contains("upgrade"));

    let (status, body) = post_json(
        router(engine.clone(), completion.clone()),
        "/translateHtml",
        r#"{"html":"<p>Hello</p>","targetLang":"fr"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["translatedHtml"], "<p>Hello</p>");

    let (status, body) = post_json(
        router(engine, completion),
        "/translate",
        r#"{"text":"Hello","language":"fr"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["translated"], "Hello");
    assert!(body["message"].as_str().unwrap().contains("free plan limit"));
}

#[tokio::test]
async fn test_other_failures_fall_back_to_original() {
    let engine = Arc::new(MockEngine::failing(TranslationError::NetworkError(
        "connection reset".into(),
    )));
    let completion = Arc::new(MockCompletion::replying(""));

    let (status, body) = post_json(
        router(engine.clone(), completion.clone()),
        "/translateText",
        r#"{"text":"Hello","targetLang":"fr"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "translated": "Hello", "error": "Translation failed" }));

    let (status, body) = post_json(
        router(engine, completion),
        "/translateHtml",
        r#"{"html":"<p>Hello</p>","targetLang":"fr"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "translatedHtml": "<p>Hello</p>", "error": "Translation failed" })
    );
}

#[tokio::test]
async fn test_legacy_service_error_returns_500() {
    let engine = Arc::new(MockEngine::failing(TranslationError::ServiceError(
        "API temporarily unavailable".into(),
    )));
    let app = router(engine, Arc::new(MockCompletion::replying("")));

    let (status, body) = post_json(app, "/translate", r#"{"text":"Hello","language":"fr"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Translation service error");
    assert_eq!(body["message"], "API temporarily unavailable");
    assert_eq!(body["translated"], "Hello");
}

#[tokio::test]
async fn test_detect_never_errors() {
    let completion = Arc::new(MockCompletion::replying(""));

    let engine = Arc::new(MockEngine::new());
    let (status, body) = post_json(
        router(engine.clone(), completion.clone()),
        "/detect",
        r#"{"text":"Hello there"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "language": "en" }));

    let (status, body) = post_json(router(engine.clone(), completion.clone()), "/detect", "{}").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "language": "" }));
    assert_eq!(engine.call_count(), 1);

    let failing = Arc::new(MockEngine::failing(TranslationError::NetworkError("down".into())));
    let (status, body) = post_json(router(failing, completion), "/detect", r#"{"text":"Hi"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "language": "" }));
}

#[tokio::test]
async fn test_generate() {
    let engine = Arc::new(MockEngine::new());
    let completion = Arc::new(MockCompletion::replying("<s>[OUT] What a day! [/OUT]</s>"));

    let (status, body) = post_json(
        router(engine.clone(), completion.clone()),
        "/api/generate",
        r#"{"text":"It rained","mood":"angry"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "generated": "What a day!" }));

    // 未知情绪按 neutral 处理
    let prompts = completion.prompts.lock().unwrap();
    let user_prompt = &prompts[0].last().unwrap().content;
    assert!(user_prompt.contains("neutral"));
    assert!(user_prompt.contains("It rained"));
    drop(prompts);

    let (status, body) = post_json(
        router(engine, Arc::new(MockCompletion::failing())),
        "/api/generate",
        r#"{"text":"It rained","mood":"happy"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let engine = Arc::new(MockEngine::new());
    let app = router(engine.clone(), Arc::new(MockCompletion::replying("")));

    let (status, body) = post_json(app, "/translateText", "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(engine.call_count(), 0);
}
