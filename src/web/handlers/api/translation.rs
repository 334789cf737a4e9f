//! 翻译相关API处理器
//!
//! 失败时始终回显原文：额度耗尽返回 402，其余错误降级为 200 + `error` 字段。
//! 兼容端点 `/translate` 额外把提到 "API" 或 "limit" 的服务错误映射为 500。

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Map, Value};

use super::{error_response, parse_body, ApiError};
use crate::locale::Locale;
use crate::translation::error::helpers::log_error;
use crate::translation::TranslationError;
use crate::web::types::{
    non_empty, AppState, LegacyTranslateRequest, TranslateHtmlRequest, TranslateHtmlResponse,
    TranslateTextRequest, TranslateTextResponse,
};

/// 额度耗尽时的错误标题
pub const LIMIT_ERROR: &str = "Translation limit reached";

/// 额度耗尽提示
pub const LIMIT_MESSAGE: &str = "Translation limit reached. Please upgrade your Lingo.dev plan.";

/// 兼容端点的额度耗尽提示
pub const LEGACY_LIMIT_MESSAGE: &str = "You've reached the free plan limit for translations. Please upgrade your Lingo.dev plan or wait for the limit to reset.";

/// 通用失败标记
pub const FAILED_ERROR: &str = "Translation failed";

/// 兼容端点的服务错误标题
pub const SERVICE_ERROR: &str = "Translation service error";

/// 回显原文的字段名与额度提示
struct Fallback<'a> {
    field: &'a str,
    original: &'a str,
    limit_message: &'a str,
    legacy: bool,
}

impl Fallback<'_> {
    fn body(&self, mut fields: Map<String, Value>) -> Json<Value> {
        fields.insert(self.field.to_string(), Value::String(self.original.to_string()));
        Json(Value::Object(fields))
    }

    /// 把上游错误映射为回显原文的响应
    fn respond(&self, error: &TranslationError) -> ApiError {
        if error.is_quota() {
            let mut fields = Map::new();
            fields.insert("error".into(), json!(LIMIT_ERROR));
            fields.insert("message".into(), json!(self.limit_message));
            return (StatusCode::PAYMENT_REQUIRED, self.body(fields));
        }

        let message = error.to_string();
        if self.legacy && (message.contains("API") || message.contains("limit")) {
            let mut fields = Map::new();
            fields.insert("error".into(), json!(SERVICE_ERROR));
            fields.insert("message".into(), json!(message));
            return (StatusCode::INTERNAL_SERVER_ERROR, self.body(fields));
        }

        let mut fields = Map::new();
        fields.insert("error".into(), json!(FAILED_ERROR));
        (StatusCode::OK, self.body(fields))
    }
}

fn require_locale(value: Option<String>, field: &str) -> Result<Locale, ApiError> {
    value
        .as_deref()
        .and_then(|v| Locale::parse(v).ok())
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, &format!("invalid {}", field)))
}

/// 纯文本翻译
pub async fn translate_text(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TranslateTextRequest>, JsonRejection>,
) -> Result<Json<TranslateTextResponse>, ApiError> {
    let request = parse_body(body)?;

    let Some(text) = non_empty(request.text) else {
        return Err(error_response(StatusCode::BAD_REQUEST, "no text"));
    };
    let target = require_locale(request.target_lang, "targetLang")?;

    tracing::info!("翻译文本 -> {}，长度: {}", target, text.chars().count());

    match state.engine.localize_text(&text, &target).await {
        Ok(translated) => Ok(Json(TranslateTextResponse { translated })),
        Err(e) => {
            log_error("translateText error", &e);
            Err(Fallback {
                field: "translated",
                original: &text,
                limit_message: LIMIT_MESSAGE,
                legacy: false,
            }
            .respond(&e))
        }
    }
}

/// HTML 翻译
pub async fn translate_html(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TranslateHtmlRequest>, JsonRejection>,
) -> Result<Json<TranslateHtmlResponse>, ApiError> {
    let request = parse_body(body)?;

    let Some(html) = non_empty(request.html) else {
        return Err(error_response(StatusCode::BAD_REQUEST, "no html"));
    };
    let target = require_locale(request.target_lang, "targetLang")?;

    tracing::info!("翻译 HTML -> {}，大小: {} 字节", target, html.len());

    match state.engine.localize_html(&html, &target).await {
        Ok(translated_html) => {
            tracing::info!("HTML 翻译完成");
            Ok(Json(TranslateHtmlResponse { translated_html }))
        }
        Err(e) => {
            log_error("translateHtml error", &e);
            Err(Fallback {
                field: "translatedHtml",
                original: &html,
                limit_message: LIMIT_MESSAGE,
                legacy: false,
            }
            .respond(&e))
        }
    }
}

/// 兼容翻译端点（弹窗使用）
pub async fn translate_legacy(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LegacyTranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateTextResponse>, ApiError> {
    let request = parse_body(body)?;

    let Some(text) = non_empty(request.text) else {
        return Err(error_response(StatusCode::BAD_REQUEST, "no text"));
    };
    let target = require_locale(request.language, "language")?;

    tracing::info!("兼容翻译 -> {}，长度: {}", target, text.chars().count());

    match state.engine.localize_text(&text, &target).await {
        Ok(translated) => Ok(Json(TranslateTextResponse { translated })),
        Err(e) => {
            log_error("translate error", &e);
            Err(Fallback {
                field: "translated",
                original: &text,
                limit_message: LEGACY_LIMIT_MESSAGE,
                legacy: true,
            }
            .respond(&e))
        }
    }
}
