//! 扩展端访问中继服务的客户端
//!
//! 内容脚本和弹窗通过 `RelayApi` 调用中继；`HttpRelayClient` 为 HTTP 实现。
//! 状态码约定与中继一致：402 为额度耗尽，其它非 2xx 为服务错误。
//! 中继的 200 降级响应带有 `error` 字段，同样视为服务错误。

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::Mood;

/// 无法从响应中取到预期字段
pub const INVALID_RESPONSE: &str = "Invalid response from server";

/// 402 响应缺少 message 时的默认提示
pub const DEFAULT_LIMIT_MESSAGE: &str =
    "Translation limit reached. Please upgrade your Lingo.dev plan.";

/// 中继服务接口
///
/// 内容脚本运行在单线程事件循环上，实现不要求 `Send`
#[async_trait(?Send)]
pub trait RelayApi {
    /// 检测语言，失败时返回空字符串
    async fn detect(&self, text: &str) -> String;

    /// `/translateText`
    async fn translate_text(&self, text: &str, target_lang: &str) -> TranslationResult<String>;

    /// `/translateHtml`
    async fn translate_html(&self, html: &str, target_lang: &str) -> TranslationResult<String>;

    /// `/translate`（兼容端点）
    async fn translate(&self, text: &str, language: &str) -> TranslationResult<String>;

    /// `/api/generate`
    async fn generate(&self, text: &str, mood: Mood) -> TranslationResult<String>;
}

/// 基于 HTTP 的中继客户端
#[derive(Clone)]
pub struct HttpRelayClient {
    base_url: String,
    client: Client,
}

impl HttpRelayClient {
    pub fn new(base_url: impl Into<String>) -> TranslationResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| TranslationError::ConfigError(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> TranslationResult<Value> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let data: Value = response.json().await.unwrap_or(Value::Null);

        if status.is_success() {
            return match fallback_error(&data) {
                Some(error) => {
                    tracing::warn!("中继返回降级结果 {}: {}", path, error);
                    Err(TranslationError::ServiceError(error))
                }
                None => Ok(data),
            };
        }

        Err(error_from_response(status, &data))
    }
}

/// 把失败响应转换为错误
pub fn error_from_response(status: StatusCode, data: &Value) -> TranslationError {
    let field = |name: &str| {
        data.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    if status == StatusCode::PAYMENT_REQUIRED {
        return TranslationError::QuotaExceeded(
            field("message").unwrap_or_else(|| DEFAULT_LIMIT_MESSAGE.to_string()),
        );
    }

    TranslationError::ServiceError(
        field("message")
            .or_else(|| field("error"))
            .unwrap_or_else(|| format!("Server error: {}", status.as_u16())),
    )
}

/// 2xx 响应中的 `error` 字段，表示中继已回退为原文
pub fn fallback_error(data: &Value) -> Option<String> {
    data.get("error")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// 取出非空字符串字段
pub fn required_field(data: &Value, name: &str) -> TranslationResult<String> {
    data.get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| TranslationError::ParseError(INVALID_RESPONSE.to_string()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TextBody<'a> {
    text: &'a str,
    target_lang: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HtmlBody<'a> {
    html: &'a str,
    target_lang: &'a str,
}

#[derive(Serialize)]
struct LegacyBody<'a> {
    text: &'a str,
    language: &'a str,
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    text: &'a str,
    mood: Mood,
}

#[async_trait(?Send)]
impl RelayApi for HttpRelayClient {
    async fn detect(&self, text: &str) -> String {
        match self.post("/detect", &serde_json::json!({ "text": text })).await {
            Ok(data) => data
                .get("language")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            Err(e) => {
                tracing::debug!("语言检测失败: {}", e);
                String::new()
            }
        }
    }

    async fn translate_text(&self, text: &str, target_lang: &str) -> TranslationResult<String> {
        let data = self
            .post("/translateText", &TextBody { text, target_lang })
            .await?;
        required_field(&data, "translated")
    }

    async fn translate_html(&self, html: &str, target_lang: &str) -> TranslationResult<String> {
        let data = self
            .post("/translateHtml", &HtmlBody { html, target_lang })
            .await?;
        required_field(&data, "translatedHtml")
    }

    async fn translate(&self, text: &str, language: &str) -> TranslationResult<String> {
        let data = self.post("/translate", &LegacyBody { text, language }).await?;
        required_field(&data, "translated")
    }

    async fn generate(&self, text: &str, mood: Mood) -> TranslationResult<String> {
        let data = self.post("/api/generate", &GenerateBody { text, mood }).await?;
        required_field(&data, "generated")
    }
}
