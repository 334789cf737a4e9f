//! 本地化引擎
//!
//! 中继服务本身不做任何翻译，所有检测和翻译都转发给外部本地化 API。
//! `LocalizationEngine` 是这一外部协作方的抽象，`LingoEngine` 为其 HTTP 实现：
//!
//! - `POST {api}/recognize` 识别文本语言
//! - `POST {api}/i18n` 翻译键值对负载，超过批次大小时分多次请求
//!
//! HTML 翻译在本地完成拆分与回填（见 [`super::html`]），上游只看到键值对。

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::locale::Locale;
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::html::{apply_html_segments, collect_html_segments};

/// 默认 API 地址
pub const DEFAULT_API_URL: &str = "https://engine.lingo.dev";

/// 单次请求的最大条目数
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// 外部本地化服务
#[async_trait]
pub trait LocalizationEngine: Send + Sync {
    /// 识别文本的语言区域，无法识别时返回空字符串
    async fn recognize_locale(&self, text: &str) -> TranslationResult<String>;

    /// 翻译纯文本，源语言自动检测
    async fn localize_text(&self, text: &str, target: &Locale) -> TranslationResult<String>;

    /// 翻译 HTML 文档，保留标记结构
    async fn localize_html(&self, html: &str, target: &Locale) -> TranslationResult<String>;
}

/// Lingo 引擎配置
#[derive(Debug, Clone)]
pub struct LingoConfig {
    pub api_key: String,
    pub api_url: String,
    pub batch_size: usize,
    pub timeout: Option<Duration>,
}

impl LingoConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: None,
        }
    }
}

#[derive(Serialize)]
struct LocalizeParams {
    fast: bool,
}

#[derive(Serialize)]
struct LocalePair<'a> {
    source: Option<&'a str>,
    target: &'a str,
}

#[derive(Serialize)]
struct LocalizeRequest<'a> {
    params: LocalizeParams,
    locale: LocalePair<'a>,
    data: &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
struct RecognizeRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    locale: Option<String>,
}

/// 基于 HTTP 的本地化引擎
#[derive(Clone)]
pub struct LingoEngine {
    config: LingoConfig,
    client: Client,
}

impl LingoEngine {
    /// 创建新的引擎
    pub fn new(config: LingoConfig) -> TranslationResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(TranslationError::ConfigError(
                "LINGODOTDEV_API_KEY is not set".to_string(),
            ));
        }

        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TranslationError::ConfigError(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    /// 翻译键值对负载
    pub async fn localize_object(
        &self,
        payload: &BTreeMap<String, String>,
        target: &Locale,
    ) -> TranslationResult<BTreeMap<String, String>> {
        let mut result = BTreeMap::new();
        if payload.is_empty() {
            return Ok(result);
        }

        let entries: Vec<(&String, &String)> = payload.iter().collect();
        let batch_size = self.config.batch_size.max(1);
        let total = entries.len().div_ceil(batch_size);

        for (index, chunk) in entries.chunks(batch_size).enumerate() {
            let data: BTreeMap<String, String> = chunk
                .iter()
                .map(|(k, v)| ((*k).clone(), (*v).clone()))
                .collect();

            tracing::debug!(
                "发送本地化批次 {}/{}，{} 项 -> {}",
                index + 1,
                total,
                data.len(),
                target
            );

            let translated = self.localize_chunk(&data, target).await?;
            result.extend(translated);
        }

        Ok(result)
    }

    async fn localize_chunk(
        &self,
        data: &BTreeMap<String, String>,
        target: &Locale,
    ) -> TranslationResult<BTreeMap<String, String>> {
        let request = LocalizeRequest {
            params: LocalizeParams { fast: false },
            locale: LocalePair {
                source: None,
                target: target.as_str(),
            },
            data,
        };

        let response = self
            .client
            .post(self.endpoint("i18n"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let body = Self::read_body(response).await?;

        match body.get("data") {
            Some(Value::Object(map)) => Ok(map
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()),
            _ => match body.get("error").and_then(Value::as_str) {
                Some(error) => Err(TranslationError::from_upstream_message(error)),
                None => Err(TranslationError::ParseError(
                    "localization response has no data".to_string(),
                )),
            },
        }
    }

    /// 读取响应体，非成功状态码转换为对应错误
    async fn read_body(response: reqwest::Response) -> TranslationResult<Value> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Value>().await?);
        }

        let reason = status.canonical_reason().unwrap_or("Unknown");
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(text);

        if status.is_server_error() {
            return Err(TranslationError::ServiceError(format!(
                "Server error ({}): {}. {}. This may be due to temporary service issues.",
                status.as_u16(),
                reason,
                message
            )));
        }

        if status == StatusCode::BAD_REQUEST {
            return Err(TranslationError::from_upstream_message(format!(
                "Invalid request ({}): {}. {}",
                status.as_u16(),
                reason,
                message
            )));
        }

        Err(TranslationError::from_upstream_message(message))
    }
}

#[async_trait]
impl LocalizationEngine for LingoEngine {
    async fn recognize_locale(&self, text: &str) -> TranslationResult<String> {
        let response = self
            .client
            .post(self.endpoint("recognize"))
            .bearer_auth(&self.config.api_key)
            .json(&RecognizeRequest { text })
            .send()
            .await?;

        let body = Self::read_body(response).await?;
        let parsed: RecognizeResponse = serde_json::from_value(body)?;
        Ok(parsed.locale.unwrap_or_default())
    }

    async fn localize_text(&self, text: &str, target: &Locale) -> TranslationResult<String> {
        let mut payload = BTreeMap::new();
        payload.insert("text".to_string(), text.to_string());

        let mut translated = self.localize_object(&payload, target).await?;
        translated
            .remove("text")
            .ok_or_else(|| TranslationError::ParseError("missing translated text".to_string()))
    }

    async fn localize_html(&self, html: &str, target: &Locale) -> TranslationResult<String> {
        let segments = collect_html_segments(html);
        tracing::debug!("HTML 拆分出 {} 个可翻译片段", segments.len());

        if segments.is_empty() {
            return Ok(html.to_string());
        }

        let translated = self.localize_object(&segments, target).await?;
        Ok(apply_html_segments(html, &translated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_requires_api_key() {
        let result = LingoEngine::new(LingoConfig::new("  "));
        assert!(matches!(result, Err(TranslationError::ConfigError(_))));
    }

    #[test]
    fn test_endpoint_joining() {
        let mut config = LingoConfig::new("key");
        config.api_url = "http://localhost:9000/".to_string();
        let engine = LingoEngine::new(config).unwrap();
        assert_eq!(engine.endpoint("i18n"), "http://localhost:9000/i18n");
    }

    #[test]
    fn test_request_shape() {
        let mut data = BTreeMap::new();
        data.insert("text".to_string(), "Hello".to_string());
        let request = LocalizeRequest {
            params: LocalizeParams { fast: false },
            locale: LocalePair {
                source: None,
                target: "fr",
            },
            data: &data,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["locale"]["source"], Value::Null);
        assert_eq!(value["locale"]["target"], "fr");
        assert_eq!(value["data"]["text"], "Hello");
    }
}
