//! 按情绪改写文本
//!
//! 转发到外部 chat-completion API（OpenRouter 兼容），并清理模型输出中的控制标记

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::translation::error::{TranslationError, TranslationResult};

/// 默认 chat-completion 地址
pub const DEFAULT_COMPLETION_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// 默认模型
pub const DEFAULT_MODEL: &str = "mistralai/mistral-7b-instruct";

/// 默认来源页面
pub const DEFAULT_REFERER: &str = "http://localhost:5173";

/// 请求标题头
pub const APP_TITLE: &str = "ai-hub";

/// 内置系统提示词
pub const SYSTEM_PROMPT: &str = r#"
You are an AI content generator inside a Chrome extension.
Your job is to rewrite or generate text based on the user's mood:

- "happy" → joyful, optimistic
- "sad" → emotional, soft, melancholic
- "excited" → energetic, enthusiastic
- "neutral" → simple, balanced, professional

Preserve meaning. Keep responses clean. Do NOT add unrelated info.
"#;

/// 改写情绪
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Excited,
    #[default]
    Neutral,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Excited => "excited",
            Mood::Neutral => "neutral",
        }
    }

    /// 宽松解析，未知值回退到 neutral
    pub fn from_lenient(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.trim().to_lowercase().parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for Mood {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "happy" => Ok(Mood::Happy),
            "sad" => Ok(Mood::Sad),
            "excited" => Ok(Mood::Excited),
            "neutral" => Ok(Mood::Neutral),
            other => Err(TranslationError::InvalidInput(format!("unknown mood '{}'", other))),
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 构建用户提示词
pub fn build_prompt(text: &str, mood: Mood) -> String {
    format!(
        "\nUser Mood: {}\nUser Input: {}\n\nRewrite or generate text matching the mood. Do not change meaning.\n",
        mood, text
    )
}

fn cleanup_regexes() -> &'static [Regex; 4] {
    static CLEANUP: OnceLock<[Regex; 4]> = OnceLock::new();
    CLEANUP.get_or_init(|| {
        [
            Regex::new(r"(?i)</?s>").expect("valid regex"),
            Regex::new(r"(?i)\[OUT\]|\[/OUT\]").expect("valid regex"),
            Regex::new(r"(?i)\[INST\]|\[/INST\]").expect("valid regex"),
            Regex::new(r"<\|.*?\|>").expect("valid regex"),
        ]
    })
}

/// 清理模型输出中的特殊标记
pub fn clean_ai_response(text: &str) -> String {
    let mut cleaned = text.to_string();
    for re in cleanup_regexes() {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }
    cleaned.trim().to_string()
}

/// 聊天消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// 外部 chat-completion 服务
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// 返回首个候选的原始文本
    async fn complete(&self, messages: Vec<ChatMessage>) -> TranslationResult<String>;
}

/// 按情绪改写，失败统一包装为 `GenerationFailed`
pub async fn generate_with_mood(
    completion: &dyn ChatCompletion,
    text: &str,
    mood: Mood,
) -> TranslationResult<String> {
    let messages = vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_prompt(text, mood)),
    ];

    match completion.complete(messages).await {
        Ok(raw) => Ok(clean_ai_response(&raw)),
        Err(e) => {
            tracing::error!("OpenRouter API Error: {}", e);
            Err(TranslationError::GenerationFailed)
        }
    }
}

/// OpenRouter 客户端配置
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub referer: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: DEFAULT_COMPLETION_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            referer: DEFAULT_REFERER.to_string(),
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

/// OpenRouter chat-completion 客户端
#[derive(Clone)]
pub struct OpenRouterClient {
    config: OpenRouterConfig,
    client: Client,
}

impl OpenRouterClient {
    pub fn new(config: OpenRouterConfig) -> TranslationResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| TranslationError::ConfigError(e.to_string()))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ChatCompletion for OpenRouterClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> TranslationResult<String> {
        tracing::debug!("Sending request to OpenRouter with {} messages", messages.len());

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", APP_TITLE)
            .json(&CompletionRequest {
                model: &self.config.model,
                messages: &messages,
            })
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let data: Value = serde_json::from_str(&text).map_err(|e| {
            TranslationError::ParseError(format!(
                "Invalid JSON response from OpenRouter: {} ({})",
                text, e
            ))
        })?;

        tracing::debug!("OpenRouter response status: {}", status);

        if status != StatusCode::OK {
            let message = data
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");
            return Err(TranslationError::ServiceError(format!(
                "OpenRouter API error: {} - {}",
                status.as_u16(),
                message
            )));
        }

        let choices = data
            .get("choices")
            .and_then(Value::as_array)
            .filter(|choices| !choices.is_empty())
            .ok_or_else(|| {
                TranslationError::ParseError(format!("No response from OpenRouter model: {}", data))
            })?;

        Ok(choices[0]
            .pointer("/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}
