//! Web 模块的数据类型定义
//!
//! 请求体字段全部可选：缺失字段由处理器返回 400，而不是由提取器拒绝

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::translation::{ChatCompletion, LocalizationEngine};

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn LocalizationEngine>,
    pub completion: Arc<dyn ChatCompletion>,
}

impl AppState {
    pub fn new(engine: Arc<dyn LocalizationEngine>, completion: Arc<dyn ChatCompletion>) -> Self {
        Self { engine, completion }
    }
}

/// 语言检测请求
#[derive(Debug, Default, Deserialize)]
pub struct DetectRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// 语言检测响应
#[derive(Debug, Serialize, Deserialize)]
pub struct DetectResponse {
    pub language: String,
}

/// 文本翻译请求
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateTextRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub target_lang: Option<String>,
}

/// HTML 翻译请求
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateHtmlRequest {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub target_lang: Option<String>,
}

/// 兼容翻译请求
#[derive(Debug, Default, Deserialize)]
pub struct LegacyTranslateRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// 文本翻译响应
#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateTextResponse {
    pub translated: String,
}

/// HTML 翻译响应
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateHtmlResponse {
    pub translated_html: String,
}

/// 文本生成请求
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
}

/// 文本生成响应
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub generated: String,
}

/// 取出非空字段
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
