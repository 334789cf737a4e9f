//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制

use std::fmt;

use thiserror::Error;

/// 上游返回的额度耗尽提示
pub const QUOTA_MARKER: &str = "Maximum number of translated words";

/// 翻译错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// 输入验证错误
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 翻译额度耗尽
    #[error("{0}")]
    QuotaExceeded(String),

    /// 翻译服务错误
    #[error("{0}")]
    ServiceError(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 文本生成失败
    #[error("Failed to generate from OpenRouter")]
    GenerationFailed,

    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 本地存储错误
    #[error("存储错误: {0}")]
    Storage(String),
}

impl TranslationError {
    /// 根据上游错误消息分类
    ///
    /// 包含额度提示的消息归为 `QuotaExceeded`，其余归为 `ServiceError`
    pub fn from_upstream_message<T: fmt::Display>(msg: T) -> Self {
        let msg = msg.to_string();
        if msg.contains(QUOTA_MARKER) {
            TranslationError::QuotaExceeded(msg)
        } else {
            TranslationError::ServiceError(msg)
        }
    }

    /// 是否为额度耗尽
    pub fn is_quota(&self) -> bool {
        matches!(self, TranslationError::QuotaExceeded(_))
    }

    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::InvalidInput(_) => ErrorSeverity::Info,
            TranslationError::QuotaExceeded(_) => ErrorSeverity::Warning,
            TranslationError::NetworkError(_) => ErrorSeverity::Warning,
            TranslationError::ServiceError(_) => ErrorSeverity::Error,
            TranslationError::ParseError(_) => ErrorSeverity::Error,
            TranslationError::GenerationFailed => ErrorSeverity::Error,
            TranslationError::Storage(_) => ErrorSeverity::Error,
            TranslationError::ConfigError(_) => ErrorSeverity::Critical,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::InvalidInput(_) => ErrorCategory::Validation,
            TranslationError::QuotaExceeded(_) => ErrorCategory::Quota,
            TranslationError::ServiceError(_) => ErrorCategory::Service,
            TranslationError::NetworkError(_) => ErrorCategory::Service,
            TranslationError::ParseError(_) => ErrorCategory::Parsing,
            TranslationError::GenerationFailed => ErrorCategory::Parsing,
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::Storage(_) => ErrorCategory::Storage,
        }
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// 调用上游之前即被拒绝
    Validation,
    /// 上游额度耗尽
    Quota,
    /// 上游或网络的临时故障
    Service,
    /// 上游响应格式异常
    Parsing,
    Configuration,
    Storage,
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            TranslationError::ParseError(error.to_string())
        } else {
            TranslationError::NetworkError(error.to_string())
        }
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::ParseError(format!("JSON序列化错误: {}", error))
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误
    pub fn log_error(context: &str, error: &TranslationError) {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("{}: {}", context, error),
            ErrorSeverity::Warning => tracing::warn!("{}: {}", context, error),
            ErrorSeverity::Error => tracing::error!("{}: {}", context, error),
            ErrorSeverity::Critical => tracing::error!("{} (严重): {}", context, error),
        }
    }
}
