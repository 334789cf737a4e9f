//! 翻译模块
//!
//! 中继服务依赖的两个外部协作方及其错误体系：
//! - **engine**: 语言检测、文本和 HTML 本地化
//! - **html**: HTML 可翻译片段的拆分与回填
//! - **generate**: 按情绪改写文本的 chat-completion 调用
//! - **error**: 错误处理

pub mod engine;
pub mod error;
pub mod generate;
pub mod html;

pub use engine::{LingoConfig, LingoEngine, LocalizationEngine};
pub use error::{ErrorCategory, ErrorSeverity, TranslationError, TranslationResult};
pub use generate::{
    clean_ai_response, generate_with_mood, ChatCompletion, ChatMessage, Mood, OpenRouterClient,
    OpenRouterConfig,
};
