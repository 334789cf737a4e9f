//! # AI Translator
//!
//! 浏览器翻译扩展的中继服务与内容脚本流程。
//!
//! ## 模块组织
//!
//! - `locale` - 语言代码校验与语言名称表
//! - `translation` - 上游本地化引擎与文本生成服务
//! - `parsers` - HTML 解析与 DOM 工具
//! - `content` - 整页翻译与字幕翻译流程
//! - `shell` - 弹窗、后台与偏好存储
//! - `env` - 环境变量配置
//! - `web` - 中继 Web 服务（可选）

pub mod content;
pub mod env;
pub mod locale;
pub mod parsers;
pub mod shell;
pub mod translation;
#[cfg(feature = "web")]
pub mod web;

pub use locale::{language_name, language_table_code, locale_code, validate_locale, Locale};
pub use translation::{TranslationError, TranslationResult};
