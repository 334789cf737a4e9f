//! 语言区域标签校验与语言名称映射
//!
//! 所有发往上游翻译服务的目标语言都必须先通过这里的校验

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::translation::error::{TranslationError, TranslationResult};

/// 语言区域标签格式：2-3 个小写字母，可选 "-" 加 2 个大写字母
pub const LOCALE_PATTERN: &str = r"^[a-z]{2,3}(-[A-Z]{2})?$";

/// 默认目标语言名称
pub const DEFAULT_LANGUAGE_NAME: &str = "English";

/// 默认语言代码
pub const DEFAULT_LOCALE_CODE: &str = "en";

/// 扩展界面提供的语言列表（名称, 代码）
pub const LANGUAGES: &[(&str, &str)] = &[
    ("English", "en"),
    ("Hindi", "hi"),
    ("Tamil", "ta"),
    ("Telugu", "te"),
    ("Kannada", "kn"),
    ("Malayalam", "ml"),
    ("Spanish", "es"),
    ("French", "fr"),
];

fn locale_regex() -> &'static Regex {
    static LOCALE_REGEX: OnceLock<Regex> = OnceLock::new();
    LOCALE_REGEX.get_or_init(|| Regex::new(LOCALE_PATTERN).expect("locale pattern is valid"))
}

/// 校验语言区域标签
pub fn validate_locale(locale: &str) -> bool {
    locale_regex().is_match(locale)
}

/// 已校验的语言区域标签
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale(String);

impl Locale {
    /// 解析并校验语言区域标签
    pub fn parse(value: &str) -> TranslationResult<Self> {
        if validate_locale(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(TranslationError::InvalidInput(format!(
                "invalid locale '{}'",
                value
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Locale {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 语言名称转语言代码
///
/// 不在表中的短代码（不超过 3 个字符）原样返回，其余情况回退到 `en`
pub fn locale_code(language_name: &str) -> String {
    if let Some((_, code)) = LANGUAGES.iter().find(|(name, _)| *name == language_name) {
        return (*code).to_string();
    }

    if !language_name.is_empty() && language_name.chars().count() <= 3 {
        return language_name.to_string();
    }

    DEFAULT_LOCALE_CODE.to_string()
}

/// 语言名称转语言代码，只查表
///
/// 弹窗保存的是显示名称，不在表中的名称一律回退到 `en`
pub fn language_table_code(language_name: &str) -> &'static str {
    LANGUAGES
        .iter()
        .find(|(name, _)| *name == language_name)
        .map(|(_, code)| *code)
        .unwrap_or(DEFAULT_LOCALE_CODE)
}

/// 语言代码转显示名称，未知代码回退到 `English`
pub fn language_name(locale_code: &str) -> &'static str {
    LANGUAGES
        .iter()
        .find(|(_, code)| *code == locale_code)
        .map(|(name, _)| *name)
        .unwrap_or(DEFAULT_LANGUAGE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_locales() {
        for locale in ["en", "fr", "zh-CN", "pt-BR", "haw", "yue-HK"] {
            assert!(validate_locale(locale), "{} should be accepted", locale);
        }
    }

    #[test]
    fn test_invalid_locales() {
        for locale in ["", "e", "english", "en-us", "EN", "12", "en-USA", "en_US", "zh-CN ", "en-"] {
            assert!(!validate_locale(locale), "{:?} should be rejected", locale);
        }
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!(Locale::parse("zh-CN").unwrap().as_str(), "zh-CN");
        assert!(matches!(
            Locale::parse("en-us"),
            Err(TranslationError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_language_map() {
        assert_eq!(locale_code("Hindi"), "hi");
        assert_eq!(locale_code("French"), "fr");
        assert_eq!(locale_code("de"), "de");
        assert_eq!(locale_code("Klingon"), "en");
        assert_eq!(locale_code(""), "en");

        assert_eq!(language_table_code("Tamil"), "ta");
        assert_eq!(language_table_code("Foo"), "en");
        assert_eq!(language_table_code("de"), "en");

        assert_eq!(language_name("ta"), "Tamil");
        assert_eq!(language_name("xx"), "English");
        assert_eq!(language_name(""), "English");
    }
}
