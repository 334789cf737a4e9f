/// ASCII 空白字符
pub const WHITESPACES: &[char] = &[' ', '\t', '\n', '\x0c', '\r'];

/// 翻译时跳过的元素
pub const SKIP_ELEMENTS: &[&str] = &[
    "script", "style", "code", "pre", "noscript", "svg", "math", "canvas", "template", "textarea",
];

/// 需要翻译的属性
pub const TRANSLATABLE_ATTRS: &[&str] = &[
    "title",
    "alt",
    "placeholder",
    "aria-label",
    "aria-description",
];

/// 内容需要翻译的 meta 名称
pub const TRANSLATABLE_META_NAMES: &[&str] = &["description", "keywords"];

/// 是否为跳过的元素
pub fn is_skipped_element(name: &str) -> bool {
    SKIP_ELEMENTS.contains(&name.to_lowercase().as_str())
}
