//! 扩展各上下文之间的消息

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use url::Url;

/// 与 `encodeURIComponent` 相同的保留字符集
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// 按 `action` 字段区分的消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ExtensionMessage {
    /// 后台 -> 页面脚本：开始整页翻译
    #[serde(rename = "START_FULL_TRANSLATE", rename_all = "camelCase")]
    StartFullTranslate { target_lang: String },

    /// 后台 -> 字幕脚本：停用字幕翻译
    #[serde(rename = "DISABLE_YT_TRANSLATION")]
    DisableYtTranslation,

    /// 弹窗 -> 后台：翻译当前标签页
    #[serde(rename = "translatePage", rename_all = "camelCase")]
    TranslatePage { target_lang: String },

    /// 弹窗 -> 后台：切换字幕翻译
    #[serde(rename = "toggleYoutube")]
    ToggleYoutube { enabled: bool },
}

/// 扩展无法注入的系统页面
pub fn is_restricted_url(url: &str) -> bool {
    url.starts_with("chrome://") || url.starts_with("edge://")
}

/// 是否匹配 `*://*.youtube.com/watch*`
pub fn is_youtube_watch_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let host_matches = parsed
        .host_str()
        .map(|host| host == "youtube.com" || host.ends_with(".youtube.com"))
        .unwrap_or(false);

    matches!(parsed.scheme(), "http" | "https")
        && host_matches
        && parsed.path().starts_with("/watch")
}

/// 选中文本的弹窗地址
pub fn popup_url(popup_page: &str, selection: &str) -> String {
    format!(
        "{}?text={}",
        popup_page,
        utf8_percent_encode(selection, URI_COMPONENT)
    )
}
