//! 后台控制器
//!
//! 处理右键菜单、弹窗消息和标签页导航，通过 `TabBridge` 操作浏览器标签页。

use std::rc::Rc;

use thiserror::Error;

use super::messages::{is_restricted_url, is_youtube_watch_url, popup_url, ExtensionMessage};
use super::storage::PreferenceStore;

/// 右键菜单项 id
pub const CONTEXT_MENU_ID: &str = "translate-selection";

/// 右键菜单标题
pub const CONTEXT_MENU_TITLE: &str = "Translate with AI Translator";

/// 通知标题
pub const NOTIFICATION_TITLE: &str = "AI Translator";

pub const RESTRICTED_SELECTION_MESSAGE: &str = "Cannot translate text on chrome:// or system pages.";
pub const RESTRICTED_PAGE_MESSAGE: &str = "Cannot translate chrome:// or system pages.";

/// 选中文本弹窗尺寸
pub const POPUP_SIZE: (u32, u32) = (420, 600);

/// 可注入的内容脚本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentScript {
    PageTranslate,
    CaptionTranslate,
}

impl ContentScript {
    pub fn file(&self) -> &'static str {
        match self {
            ContentScript::PageTranslate => "content/page-translate.js",
            ContentScript::CaptionTranslate => "content/caption-translate.js",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: u32,
    pub url: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("标签页 {tab_id} 操作失败: {message}")]
pub struct BridgeError {
    pub tab_id: u32,
    pub message: String,
}

/// 浏览器标签页操作
pub trait TabBridge {
    fn active_tab(&self) -> Option<Tab>;

    fn tabs(&self) -> Vec<Tab>;

    fn inject(&self, tab_id: u32, script: ContentScript) -> Result<(), BridgeError>;

    fn send(&self, tab_id: u32, message: &ExtensionMessage) -> Result<(), BridgeError>;

    fn notify(&self, title: &str, message: &str);

    fn open_popup(&self, url: &str, width: u32, height: u32);
}

/// 标签页更新事件
#[derive(Debug, Clone, Default)]
pub struct TabChange {
    pub url_changed: bool,
    pub complete: bool,
}

pub struct Background<B: TabBridge> {
    bridge: B,
    store: Rc<dyn PreferenceStore>,
    popup_page: String,
}

impl<B: TabBridge> Background<B> {
    pub fn new(bridge: B, store: Rc<dyn PreferenceStore>, popup_page: impl Into<String>) -> Self {
        Self {
            bridge,
            store,
            popup_page: popup_page.into(),
        }
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// 右键菜单：在弹窗中打开选中文本
    pub fn on_context_menu(&self, menu_id: &str, selection: &str, tab: &Tab) {
        if menu_id != CONTEXT_MENU_ID {
            return;
        }

        if is_restricted_url(&tab.url) {
            self.bridge
                .notify(NOTIFICATION_TITLE, RESTRICTED_SELECTION_MESSAGE);
            return;
        }

        let (width, height) = POPUP_SIZE;
        self.bridge
            .open_popup(&popup_url(&self.popup_page, selection), width, height);
    }

    pub fn on_message(&self, message: &ExtensionMessage) {
        match message {
            ExtensionMessage::TranslatePage { target_lang } => self.translate_page(target_lang),
            ExtensionMessage::ToggleYoutube { enabled } => self.toggle_youtube(*enabled),
            other => tracing::debug!("[Background] 忽略消息: {:?}", other),
        }
    }

    /// 导航到视频页且开关打开时自动注入字幕脚本
    pub fn on_tab_updated(&self, tab: &Tab, change: &TabChange) {
        if !change.url_changed && !change.complete {
            return;
        }
        if tab.url.is_empty() || is_restricted_url(&tab.url) || !is_youtube_watch_url(&tab.url) {
            return;
        }

        match self.store.youtube_enabled() {
            Ok(true) => self.inject(tab.id, ContentScript::CaptionTranslate),
            Ok(false) => {}
            Err(e) => tracing::error!("[Background] 读取字幕开关失败: {}", e),
        }
    }

    fn translate_page(&self, target_lang: &str) {
        let Some(tab) = self.bridge.active_tab() else {
            return;
        };

        if is_restricted_url(&tab.url) {
            self.bridge.notify(NOTIFICATION_TITLE, RESTRICTED_PAGE_MESSAGE);
            return;
        }

        tracing::info!("[Background] 注入整页翻译脚本，目标语言: {}", target_lang);
        if let Err(e) = self.bridge.inject(tab.id, ContentScript::PageTranslate) {
            tracing::error!("[Background] 脚本注入失败: {}", e);
            return;
        }

        let message = ExtensionMessage::StartFullTranslate {
            target_lang: target_lang.to_string(),
        };
        if let Err(e) = self.bridge.send(tab.id, &message) {
            tracing::error!("[Background] 消息发送失败: {}", e);
        }
    }

    fn toggle_youtube(&self, enabled: bool) {
        if let Err(e) = self.store.set_youtube_enabled(enabled) {
            tracing::error!("[Background] 保存字幕开关失败: {}", e);
        }

        let tabs = self
            .bridge
            .tabs()
            .into_iter()
            .filter(|tab| is_youtube_watch_url(&tab.url));

        for tab in tabs {
            if enabled {
                self.inject(tab.id, ContentScript::CaptionTranslate);
            } else if let Err(e) = self.bridge.send(tab.id, &ExtensionMessage::DisableYtTranslation)
            {
                tracing::error!("[Background] 停用消息发送失败: {}", e);
            }
        }
    }

    fn inject(&self, tab_id: u32, script: ContentScript) {
        match self.bridge.inject(tab_id, script) {
            Ok(()) => tracing::debug!("[Background] 已注入 {}", script.file()),
            Err(e) => tracing::error!("[Background] 字幕脚本注入失败: {}", e),
        }
    }
}
