//! 弹窗控制器
//!
//! 文本翻译、情绪改写、目标语言与字幕开关。翻译成功后写入历史。

use std::rc::Rc;

use crate::content::client::RelayApi;
use crate::locale::{language_name, language_table_code};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::Mood;

use super::history::{HistoryEntry, TranslationHistory};
use super::messages::ExtensionMessage;
use super::storage::PreferenceStore;

/// 空输入提示
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter some text to translate.";

/// 一次文本翻译的结果
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationOutcome {
    /// 检测到的源语言名称
    pub detected: String,
    pub target: String,
    pub translated: String,
}

pub struct Popup {
    store: Rc<dyn PreferenceStore>,
    relay: Rc<dyn RelayApi>,
}

impl Popup {
    pub fn new(store: Rc<dyn PreferenceStore>, relay: Rc<dyn RelayApi>) -> Self {
        Self { store, relay }
    }

    pub fn target_language(&self) -> TranslationResult<String> {
        Ok(self.store.target_language()?)
    }

    pub fn set_target(&self, language: &str) -> TranslationResult<()> {
        Ok(self.store.set_target_language(language)?)
    }

    /// 检测语言、翻译并记录历史
    pub async fn translate(&self, text: &str) -> TranslationResult<TranslationOutcome> {
        if text.trim().is_empty() {
            return Err(TranslationError::InvalidInput(EMPTY_INPUT_MESSAGE.to_string()));
        }

        let detected = language_name(&self.relay.detect(text).await).to_string();
        let target = self.store.target_language()?;
        let locale = language_table_code(&target);

        tracing::info!("[Translate] {} -> {}", detected, locale);
        let translated = self.relay.translate(text, locale).await?;

        let mut history = self.store.history()?;
        history.push(HistoryEntry::new(text, &target, &detected, &translated));
        self.store.save_history(&history)?;

        Ok(TranslationOutcome {
            detected,
            target,
            translated,
        })
    }

    pub async fn generate(&self, text: &str, mood: Mood) -> TranslationResult<String> {
        if text.trim().is_empty() {
            return Err(TranslationError::InvalidInput("no text".to_string()));
        }
        self.relay.generate(text, mood).await
    }

    /// 整页翻译请求，交给后台分发
    pub fn translate_page(&self) -> TranslationResult<ExtensionMessage> {
        let target = self.store.target_language()?;
        Ok(ExtensionMessage::TranslatePage {
            target_lang: language_table_code(&target).to_string(),
        })
    }

    /// 切换字幕翻译并返回需要发给后台的消息
    pub fn toggle_youtube(&self) -> TranslationResult<ExtensionMessage> {
        let enabled = !self.store.youtube_enabled()?;
        self.store.set_youtube_enabled(enabled)?;
        Ok(ExtensionMessage::ToggleYoutube { enabled })
    }

    pub fn history(&self) -> TranslationResult<TranslationHistory> {
        Ok(self.store.history()?)
    }

    pub fn clear_history(&self) -> TranslationResult<()> {
        Ok(self.store.save_history(&TranslationHistory::default())?)
    }
}
