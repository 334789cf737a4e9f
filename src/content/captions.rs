//! 视频字幕浮层翻译
//!
//! 会话状态：`Idle -> Active -> Idle`，页面卸载后进入 `Disposed` 且不可再启用。
//! 每次停用都会推进代数，晚到的翻译结果代数不符即被丢弃。

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use tokio::task::{spawn_local, JoinHandle};

use super::client::RelayApi;
use super::debounce::Debouncer;
use super::document::CaptionHost;
use crate::locale::locale_code;
use crate::shell::messages::ExtensionMessage;
use crate::shell::storage::PreferenceStore;
use crate::translation::error::TranslationResult;

/// 字幕防抖窗口
pub const CAPTION_DEBOUNCE: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionState {
    Idle,
    Active,
    Disposed,
}

struct CaptionInner<D: CaptionHost> {
    host: Rc<D>,
    relay: Rc<dyn RelayApi>,
    state: Cell<CaptionState>,
    generation: Cell<u64>,
    target_lang: RefCell<String>,
    last_caption: RefCell<String>,
    overlay: RefCell<Option<D::Node>>,
    debouncer: Debouncer,
    watcher: RefCell<Option<JoinHandle<()>>>,
}

/// 字幕翻译会话
pub struct CaptionSession<D: CaptionHost> {
    inner: Rc<CaptionInner<D>>,
}

impl<D: CaptionHost + 'static> CaptionSession<D> {
    pub fn new(host: Rc<D>, relay: Rc<dyn RelayApi>) -> Self {
        Self::with_window(host, relay, CAPTION_DEBOUNCE)
    }

    pub fn with_window(host: Rc<D>, relay: Rc<dyn RelayApi>, window: Duration) -> Self {
        Self {
            inner: Rc::new(CaptionInner {
                host,
                relay,
                state: Cell::new(CaptionState::Idle),
                generation: Cell::new(0),
                target_lang: RefCell::new(String::new()),
                last_caption: RefCell::new(String::new()),
                overlay: RefCell::new(None),
                debouncer: Debouncer::new(window),
                watcher: RefCell::new(None),
            }),
        }
    }

    pub fn state(&self) -> CaptionState {
        self.inner.state.get()
    }

    pub fn target_lang(&self) -> String {
        self.inner.target_lang.borrow().clone()
    }

    pub fn overlay(&self) -> Option<D::Node> {
        self.inner.overlay.borrow().clone()
    }

    /// 启用字幕翻译，挂载隐藏的浮层并开始监听页面变更
    pub fn enable(&self, target_lang: &str) {
        let inner = &self.inner;
        match inner.state.get() {
            CaptionState::Disposed => {
                tracing::warn!("[YT Translator] 会话已销毁，忽略启用请求");
                return;
            }
            CaptionState::Active => {
                *inner.target_lang.borrow_mut() = target_lang.to_string();
                return;
            }
            CaptionState::Idle => {}
        }

        let Some(body) = inner.host.body() else {
            tracing::warn!("[YT Translator] 页面没有 body，无法启用字幕翻译");
            return;
        };

        *inner.target_lang.borrow_mut() = target_lang.to_string();
        *inner.overlay.borrow_mut() = inner.host.mount_overlay();
        inner.state.set(CaptionState::Active);

        let mut mutations = inner.host.observe(&body);
        let weak: Weak<CaptionInner<D>> = Rc::downgrade(inner);
        let watcher = spawn_local(async move {
            while mutations.recv().await.is_some() {
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if inner.state.get() != CaptionState::Active {
                    break;
                }
                let generation = inner.generation.get();
                let target = inner.clone();
                inner
                    .debouncer
                    .schedule(move || on_caption_change(target, generation));
            }
        });
        *inner.watcher.borrow_mut() = Some(watcher);

        tracing::info!("[YT Translator] 字幕翻译已启用 -> {}", target_lang);
    }

    /// 停用：移除浮层、清空上一条字幕，进行中的请求结果将被丢弃
    pub fn disable(&self) {
        let inner = &self.inner;
        if inner.state.get() != CaptionState::Active {
            return;
        }

        inner.generation.set(inner.generation.get() + 1);
        inner.state.set(CaptionState::Idle);
        inner.debouncer.cancel();
        if let Some(watcher) = inner.watcher.borrow_mut().take() {
            watcher.abort();
        }
        if let Some(overlay) = inner.overlay.borrow_mut().take() {
            inner.host.unmount_overlay(&overlay);
        }
        inner.last_caption.borrow_mut().clear();

        tracing::info!("[YT Translator] 字幕翻译已停用");
    }

    /// 页面卸载
    pub fn dispose(&self) {
        self.disable();
        self.inner.state.set(CaptionState::Disposed);
    }

    /// 按偏好设置启用；未开启时保持空闲并返回 `false`
    pub fn activate_from_store(&self, store: &dyn PreferenceStore) -> TranslationResult<bool> {
        if !store.youtube_enabled()? {
            return Ok(false);
        }

        let language = store.target_language()?;
        self.enable(&locale_code(&language));
        Ok(self.state() == CaptionState::Active)
    }

    /// 处理扩展消息，只响应 `DISABLE_YT_TRANSLATION`
    pub fn handle_message(&self, message: &ExtensionMessage) -> bool {
        match message {
            ExtensionMessage::DisableYtTranslation => {
                self.disable();
                true
            }
            _ => false,
        }
    }
}

impl<D: CaptionHost> Drop for CaptionSession<D> {
    fn drop(&mut self) {
        self.inner.debouncer.cancel();
        if let Some(watcher) = self.inner.watcher.borrow_mut().take() {
            watcher.abort();
        }
    }
}

async fn on_caption_change<D: CaptionHost>(inner: Rc<CaptionInner<D>>, generation: u64) {
    let is_current =
        |inner: &CaptionInner<D>| inner.state.get() == CaptionState::Active && inner.generation.get() == generation;

    if !is_current(&inner) {
        return;
    }

    let Some(text) = inner.host.caption_text() else {
        return;
    };
    if *inner.last_caption.borrow() == text {
        return;
    }
    *inner.last_caption.borrow_mut() = text.clone();

    let target_lang = inner.target_lang.borrow().clone();
    tracing::debug!("[YT Translator] 翻译字幕，长度: {}", text.chars().count());

    match inner.relay.translate_text(&text, &target_lang).await {
        Ok(translated) => {
            if !is_current(&inner) {
                tracing::debug!("[YT Translator] 会话已停用，丢弃字幕翻译结果");
                return;
            }
            if inner.overlay.borrow().is_none() {
                *inner.overlay.borrow_mut() = inner.host.mount_overlay();
            }
            if let Some(overlay) = inner.overlay.borrow().as_ref() {
                inner.host.show_overlay(overlay, &translated);
            }
        }
        Err(e) => tracing::error!("[YT Translator] 字幕翻译失败: {}", e),
    }
}
