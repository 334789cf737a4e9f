//! 整页翻译与增量翻译
//!
//! 整页翻译把根元素标记发送给中继，成功后一次性替换页面内容，
//! 随后开始监听 body 子树，对新增文本做防抖后的逐节点翻译。

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::{spawn_local, JoinHandle};

use super::client::{RelayApi, INVALID_RESPONSE};
use super::debounce::{DebounceMode, Debouncer, KeyedDebouncer};
use super::document::{DomNode, MutationBatch, MutationReceiver, NodeKind, PageDocument, UserNotifier};
use crate::shell::messages::ExtensionMessage;
use crate::translation::error::{TranslationError, TranslationResult};

/// 增量翻译的默认防抖窗口
pub const PAGE_DEBOUNCE: Duration = Duration::from_millis(400);

/// 中继不可达时的提示
pub const UNREACHABLE_HINT: &str = "Make sure the backend server is running.";

/// 增量翻译配置
#[derive(Debug, Clone, Copy)]
pub struct PageConfig {
    pub debounce_window: Duration,
    pub debounce_mode: DebounceMode,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            debounce_window: PAGE_DEBOUNCE,
            debounce_mode: DebounceMode::default(),
        }
    }
}

/// 整页翻译失败时给用户的提示
///
/// 额度耗尽时显示中继返回的升级提示
pub fn failure_message(error: &TranslationError) -> String {
    let detail = match error {
        TranslationError::QuotaExceeded(message)
        | TranslationError::ServiceError(message)
        | TranslationError::ParseError(message) => message.clone(),
        TranslationError::NetworkError(_) => UNREACHABLE_HINT.to_string(),
        other => other.to_string(),
    };
    format!("Translation failed: {}", detail)
}

/// 从一次变更中挑出需要翻译的文本节点
///
/// 新增的非空文本节点本身；新增元素及其后代中只含单个文本子节点的元素，取该文本节点
pub fn translation_targets<N: DomNode>(batch: &MutationBatch<N>) -> Vec<N> {
    let mut targets = Vec::new();

    for node in &batch.added {
        match node.kind() {
            NodeKind::Text => {
                if !node.text_content().trim().is_empty() {
                    targets.push(node.clone());
                }
            }
            NodeKind::Element => {
                for element in std::iter::once(node.clone()).chain(node.descendant_elements()) {
                    let mut children = element.child_nodes();
                    if children.len() != 1 || children[0].kind() != NodeKind::Text {
                        continue;
                    }
                    let text = children.remove(0);
                    if !text.text_content().trim().is_empty() {
                        targets.push(text);
                    }
                }
            }
            NodeKind::Other => {}
        }
    }

    targets
}

/// 整页翻译器
pub struct PageTranslator<D: PageDocument> {
    document: Rc<D>,
    relay: Rc<dyn RelayApi>,
    notifier: Rc<dyn UserNotifier>,
    config: PageConfig,
}

impl<D: PageDocument + 'static> PageTranslator<D> {
    pub fn new(document: Rc<D>, relay: Rc<dyn RelayApi>, notifier: Rc<dyn UserNotifier>) -> Self {
        Self {
            document,
            relay,
            notifier,
            config: PageConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// 翻译整页并开始增量翻译
    ///
    /// 失败时页面保持不变，用户收到提示，且不会启动监听
    pub async fn translate_full_page(
        &self,
        target_lang: &str,
    ) -> TranslationResult<PageSession<D::Node>> {
        tracing::info!("[AI Translator] 开始整页翻译 -> {}", target_lang);

        let markup = self.document.document_markup();
        let translated = match self.relay.translate_html(&markup, target_lang).await {
            Ok(html) if !html.is_empty() => html,
            Ok(_) => {
                return Err(self.report(TranslationError::ParseError(
                    INVALID_RESPONSE.to_string(),
                )))
            }
            Err(e) => return Err(self.report(e)),
        };

        self.document.replace_root_contents(&translated);
        tracing::info!("[AI Translator] 整页翻译完成");

        let body = self
            .document
            .body()
            .ok_or_else(|| self.report(TranslationError::ParseError("document has no body".into())))?;
        let mutations = self.document.observe(&body);

        Ok(PageSession::start(
            mutations,
            self.relay.clone(),
            target_lang,
            self.config,
        ))
    }

    /// 处理扩展消息，只响应 `START_FULL_TRANSLATE`
    pub async fn handle_message(
        &self,
        message: &ExtensionMessage,
    ) -> Option<TranslationResult<PageSession<D::Node>>> {
        match message {
            ExtensionMessage::StartFullTranslate { target_lang } => {
                Some(self.translate_full_page(target_lang).await)
            }
            _ => None,
        }
    }

    fn report(&self, error: TranslationError) -> TranslationError {
        tracing::error!("[AI Translator] 整页翻译失败: {}", error);
        self.notifier.alert(&failure_message(&error));
        error
    }
}

enum Scheduler {
    Shared(Debouncer),
    PerNode(KeyedDebouncer<usize>),
}

impl Scheduler {
    fn new(config: PageConfig) -> Self {
        match config.debounce_mode {
            DebounceMode::Shared => Scheduler::Shared(Debouncer::new(config.debounce_window)),
            DebounceMode::PerNode => {
                Scheduler::PerNode(KeyedDebouncer::new(config.debounce_window))
            }
        }
    }

    fn schedule<N: DomNode>(&self, node: N, context: &IncrementalContext) {
        let key = node.node_id();
        let context = context.clone();
        let action = move || translate_node(node, context);
        match self {
            Scheduler::Shared(debouncer) => debouncer.schedule(action),
            Scheduler::PerNode(debouncer) => debouncer.schedule(key, action),
        }
    }
}

#[derive(Clone)]
struct IncrementalContext {
    relay: Rc<dyn RelayApi>,
    target_lang: Rc<str>,
    active: Rc<Cell<bool>>,
}

async fn translate_node<N: DomNode>(node: N, context: IncrementalContext) {
    if !context.active.get() || !node.is_connected() {
        return;
    }

    let text = node.text_content();
    let clean = text.trim();
    if clean.is_empty() {
        return;
    }

    match context.relay.translate_text(clean, &context.target_lang).await {
        Ok(translated) => {
            if context.active.get() && node.is_connected() {
                node.set_text_content(&translated);
            } else {
                tracing::debug!("节点已失效，丢弃翻译结果");
            }
        }
        Err(e) => tracing::error!("[AI Translator] 增量翻译失败: {}", e),
    }
}

/// 整页翻译后的增量翻译会话
///
/// 丢弃或调用 `stop` 后不再发出请求，进行中的请求结果也会被丢弃
pub struct PageSession<N: DomNode> {
    target_lang: String,
    active: Rc<Cell<bool>>,
    watcher: JoinHandle<()>,
    _node: std::marker::PhantomData<N>,
}

impl<N: DomNode> PageSession<N> {
    fn start(
        mut mutations: MutationReceiver<N>,
        relay: Rc<dyn RelayApi>,
        target_lang: &str,
        config: PageConfig,
    ) -> Self {
        let active = Rc::new(Cell::new(true));
        let context = IncrementalContext {
            relay,
            target_lang: Rc::from(target_lang),
            active: active.clone(),
        };

        let watcher = spawn_local(async move {
            let scheduler = Scheduler::new(config);
            while let Some(batch) = mutations.recv().await {
                if !context.active.get() {
                    break;
                }
                for node in translation_targets(&batch) {
                    scheduler.schedule(node, &context);
                }
            }
        });

        Self {
            target_lang: target_lang.to_string(),
            active,
            watcher,
            _node: std::marker::PhantomData,
        }
    }

    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    pub fn is_watching(&self) -> bool {
        self.active.get() && !self.watcher.is_finished()
    }

    pub fn stop(&self) {
        if self.active.replace(false) {
            tracing::debug!("停止增量翻译");
        }
        self.watcher.abort();
    }
}

impl<N: DomNode> Drop for PageSession<N> {
    fn drop(&mut self) {
        self.stop();
    }
}
