// 集成测试公共模块
//
// 提供上游、中继、浏览器标签页的测试替身

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use ai_translator::content::{RelayApi, UserNotifier};
use ai_translator::shell::{BridgeError, ContentScript, ExtensionMessage, Tab, TabBridge};
use ai_translator::translation::{
    ChatCompletion, ChatMessage, LocalizationEngine, Mood, TranslationError, TranslationResult,
};
use ai_translator::Locale;

/// 本地化引擎替身
///
/// 翻译结果为 `"[<target>] <text>"`，设置了 `failure` 时所有调用都返回该错误
pub struct MockEngine {
    pub detected: String,
    pub failure: Option<TranslationError>,
    calls: AtomicUsize,
    texts: Mutex<Vec<String>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            detected: "en".to_string(),
            failure: None,
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: TranslationError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    fn record(&self, text: &str) -> TranslationResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().unwrap().push(text.to_string());
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LocalizationEngine for MockEngine {
    async fn recognize_locale(&self, text: &str) -> TranslationResult<String> {
        self.record(text)?;
        Ok(self.detected.clone())
    }

    async fn localize_text(&self, text: &str, target: &Locale) -> TranslationResult<String> {
        self.record(text)?;
        Ok(format!("[{}] {}", target, text))
    }

    async fn localize_html(&self, html: &str, target: &Locale) -> TranslationResult<String> {
        self.record(html)?;
        Ok(html.replace("Hello", &format!("[{}] Hello", target)))
    }
}

/// chat-completion 替身
pub struct MockCompletion {
    pub reply: TranslationResult<String>,
    pub prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockCompletion {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: Err(TranslationError::ServiceError("OpenRouter returned 503".into())),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatCompletion for MockCompletion {
    async fn complete(&self, messages: Vec<ChatMessage>) -> TranslationResult<String> {
        self.prompts.lock().unwrap().push(messages);
        self.reply.clone()
    }
}

#[cfg(feature = "web")]
pub mod relay {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use ai_translator::web::{create_router, AppState, DEFAULT_BODY_LIMIT};

    use super::{MockCompletion, MockEngine};

    pub fn router(engine: Arc<MockEngine>, completion: Arc<MockCompletion>) -> Router {
        create_router(
            Arc::new(AppState::new(engine, completion)),
            DEFAULT_BODY_LIMIT,
        )
    }

    /// 发送 JSON POST 请求，返回状态码与 JSON 响应体
    pub async fn post_json(router: Router, path: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}

/// 一次中继调用
#[derive(Debug, Clone, PartialEq)]
pub struct RelayCall {
    pub endpoint: &'static str,
    pub text: String,
    pub target: String,
}

/// 内容脚本侧的中继替身
///
/// 文本翻译按 `replies` 查表，未命中时返回 `"Bonjour"`；
/// 设置 `gate` 后每个请求都要等到 `gate.notify_one()` 才返回
pub struct MockRelay {
    calls: RefCell<Vec<RelayCall>>,
    pub replies: RefCell<HashMap<String, String>>,
    pub html_reply: RefCell<TranslationResult<String>>,
    pub failure: RefCell<Option<TranslationError>>,
    pub detected: RefCell<String>,
    pub gate: RefCell<Option<Rc<Notify>>>,
}

impl MockRelay {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            calls: RefCell::new(Vec::new()),
            replies: RefCell::new(HashMap::new()),
            html_reply: RefCell::new(Ok(String::new())),
            failure: RefCell::new(None),
            detected: RefCell::new("fr".to_string()),
            gate: RefCell::new(None),
        })
    }

    pub fn reply(&self, text: &str, translated: &str) {
        self.replies
            .borrow_mut()
            .insert(text.to_string(), translated.to_string());
    }

    pub fn fail_with(&self, error: TranslationError) {
        *self.failure.borrow_mut() = Some(error);
    }

    pub fn calls(&self) -> Vec<RelayCall> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, endpoint: &str) -> Vec<RelayCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .cloned()
            .collect()
    }

    async fn record(&self, endpoint: &'static str, text: &str, target: &str) -> TranslationResult<()> {
        self.calls.borrow_mut().push(RelayCall {
            endpoint,
            text: text.to_string(),
            target: target.to_string(),
        });

        let gate = self.gate.borrow().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        match self.failure.borrow().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn text_reply(&self, text: &str) -> String {
        self.replies
            .borrow()
            .get(text)
            .cloned()
            .unwrap_or_else(|| "Bonjour".to_string())
    }
}

#[async_trait(?Send)]
impl RelayApi for MockRelay {
    async fn detect(&self, text: &str) -> String {
        match self.record("detect", text, "").await {
            Ok(()) => self.detected.borrow().clone(),
            Err(_) => String::new(),
        }
    }

    async fn translate_text(&self, text: &str, target_lang: &str) -> TranslationResult<String> {
        self.record("translateText", text, target_lang).await?;
        Ok(self.text_reply(text))
    }

    async fn translate_html(&self, html: &str, target_lang: &str) -> TranslationResult<String> {
        self.record("translateHtml", html, target_lang).await?;
        self.html_reply.borrow().clone()
    }

    async fn translate(&self, text: &str, language: &str) -> TranslationResult<String> {
        self.record("translate", text, language).await?;
        Ok(self.text_reply(text))
    }

    async fn generate(&self, text: &str, mood: Mood) -> TranslationResult<String> {
        self.record("generate", text, mood.as_str()).await?;
        Ok(format!("({}) {}", mood, text))
    }
}

/// 记录所有提示的提示器
#[derive(Default)]
pub struct RecordingNotifier {
    pub alerts: RefCell<Vec<String>>,
}

impl UserNotifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}

/// 标签页操作记录
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    Inject(u32, ContentScript),
    Send(u32, ExtensionMessage),
    Notify(String),
    Popup(String, u32, u32),
}

/// 浏览器标签页替身
#[derive(Default)]
pub struct MockBridge {
    pub active: RefCell<Option<Tab>>,
    pub open_tabs: RefCell<Vec<Tab>>,
    pub events: RefCell<Vec<BridgeEvent>>,
    pub fail_inject: Cell<bool>,
}

impl MockBridge {
    pub fn with_tabs(tabs: &[(u32, &str)]) -> Self {
        let bridge = Self::default();
        *bridge.open_tabs.borrow_mut() = tabs
            .iter()
            .map(|(id, url)| Tab {
                id: *id,
                url: url.to_string(),
            })
            .collect();
        *bridge.active.borrow_mut() = bridge.open_tabs.borrow().first().cloned();
        bridge
    }

    pub fn events(&self) -> Vec<BridgeEvent> {
        self.events.borrow().clone()
    }
}

impl TabBridge for MockBridge {
    fn active_tab(&self) -> Option<Tab> {
        self.active.borrow().clone()
    }

    fn tabs(&self) -> Vec<Tab> {
        self.open_tabs.borrow().clone()
    }

    fn inject(&self, tab_id: u32, script: ContentScript) -> Result<(), BridgeError> {
        if self.fail_inject.get() {
            return Err(BridgeError {
                tab_id,
                message: "Cannot access contents of the page".into(),
            });
        }
        self.events
            .borrow_mut()
            .push(BridgeEvent::Inject(tab_id, script));
        Ok(())
    }

    fn send(&self, tab_id: u32, message: &ExtensionMessage) -> Result<(), BridgeError> {
        self.events
            .borrow_mut()
            .push(BridgeEvent::Send(tab_id, message.clone()));
        Ok(())
    }

    fn notify(&self, _title: &str, message: &str) {
        self.events
            .borrow_mut()
            .push(BridgeEvent::Notify(message.to_string()));
    }

    fn open_popup(&self, url: &str, width: u32, height: u32) {
        self.events
            .borrow_mut()
            .push(BridgeEvent::Popup(url.to_string(), width, height));
    }
}
