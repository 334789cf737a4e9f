//! 字幕浮层翻译集成测试

use std::rc::Rc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::LocalSet;
use tokio::time::sleep;

use ai_translator::content::live_dom::OVERLAY_ID;
use ai_translator::content::{CaptionSession, CaptionState, DomNode, LiveDocument, LiveNode};
use ai_translator::shell::{ExtensionMessage, MemoryStore, PreferenceStore};
use ai_translator::translation::TranslationError;

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::MockRelay;

const WATCH_PAGE: &str = r#"<html><body><div class="html5-video-player"><div class="caption-window"><span class="ytp-caption-segment">Hello</span></div></div></body></html>"#;

struct Fixture {
    doc: Rc<LiveDocument>,
    relay: Rc<MockRelay>,
    session: CaptionSession<LiveDocument>,
    window: LiveNode,
}

fn fixture() -> Fixture {
    let doc = Rc::new(LiveDocument::parse(WATCH_PAGE));
    let relay = MockRelay::new();
    let session = CaptionSession::new(doc.clone(), relay.clone());
    let window = doc.query_class("caption-window").unwrap();

    Fixture {
        doc,
        relay,
        session,
        window,
    }
}

impl Fixture {
    /// 播放器重新渲染字幕
    fn render(&self, caption: &str) {
        self.doc.set_inner_html(
            &self.window,
            &format!(r#"<span class="ytp-caption-segment">{}</span>"#, caption),
        );
    }

    fn overlay_text(&self) -> Option<String> {
        self.doc.element_by_id(OVERLAY_ID).map(|o| o.text_content())
    }

    fn overlay_visible(&self) -> bool {
        self.doc
            .element_by_id(OVERLAY_ID)
            .map(|o| self.doc.overlay_visible(&o))
            .unwrap_or(false)
    }

    fn caption_calls(&self) -> Vec<String> {
        self.relay
            .calls_to("translateText")
            .into_iter()
            .map(|c| c.text)
            .collect()
    }
}

#[tokio::test(start_paused = true)]
async fn test_enable_mounts_hidden_overlay_on_player() {
    LocalSet::new()
        .run_until(async {
            let f = fixture();
            assert_eq!(f.session.state(), CaptionState::Idle);
            assert!(f.doc.element_by_id(OVERLAY_ID).is_none());

            f.session.enable("fr");

            assert_eq!(f.session.state(), CaptionState::Active);
            let overlay = f.doc.element_by_id(OVERLAY_ID).unwrap();
            assert_eq!(
                overlay.parent().unwrap().attr("class").as_deref(),
                Some("html5-video-player")
            );
            assert!(!f.overlay_visible());
            assert!(f.relay.calls().is_empty());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_caption_change_translated_once_after_debounce() {
    LocalSet::new()
        .run_until(async {
            let f = fixture();
            f.session.enable("fr");

            f.render("Hello");
            sleep(Duration::from_millis(100)).await;
            assert!(f.caption_calls().is_empty());

            sleep(Duration::from_millis(50)).await;
            assert_eq!(f.caption_calls(), vec!["Hello"]);
            assert_eq!(f.relay.calls_to("translateText")[0].target, "fr");
            assert_eq!(f.overlay_text().as_deref(), Some("Bonjour"));
            assert!(f.overlay_visible());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_identical_caption_is_not_retranslated() {
    LocalSet::new()
        .run_until(async {
            let f = fixture();
            f.relay.reply("World", "Monde");
            f.session.enable("fr");

            f.render("Hello");
            sleep(Duration::from_millis(200)).await;
            f.render("Hello");
            sleep(Duration::from_millis(200)).await;
            assert_eq!(f.caption_calls(), vec!["Hello"]);

            f.render("World");
            sleep(Duration::from_millis(200)).await;
            assert_eq!(f.caption_calls(), vec!["Hello", "World"]);
            assert_eq!(f.overlay_text().as_deref(), Some("Monde"));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_rapid_rerenders_coalesce() {
    LocalSet::new()
        .run_until(async {
            let f = fixture();
            f.session.enable("fr");

            for partial in ["W", "Wo", "Wor", "World"] {
                f.render(partial);
                sleep(Duration::from_millis(40)).await;
            }
            sleep(Duration::from_millis(200)).await;

            assert_eq!(f.caption_calls(), vec!["World"]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_disable_removes_overlay_and_stops_translation() {
    LocalSet::new()
        .run_until(async {
            let f = fixture();
            f.session.enable("fr");
            f.render("Hello");
            sleep(Duration::from_millis(200)).await;
            assert_eq!(f.caption_calls().len(), 1);

            f.session.disable();
            assert_eq!(f.session.state(), CaptionState::Idle);
            assert!(f.doc.element_by_id(OVERLAY_ID).is_none());
            assert!(f.session.overlay().is_none());

            f.render("World");
            sleep(Duration::from_millis(200)).await;
            assert_eq!(f.caption_calls().len(), 1);

            // 重新启用后，上一条字幕已被清空，相同文本会再次翻译
            f.session.enable("fr");
            f.render("Hello");
            sleep(Duration::from_millis(200)).await;
            assert_eq!(f.caption_calls(), vec!["Hello", "Hello"]);
            assert!(f.overlay_visible());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_late_result_after_disable_is_discarded() {
    LocalSet::new()
        .run_until(async {
            let f = fixture();
            let gate = Rc::new(Notify::new());
            *f.relay.gate.borrow_mut() = Some(gate.clone());
            f.session.enable("fr");

            f.render("Hello");
            sleep(Duration::from_millis(150)).await;
            assert_eq!(f.caption_calls().len(), 1);

            f.session.disable();
            gate.notify_one();
            sleep(Duration::from_millis(10)).await;

            assert!(f.doc.element_by_id(OVERLAY_ID).is_none());
            assert!(f.session.overlay().is_none());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_call_degrades_silently() {
    LocalSet::new()
        .run_until(async {
            let f = fixture();
            f.session.enable("fr");
            f.relay
                .fail_with(TranslationError::ServiceError("Server error: 500".into()));

            f.render("Hello");
            sleep(Duration::from_millis(200)).await;
            assert_eq!(f.caption_calls().len(), 1);
            assert!(!f.overlay_visible());
            assert_eq!(f.session.state(), CaptionState::Active);

            // 失败不影响后续字幕
            *f.relay.failure.borrow_mut() = None;
            f.render("World");
            sleep(Duration::from_millis(200)).await;
            assert_eq!(f.caption_calls().len(), 2);
            assert!(f.overlay_visible());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_activation_follows_preferences() {
    LocalSet::new()
        .run_until(async {
            let f = fixture();
            let store = MemoryStore::new();

            assert!(!f.session.activate_from_store(&store).unwrap());
            assert_eq!(f.session.state(), CaptionState::Idle);

            store.set_youtube_enabled(true).unwrap();
            store.set_target_language("Spanish").unwrap();
            assert!(f.session.activate_from_store(&store).unwrap());
            assert_eq!(f.session.state(), CaptionState::Active);
            assert_eq!(f.session.target_lang(), "es");

            f.render("Hello");
            sleep(Duration::from_millis(200)).await;
            assert_eq!(f.relay.calls_to("translateText")[0].target, "es");
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_disable_message_and_dispose() {
    LocalSet::new()
        .run_until(async {
            let f = fixture();
            f.session.enable("fr");

            assert!(!f.session.handle_message(&ExtensionMessage::StartFullTranslate {
                target_lang: "fr".into()
            }));
            assert_eq!(f.session.state(), CaptionState::Active);

            assert!(f.session.handle_message(&ExtensionMessage::DisableYtTranslation));
            assert_eq!(f.session.state(), CaptionState::Idle);

            f.session.enable("fr");
            f.session.dispose();
            assert_eq!(f.session.state(), CaptionState::Disposed);
            assert!(f.doc.element_by_id(OVERLAY_ID).is_none());

            f.session.enable("fr");
            assert_eq!(f.session.state(), CaptionState::Disposed);
        })
        .await;
}
