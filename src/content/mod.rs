//! 内容脚本
//!
//! - **client**: 访问中继的客户端
//! - **document**: 页面访问接口
//! - **live_dom**: 基于 rcdom 的可变文档
//! - **debounce**: 单线程防抖
//! - **page**: 整页翻译与增量翻译
//! - **captions**: 视频字幕浮层翻译
//!
//! 流程运行在单线程的 `tokio::task::LocalSet` 上。

pub mod captions;
pub mod client;
pub mod debounce;
pub mod document;
pub mod live_dom;
pub mod page;

pub use captions::{CaptionSession, CaptionState, CAPTION_DEBOUNCE};
pub use client::{HttpRelayClient, RelayApi};
pub use debounce::{DebounceMode, Debouncer, KeyedDebouncer};
pub use document::{
    CaptionHost, DomNode, LogNotifier, MutationBatch, NodeKind, PageDocument, UserNotifier,
};
pub use live_dom::{LiveDocument, LiveNode};
pub use page::{PageConfig, PageSession, PageTranslator, PAGE_DEBOUNCE};
