//! 扩展外壳：弹窗、后台、偏好存储与消息

pub mod background;
pub mod history;
pub mod messages;
pub mod popup;
pub mod storage;

pub use background::{Background, BridgeError, ContentScript, Tab, TabBridge, TabChange};
pub use history::{HistoryEntry, TranslationHistory, HISTORY_LIMIT};
pub use messages::ExtensionMessage;
pub use popup::{Popup, TranslationOutcome};
pub use storage::{MemoryStore, PreferenceStore, RedbStore, StoreError};
