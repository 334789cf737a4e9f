//! 翻译历史，最新的在前，最多保留 50 条

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 历史记录容量
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 毫秒时间戳
    pub id: i64,
    pub at: DateTime<Utc>,
    pub text: String,
    pub target: String,
    pub detected: String,
    pub translated: String,
}

impl HistoryEntry {
    pub fn new(
        text: impl Into<String>,
        target: impl Into<String>,
        detected: impl Into<String>,
        translated: impl Into<String>,
    ) -> Self {
        Self::at(Utc::now(), text, target, detected, translated)
    }

    pub fn at(
        at: DateTime<Utc>,
        text: impl Into<String>,
        target: impl Into<String>,
        detected: impl Into<String>,
        translated: impl Into<String>,
    ) -> Self {
        Self {
            id: at.timestamp_millis(),
            at,
            text: text.into(),
            target: target.into(),
            detected: detected.into(),
            translated: translated.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationHistory {
    entries: Vec<HistoryEntry>,
}

impl TranslationHistory {
    /// 从已保存的记录恢复，超出容量的旧记录被丢弃
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(HISTORY_LIMIT);
        Self { entries }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
