//! 扩展偏好存储
//!
//! 以 JSON 值按键存取，对应浏览器扩展的 `storage.sync`。
//! `RedbStore` 落盘，`MemoryStore` 仅在进程内有效。

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};
use serde_json::Value;
use thiserror::Error;

use super::history::TranslationHistory;
use crate::translation::error::TranslationError;

/// 存储键
pub mod keys {
    pub const TARGET_LANG: &str = "targetLang";
    pub const YOUTUBE_ENABLED: &str = "youtubeEnabled";
    pub const HISTORY: &str = "history";
}

/// 未设置目标语言时的默认值
pub const DEFAULT_TARGET_LANGUAGE: &str = "English";

const PREFERENCES_TABLE: TableDefinition<&str, &str> = TableDefinition::new("preferences");

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("数据库错误: {0}")]
    Database(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    fn database<E: Display>(e: E) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<StoreError> for TranslationError {
    fn from(error: StoreError) -> Self {
        TranslationError::Storage(error.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// 偏好存储
pub trait PreferenceStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    fn set(&self, key: &str, value: Value) -> StoreResult<()>;

    /// 目标语言名称，例如 "French"
    fn target_language(&self) -> StoreResult<String> {
        Ok(self
            .get(keys::TARGET_LANG)?
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_TARGET_LANGUAGE.to_string()))
    }

    fn set_target_language(&self, name: &str) -> StoreResult<()> {
        self.set(keys::TARGET_LANG, Value::String(name.to_string()))
    }

    fn youtube_enabled(&self) -> StoreResult<bool> {
        Ok(self
            .get(keys::YOUTUBE_ENABLED)?
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    fn set_youtube_enabled(&self, enabled: bool) -> StoreResult<()> {
        self.set(keys::YOUTUBE_ENABLED, Value::Bool(enabled))
    }

    fn history(&self) -> StoreResult<TranslationHistory> {
        match self.get(keys::HISTORY)? {
            Some(value) => Ok(TranslationHistory::from_entries(serde_json::from_value(
                value,
            )?)),
            None => Ok(TranslationHistory::default()),
        }
    }

    fn save_history(&self, history: &TranslationHistory) -> StoreResult<()> {
        self.set(keys::HISTORY, serde_json::to_value(history.entries())?)
    }
}

/// 进程内存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        self.values.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

/// 基于 redb 的落盘存储
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(StoreError::database)?;
        }

        let db = Database::create(path).map_err(StoreError::database)?;

        // 预先建表，之后的只读事务不必处理表不存在
        let write_txn = db.begin_write().map_err(StoreError::database)?;
        {
            let _table = write_txn
                .open_table(PREFERENCES_TABLE)
                .map_err(StoreError::database)?;
        }
        write_txn.commit().map_err(StoreError::database)?;

        tracing::debug!("偏好存储已打开: {}", path.display());
        Ok(Self { db })
    }

    /// 当前保存的全部键
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let read_txn = self.db.begin_read().map_err(StoreError::database)?;
        let table = read_txn
            .open_table(PREFERENCES_TABLE)
            .map_err(StoreError::database)?;

        let mut keys = Vec::new();
        for entry in table.iter().map_err(StoreError::database)? {
            let (key, _) = entry.map_err(StoreError::database)?;
            keys.push(key.value().to_string());
        }
        Ok(keys)
    }
}

impl PreferenceStore for RedbStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let read_txn = self.db.begin_read().map_err(StoreError::database)?;
        let table = read_txn
            .open_table(PREFERENCES_TABLE)
            .map_err(StoreError::database)?;

        match table.get(key).map_err(StoreError::database)? {
            Some(raw) => Ok(Some(serde_json::from_str(raw.value())?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        let serialized = serde_json::to_string(&value)?;
        let write_txn = self.db.begin_write().map_err(StoreError::database)?;
        {
            let mut table = write_txn
                .open_table(PREFERENCES_TABLE)
                .map_err(StoreError::database)?;
            table
                .insert(key, serialized.as_str())
                .map_err(StoreError::database)?;
        }
        write_txn.commit().map_err(StoreError::database)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let store = MemoryStore::new();
        assert_eq!(store.target_language().unwrap(), "English");
        assert!(!store.youtube_enabled().unwrap());
        assert!(store.history().unwrap().is_empty());
    }

    #[test]
    fn test_typed_accessors() {
        let store = MemoryStore::new();
        store.set_target_language("French").unwrap();
        store.set_youtube_enabled(true).unwrap();

        assert_eq!(store.target_language().unwrap(), "French");
        assert!(store.youtube_enabled().unwrap());
        assert_eq!(store.get(keys::YOUTUBE_ENABLED).unwrap(), Some(Value::Bool(true)));
    }

    #[test]
    fn test_wrong_value_type_falls_back() {
        let store = MemoryStore::new();
        store.set(keys::YOUTUBE_ENABLED, Value::String("yes".into())).unwrap();
        assert!(!store.youtube_enabled().unwrap());
    }
}
