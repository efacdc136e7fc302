//! 语言偏好存储
//!
//! 保存最近一次应用的语言代码。引擎在初始化时读取，在每次成功切换后写入。

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::translation::error::{helpers::storage_error, TranslationResult};

/// 简单的字符串键值存储
pub trait LanguageStore {
    fn load(&self, key: &str) -> Option<String>;

    fn save(&self, key: &str, value: &str) -> TranslationResult<()>;
}

/// 内存存储，用于测试与嵌入场景
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一个值
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl LanguageStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> TranslationResult<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON 文件存储
///
/// 文件内容为一个字符串到字符串的对象。文件不存在或内容损坏时按空处理。
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return BTreeMap::new(),
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("偏好文件 {} 无法解析，已忽略: {}", self.path.display(), e);
            BTreeMap::new()
        })
    }
}

impl LanguageStore for FileStore {
    fn load(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn save(&self, key: &str, value: &str) -> TranslationResult<()> {
        let mut values = self.read_all();
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    storage_error(format!("无法创建目录 {}: {}", parent.display(), e))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(&values)?;
        fs::write(&self.path, content)
            .map_err(|e| storage_error(format!("无法写入 {}: {}", self.path.display(), e)))?;

        tracing::debug!("已保存偏好 {}={} 到 {}", key, value, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::with_value("fm_translate_lang", "hi");
        assert_eq!(store.load("fm_translate_lang").as_deref(), Some("hi"));
        store.save("fm_translate_lang", "en").unwrap();
        assert_eq!(store.load("fm_translate_lang").as_deref(), Some("en"));
        assert_eq!(store.load("other"), None);
    }

    #[test]
    fn test_file_store_round_trip_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.load("fm_translate_lang"), None);
        store.save("fm_translate_lang", "hi").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.load("fm_translate_lang").as_deref(), Some("hi"));
        assert_eq!(reopened.load("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_store_creates_parent_and_tolerates_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("state.json");
        let store = FileStore::new(&path);
        store.save("k", "v").unwrap();
        assert!(path.exists());

        fs::write(&path, "not json").unwrap();
        assert_eq!(store.load("k"), None);
        store.save("k", "w").unwrap();
        assert_eq!(store.load("k").as_deref(), Some("w"));
    }
}
