//! 翻译缓存模块
//!
//! 按目标语言隔离的译文缓存。会话内只增不减，键为去除首尾空白后的原文。

use std::collections::HashMap;

/// 缓存统计信息
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub total_entries: usize,
}

/// 翻译缓存
#[derive(Debug, Default)]
pub struct TranslationCache {
    languages: HashMap<String, HashMap<String, String>>,
    stats: CacheStats,
}

impl TranslationCache {
    /// 创建新的翻译缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 查询译文，空译文视为缺失
    pub fn get(&self, lang: &str, text: &str) -> Option<&str> {
        self.languages
            .get(lang)
            .and_then(|entries| entries.get(text))
            .map(String::as_str)
            .filter(|translated| !translated.is_empty())
    }

    pub fn contains(&self, lang: &str, text: &str) -> bool {
        self.languages
            .get(lang)
            .map(|entries| entries.contains_key(text))
            .unwrap_or(false)
    }

    /// 返回尚未缓存的文本，保持输入顺序，并累计命中统计
    pub fn missing(&mut self, lang: &str, keys: &[String]) -> Vec<String> {
        let missing: Vec<String> = keys
            .iter()
            .filter(|key| !self.contains(lang, key))
            .cloned()
            .collect();
        self.stats.misses += missing.len() as u64;
        self.stats.hits += (keys.len() - missing.len()) as u64;
        missing
    }

    /// 按位置写入一个批次的译文
    pub fn store_batch(&mut self, lang: &str, sources: &[String], translations: Vec<String>) {
        let entries = self.languages.entry(lang.to_string()).or_default();
        for (source, translated) in sources.iter().zip(translations) {
            entries.insert(source.clone(), translated);
        }
        self.stats.total_entries = self.languages.values().map(HashMap::len).sum();
    }

    /// 某语言已缓存的条目数
    pub fn len_for(&self, lang: &str) -> usize {
        self.languages.get(lang).map(HashMap::len).unwrap_or(0)
    }

    pub fn get_stats(&self) -> &CacheStats {
        &self.stats
    }
}
