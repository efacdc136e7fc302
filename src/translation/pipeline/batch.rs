//! 翻译批次模块
//!
//! 对待翻译文本去重，并按固定条数切分为批次。每个批次对应一次翻译请求，
//! 同一次操作中的批次严格按顺序发送。

use std::collections::HashSet;

use crate::translation::config::constants;
use crate::translation::pipeline::collector::TranslatableItem;

/// 按首次出现顺序去重
pub fn unique_keys(items: &[TranslatableItem]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(item.key.as_str()))
        .map(|item| item.key.clone())
        .collect()
}

/// 批次规划器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlanner {
    batch_size: usize,
}

impl BatchPlanner {
    /// `batch_size` 为 0 时按 1 处理
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// 将缺失的文本切分为批次，保持原有顺序
    pub fn plan(&self, missing: &[String]) -> Vec<Vec<String>> {
        missing
            .chunks(self.batch_size)
            .map(|chunk| chunk.to_vec())
            .collect()
    }
}

impl Default for BatchPlanner {
    fn default() -> Self {
        Self::new(constants::DEFAULT_BATCH_SIZE)
    }
}
