//! 存储模块
//!
//! 会话内的译文缓存，以及跨会话的语言偏好。

pub mod cache;
pub mod prefs;

pub use cache::{CacheStats, TranslationCache};
pub use prefs::{FileStore, LanguageStore, MemoryStore};
