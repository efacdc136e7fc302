//! # FarmMind Translate
//!
//! 在页面上原地切换译文与原文的翻译引擎。
//!
//! ## 模块组织
//!
//! - `parsers` - HTML解析、DOM操作与可观察的活动文档
//! - `network` - 翻译服务接口
//! - `translation` - 引擎、文本收集、缓存、语言注册表与挂件
//! - `env` - 环境变量

pub mod env;
pub mod network;
pub mod parsers;
pub mod translation;

// Re-export commonly used items for convenience
pub use network::{HttpTranslationApi, TranslationApi};
pub use parsers::Document;
pub use translation::{
    ApplyOptions, ApplyOutcome, TranslationEngine, TranslationError, TranslationResult,
    TranslatorConfig,
};
