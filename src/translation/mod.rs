//! 翻译模块
//!
//! 在活动文档上原地切换译文与原文：
//! - **core**: 引擎与结构变化监听
//! - **pipeline**: 文本处理管道（收集、过滤、批次）
//! - **storage**: 译文缓存与语言偏好
//! - **config**: 配置管理
//! - **error**: 错误处理
//! - **languages**: 语言注册表
//! - **widget**: 页面上的翻译挂件
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use std::rc::Rc;
//!
//! use farmmind_translate::network::HttpTranslationApi;
//! use farmmind_translate::parsers::Document;
//! use farmmind_translate::translation::{
//!     ApplyOptions, MemoryStore, TranslationEngine, TranslatorConfig,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TranslatorConfig::default();
//! let api = Rc::new(HttpTranslationApi::from_config(&config)?);
//! let document = Document::parse("<body><p>Welcome</p></body>")?;
//! let engine = TranslationEngine::new(document, api, Box::new(MemoryStore::new()), config);
//!
//! engine.init().await?;
//! engine.apply_language("hi", ApplyOptions::default()).await?;
//! println!("{}", engine.document().to_html()?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod languages;
pub mod pipeline;
pub mod storage;
pub mod widget;

// 核心类型
pub use core::{ApplyOptions, ApplyOutcome, MutationWatcher, TranslationEngine};

// 配置
pub use config::{ConfigManager, TranslatorConfig};

// 错误处理
pub use error::{ErrorSeverity, TranslationError, TranslationResult};

pub use languages::{LanguageDescriptor, LanguageRegistry};
pub use pipeline::{TextCollector, TextFilter, TranslatableItem};
pub use storage::{CacheStats, FileStore, LanguageStore, MemoryStore, TranslationCache};
pub use widget::{StatusKind, Widget, WidgetEvent};
