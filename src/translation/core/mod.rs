//! 翻译系统核心模块
//!
//! - **引擎** (`engine.rs`): 应用/还原状态机、批次请求、挂件事件处理
//! - **监听** (`watcher.rs`): 结构变化的去抖监听
//!
//! ```text
//! TranslationEngine (engine.rs)
//!     ├── TextCollector (pipeline/collector.rs)
//!     ├── BatchPlanner (pipeline/batch.rs)
//!     ├── TranslationCache (storage/cache.rs)
//!     ├── LanguageStore (storage/prefs.rs)
//!     ├── LanguageRegistry (languages.rs)
//!     ├── Widget (widget.rs)
//!     └── TranslationApi (network/api.rs)
//! ```

pub mod engine;
pub mod watcher;

pub use engine::{ApplyOptions, ApplyOutcome, TranslationEngine};
pub use watcher::MutationWatcher;
