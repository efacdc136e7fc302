//! 翻译管道模块
//!
//! 收集可翻译单元、过滤不需翻译的文本、去重并切分批次

pub mod batch;
pub mod collector;
pub mod filters;

// 重新导出主要类型
pub use batch::{unique_keys, BatchPlanner};
pub use collector::{ItemTarget, OriginalValueStore, TextCollector, TranslatableItem};
pub use filters::TextFilter;
