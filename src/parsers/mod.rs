//! # 解析器模块
//!
//! 这个模块包含HTML文档的解析、DOM操作与序列化功能：
//!
//! - `html` - HTML文档解析、DOM节点辅助函数、可观察的活动文档

pub mod html;

// Re-export commonly used items for convenience
pub use html::{html_to_dom, Document, MutationKind, MutationRecord};
