//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作（属性、类名、文本、遍历）
//! - `document`: 可观察的活动文档，发布结构变化记录

pub mod document;
pub mod dom;

// 重新导出主要的公共 API
pub use document::{Document, MutationKind, MutationRecord};
pub use dom::{
    closest, contains, descendant_elements, descendants, get_child_node_by_name, get_node_attr,
    get_node_name, get_parent_node, get_text, has_class, has_node_attr, html_to_dom, set_class,
    set_node_attr, set_text, text_content, toggle_class,
};
