//! 文本收集器模块
//!
//! 从活动文档中收集可翻译的文本节点与属性，并记录每个位置的原始值。

use std::collections::HashMap;
use std::rc::{Rc, Weak};

use markup5ever_rcdom::{Handle, Node, NodeData};

use crate::parsers::html::{
    get_node_attr, get_node_name, get_text, has_node_attr, set_node_attr, set_text, Document,
};
use crate::translation::config::constants;
use crate::translation::pipeline::filters::{excludes_subtree, is_opted_out, TextFilter};

/// 可翻译位置
#[derive(Debug, Clone)]
pub enum ItemTarget {
    /// 文本节点，保留原始前后空白
    Text {
        node: Handle,
        leading: String,
        trailing: String,
        original: String,
    },
    /// 元素属性
    Attribute {
        element: Handle,
        name: String,
        original: String,
    },
}

/// 单个可翻译单元
///
/// 只在一次应用/还原过程中持有，`key` 为原始值去除首尾空白后的文本。
#[derive(Debug, Clone)]
pub struct TranslatableItem {
    pub key: String,
    pub target: ItemTarget,
}

impl TranslatableItem {
    /// 显示译文
    pub fn apply(&self, text: &str) {
        match &self.target {
            ItemTarget::Text {
                node,
                leading,
                trailing,
                ..
            } => set_text(node, &format!("{}{}{}", leading, text, trailing)),
            ItemTarget::Attribute { element, name, .. } => {
                set_node_attr(element, name, Some(text))
            }
        }
    }

    /// 写回首次读取到的原始值
    pub fn restore(&self) {
        match &self.target {
            ItemTarget::Text { node, original, .. } => set_text(node, original),
            ItemTarget::Attribute {
                element,
                name,
                original,
            } => set_node_attr(element, name, Some(original)),
        }
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self.target, ItemTarget::Attribute { .. })
    }
}

/// 以节点身份为键的原始值表
///
/// 只保存弱引用，不延长节点生命周期；节点释放后对应条目在下次 `prune` 时清除。
/// 条目一旦写入就不再覆盖。
#[derive(Debug, Default)]
pub struct OriginalValueStore {
    texts: HashMap<*const Node, (Weak<Node>, String)>,
    attrs: HashMap<*const Node, (Weak<Node>, HashMap<String, Option<String>>)>,
}

impl OriginalValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 文本节点的原始内容，首次读取时记录
    pub fn text(&mut self, node: &Handle) -> String {
        let key = Rc::as_ptr(node);
        let live = matches!(self.texts.get(&key), Some((weak, _)) if weak.strong_count() > 0);
        if !live {
            let current = get_text(node).unwrap_or_default();
            self.texts.insert(key, (Rc::downgrade(node), current));
        }
        self.texts
            .get(&key)
            .map(|(_, original)| original.clone())
            .unwrap_or_default()
    }

    /// 属性的原始值，首次读取时记录（属性不存在时记录为 `None`）
    pub fn attr(&mut self, element: &Handle, name: &str) -> Option<String> {
        let key = Rc::as_ptr(element);
        let live = matches!(self.attrs.get(&key), Some((weak, _)) if weak.strong_count() > 0);
        if !live {
            self.attrs
                .insert(key, (Rc::downgrade(element), HashMap::new()));
        }
        let (_, values) = self.attrs.get_mut(&key)?;
        values
            .entry(name.to_string())
            .or_insert_with(|| get_node_attr(element, name))
            .clone()
    }

    /// 清除已释放节点的条目
    pub fn prune(&mut self) {
        self.texts.retain(|_, (weak, _)| weak.strong_count() > 0);
        self.attrs.retain(|_, (weak, _)| weak.strong_count() > 0);
    }

    /// 当前记录的节点数
    pub fn len(&self) -> usize {
        self.texts.len() + self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 收集统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CollectionStats {
    text_items: usize,
    attribute_items: usize,
    skipped: usize,
}

/// 文本收集器
pub struct TextCollector<'a> {
    filter: &'a TextFilter,
    stats: CollectionStats,
}

impl<'a> TextCollector<'a> {
    pub fn new(filter: &'a TextFilter) -> Self {
        Self {
            filter,
            stats: CollectionStats::default(),
        }
    }

    /// 收集文档当前全部可翻译单元
    ///
    /// 先按文档顺序收集 body 下的文本节点，再按文档顺序收集属性。
    pub fn collect(
        &mut self,
        document: &Document,
        originals: &mut OriginalValueStore,
    ) -> Vec<TranslatableItem> {
        originals.prune();
        self.stats = CollectionStats::default();

        let mut items = Vec::new();
        if let Some(body) = document.body() {
            if !excludes_subtree(&body) {
                self.collect_text_nodes(&body, originals, &mut items);
            }
        }
        self.collect_attributes(document, originals, &mut items);

        tracing::debug!(
            "收集到 {} 个文本、{} 个属性，跳过 {} 个",
            self.stats.text_items,
            self.stats.attribute_items,
            self.stats.skipped
        );
        items
    }

    fn collect_text_nodes(
        &mut self,
        parent: &Handle,
        originals: &mut OriginalValueStore,
        items: &mut Vec<TranslatableItem>,
    ) {
        for child in parent.children.borrow().iter() {
            match child.data {
                NodeData::Text { .. } => self.add_text_item(child, originals, items),
                NodeData::Element { .. } => {
                    if !excludes_subtree(child) {
                        self.collect_text_nodes(child, originals, items);
                    }
                }
                _ => {}
            }
        }
    }

    fn add_text_item(
        &mut self,
        node: &Handle,
        originals: &mut OriginalValueStore,
        items: &mut Vec<TranslatableItem>,
    ) {
        let original = originals.text(node);
        let trimmed = original.trim();
        if self.filter.should_skip(trimmed) {
            if !trimmed.is_empty() {
                self.stats.skipped += 1;
            }
            return;
        }

        let leading = &original[..original.len() - original.trim_start().len()];
        let trailing = &original[original.trim_end().len()..];

        items.push(TranslatableItem {
            key: trimmed.to_string(),
            target: ItemTarget::Text {
                node: node.clone(),
                leading: leading.to_string(),
                trailing: trailing.to_string(),
                original: original.clone(),
            },
        });
        self.stats.text_items += 1;
    }

    fn collect_attributes(
        &mut self,
        document: &Document,
        originals: &mut OriginalValueStore,
        items: &mut Vec<TranslatableItem>,
    ) {
        for element in document.elements() {
            if !is_attribute_target(&element) || is_opted_out(&element) {
                continue;
            }

            for name in eligible_attributes(&element) {
                self.add_attr_item(&element, name, originals, items);
            }
        }
    }

    fn add_attr_item(
        &mut self,
        element: &Handle,
        name: &str,
        originals: &mut OriginalValueStore,
        items: &mut Vec<TranslatableItem>,
    ) {
        let original = match originals.attr(element, name) {
            Some(value) if !value.is_empty() => value,
            _ => return,
        };
        let trimmed = original.trim();
        if self.filter.should_skip(trimmed) {
            self.stats.skipped += 1;
            return;
        }

        items.push(TranslatableItem {
            key: trimmed.to_string(),
            target: ItemTarget::Attribute {
                element: element.clone(),
                name: name.to_string(),
                original: original.clone(),
            },
        });
        self.stats.attribute_items += 1;
    }
}

/// 元素是否匹配 `[placeholder], [title], [aria-label], img[alt], input[value]`
fn is_attribute_target(element: &Handle) -> bool {
    let tag = get_node_name(element).unwrap_or_default();
    constants::TRANSLATABLE_ATTRS
        .iter()
        .any(|attr| has_node_attr(element, attr))
        || (tag == "img" && has_node_attr(element, "alt"))
        || (tag == "input" && has_node_attr(element, "value"))
}

/// 元素上可翻译的属性名
fn eligible_attributes(element: &Handle) -> Vec<&'static str> {
    match get_node_name(element).unwrap_or_default() {
        "input" => {
            let input_type = get_node_attr(element, "type")
                .unwrap_or_else(|| "text".to_string())
                .to_lowercase();
            if constants::BUTTON_INPUT_TYPES.contains(&input_type.as_str()) {
                vec!["value"]
            } else if has_node_attr(element, "placeholder") {
                vec!["placeholder"]
            } else {
                Vec::new()
            }
        }
        "textarea" => {
            if has_node_attr(element, "placeholder") {
                vec!["placeholder"]
            } else {
                Vec::new()
            }
        }
        tag => {
            let mut names: Vec<&'static str> = constants::TRANSLATABLE_ATTRS
                .iter()
                .copied()
                .filter(|attr| has_node_attr(element, attr))
                .collect();
            if tag == "img" && has_node_attr(element, "alt") {
                names.push("alt");
            }
            names
        }
    }
}
