//! 活动文档
//!
//! 在 `RcDom` 之上包装一层可观察的文档：页面代码通过这里的方法修改树结构，
//! 每次结构性变化（插入、删除子节点）都会以 [`MutationRecord`] 的形式广播给
//! 所有订阅者。文本内容与属性的原地修改属于字符数据变化，不会产生记录。

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use html5ever::interface::{Attribute, QualName};
use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::format_tendril;
use html5ever::tree_builder::create_element;
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::dom::{
    contains, create_text_node, descendant_elements, get_child_node_by_name, get_node_attr,
    get_node_name, get_parent_node, has_class, html_to_dom, set_node_attr, set_text,
};
use crate::translation::error::{TranslationError, TranslationResult};

/// 结构变化类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
}

/// 一次结构变化
#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub kind: MutationKind,
    /// 发生变化的父节点，弱引用不延长节点生命周期
    pub target: Weak<Node>,
    pub added: usize,
    pub removed: usize,
}

/// 可观察的活动文档
pub struct Document {
    dom: RcDom,
    observers: RefCell<Vec<UnboundedSender<MutationRecord>>>,
}

impl Document {
    /// 从 UTF-8 字符串解析文档
    pub fn parse(html: &str) -> TranslationResult<Self> {
        Self::from_bytes(html.as_bytes(), "utf-8")
    }

    /// 按指定编码解析文档
    pub fn from_bytes(data: &[u8], encoding: &str) -> TranslationResult<Self> {
        Ok(Self::from_dom(html_to_dom(data, encoding)?))
    }

    pub fn from_dom(dom: RcDom) -> Self {
        Self {
            dom,
            observers: RefCell::new(Vec::new()),
        }
    }

    /// 文档根节点
    pub fn root(&self) -> &Handle {
        &self.dom.document
    }

    /// `<html>` 元素
    pub fn html_element(&self) -> Option<Handle> {
        get_child_node_by_name(&self.dom.document, "html")
    }

    /// `<body>` 元素
    pub fn body(&self) -> Option<Handle> {
        self.html_element()
            .and_then(|html| get_child_node_by_name(&html, "body"))
    }

    /// 按文档顺序列出所有元素
    pub fn elements(&self) -> Vec<Handle> {
        descendant_elements(&self.dom.document)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Handle> {
        self.elements()
            .into_iter()
            .find(|el| get_node_attr(el, "id").as_deref() == Some(id))
    }

    pub fn elements_by_class(&self, class_name: &str) -> Vec<Handle> {
        self.elements()
            .into_iter()
            .filter(|el| has_class(el, class_name))
            .collect()
    }

    /// 创建游离元素
    pub fn create_element(&self, tag: &str, attrs: &[(&str, &str)]) -> Handle {
        let attrs = attrs
            .iter()
            .map(|(name, value)| Attribute {
                name: QualName::new(None, ns!(), LocalName::from(*name)),
                value: format_tendril!("{}", value),
            })
            .collect();
        create_element(
            &self.dom,
            QualName::new(None, ns!(html), LocalName::from(tag)),
            attrs,
        )
    }

    /// 创建游离文本节点
    pub fn create_text(&self, text: &str) -> Handle {
        create_text_node(text)
    }

    /// 追加子节点
    pub fn append_child(&self, parent: &Handle, child: &Handle) {
        self.detach(child);
        child.parent.set(Some(Rc::downgrade(parent)));
        parent.children.borrow_mut().push(child.clone());
        self.notify(parent, 1, 0);
    }

    /// 在 `reference` 之前插入子节点，`reference` 不属于 `parent` 时退化为追加
    pub fn insert_before(&self, parent: &Handle, child: &Handle, reference: &Handle) {
        self.detach(child);
        child.parent.set(Some(Rc::downgrade(parent)));
        {
            let mut children = parent.children.borrow_mut();
            match children.iter().position(|c| Rc::ptr_eq(c, reference)) {
                Some(index) => children.insert(index, child.clone()),
                None => children.push(child.clone()),
            }
        }
        self.notify(parent, 1, 0);
    }

    /// 将节点从树中移除
    pub fn remove(&self, node: &Handle) {
        if let Some(parent) = self.detach(node) {
            self.notify(&parent, 0, 1);
        }
    }

    /// 移除元素的全部子节点
    pub fn clear_children(&self, parent: &Handle) {
        let removed: Vec<Handle> = parent.children.borrow_mut().drain(..).collect();
        for child in &removed {
            child.parent.set(None);
        }
        if !removed.is_empty() {
            self.notify(parent, 0, removed.len());
        }
    }

    /// 解析一段 HTML 并追加到 `parent` 末尾，返回新插入的顶层节点
    pub fn append_html(&self, parent: &Handle, markup: &str) -> TranslationResult<Vec<Handle>> {
        let fragment = html_to_dom(format!("<body>{}</body>", markup).as_bytes(), "utf-8")?;
        let fragment_body = get_child_node_by_name(&fragment.document, "html")
            .and_then(|html| get_child_node_by_name(&html, "body"))
            .ok_or_else(|| TranslationError::ParseError("片段缺少 body".to_string()))?;

        let nodes: Vec<Handle> = fragment_body.children.borrow_mut().drain(..).collect();
        if nodes.is_empty() {
            return Ok(nodes);
        }
        {
            let mut children = parent.children.borrow_mut();
            for node in &nodes {
                node.parent.set(Some(Rc::downgrade(parent)));
                children.push(node.clone());
            }
        }
        self.notify(parent, nodes.len(), 0);
        Ok(nodes)
    }

    /// 设置元素的文本内容
    ///
    /// 元素恰好只有一个文本子节点时原地改写（字符数据变化），
    /// 否则替换全部子节点（结构变化）。
    pub fn set_text_content(&self, element: &Handle, text: &str) {
        let single_text = {
            let children = element.children.borrow();
            match children.as_slice() {
                [only] if matches!(only.data, NodeData::Text { .. }) => Some(only.clone()),
                _ => None,
            }
        };

        match single_text {
            Some(node) => set_text(&node, text),
            None => {
                self.clear_children(element);
                if !text.is_empty() {
                    self.append_child(element, &self.create_text(text));
                }
            }
        }
    }

    /// 改写页面已有的字符集声明
    ///
    /// 支持 `<meta charset>` 与 `<meta http-equiv="content-type">` 两种写法，
    /// 没有声明时不做修改。返回是否改写。
    pub fn set_charset(&self, charset: &str) -> bool {
        let mut updated = false;
        for meta in self
            .elements()
            .into_iter()
            .filter(|el| get_node_name(el) == Some("meta"))
        {
            if get_node_attr(&meta, "charset").is_some() {
                set_node_attr(&meta, "charset", Some(charset));
                updated = true;
            } else if get_node_attr(&meta, "http-equiv")
                .unwrap_or_default()
                .eq_ignore_ascii_case("content-type")
                && get_node_attr(&meta, "content").is_some()
            {
                set_node_attr(
                    &meta,
                    "content",
                    Some(&format!("text/html; charset={}", charset)),
                );
                updated = true;
            }
        }
        updated
    }

    /// 订阅结构变化
    pub fn observe(&self) -> UnboundedReceiver<MutationRecord> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.observers.borrow_mut().push(sender);
        receiver
    }

    /// 断开全部订阅者
    pub fn disconnect(&self) {
        self.observers.borrow_mut().clear();
    }

    /// 序列化为 HTML 字符串
    pub fn to_html(&self) -> TranslationResult<String> {
        let mut buf: Vec<u8> = Vec::new();
        let serializable: SerializableHandle = self.dom.document.clone().into();
        serialize(&mut buf, &serializable, SerializeOpts::default())?;
        String::from_utf8(buf)
            .map_err(|e| TranslationError::SerializationError(format!("输出不是合法 UTF-8: {}", e)))
    }

    /// 将节点与旧父节点解除关联，返回旧父节点
    fn detach(&self, node: &Handle) -> Option<Handle> {
        let parent = get_parent_node(node)?;
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
        node.parent.set(None);
        Some(parent)
    }

    fn notify(&self, target: &Handle, added: usize, removed: usize) {
        let observed = match self.body() {
            Some(body) => contains(&body, target),
            None => false,
        };
        if !observed {
            return;
        }

        let record = MutationRecord {
            kind: MutationKind::ChildList,
            target: Rc::downgrade(target),
            added,
            removed,
        };
        self.observers
            .borrow_mut()
            .retain(|sender| sender.send(record.clone()).is_ok());
    }
}
