//! 页面翻译挂件
//!
//! 注入到 body 末尾的浮动控件：切换按钮、语言下拉框、应用/还原按钮和状态栏。
//! 整个挂件带有不翻译标记，自身文本永远不会被收集。

use markup5ever_rcdom::Handle;

use crate::parsers::html::{
    closest, contains, descendant_elements, get_node_attr, get_node_name, has_class,
    set_class, set_node_attr, toggle_class, Document,
};
use crate::translation::config::constants;
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::languages::LanguageDescriptor;

/// 状态栏样式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    None,
    Success,
    Error,
}

impl StatusKind {
    fn class_name(self) -> &'static str {
        match self {
            StatusKind::None => "fm-translate-status",
            StatusKind::Success => "fm-translate-status success",
            StatusKind::Error => "fm-translate-status error",
        }
    }
}

/// 页面交互事件
#[derive(Debug, Clone)]
pub enum WidgetEvent {
    /// 点击浮动按钮
    FabClicked,
    /// 点击页面上任一 `.lang-switch` 元素
    LangSwitchClicked,
    /// 点击“应用”
    ApplyClicked,
    /// 点击还原按钮
    ResetClicked,
    /// 下拉框选择变化
    SelectChanged(String),
    /// 页面任意位置的点击，携带点击目标
    DocumentClicked(Handle),
    /// 键盘按键，携带键名
    KeyDown(String),
}

/// 挂件各部分的节点句柄
#[derive(Debug, Clone)]
pub struct Widget {
    pub root: Handle,
    pub panel: Handle,
    pub fab: Handle,
    pub select: Handle,
    pub apply: Handle,
    pub reset: Handle,
    pub status: Handle,
}

impl Widget {
    /// 构建挂件并追加到 body
    ///
    /// 页面中已存在 `#fmTranslateWidget` 或没有 body 时返回 `None`。
    pub fn build(document: &Document, default_label: &str) -> TranslationResult<Option<Self>> {
        if document.get_element_by_id(constants::WIDGET_ID).is_some() {
            tracing::debug!("页面已有翻译挂件，跳过构建");
            return Ok(None);
        }
        let body = match document.body() {
            Some(body) => body,
            None => return Ok(None),
        };

        let root = document.create_element(
            "div",
            &[
                ("id", constants::WIDGET_ID),
                ("class", "fm-translate"),
                (constants::NO_TRANSLATE_ATTR, "true"),
            ],
        );
        document.append_child(&body, &root);
        document.append_html(&root, &widget_markup(default_label))?;

        let find = |class_name: &str| {
            descendant_elements(&root)
                .into_iter()
                .find(|el| has_class(el, class_name))
                .ok_or_else(|| {
                    TranslationError::ParseError(format!("挂件缺少 .{}", class_name))
                })
        };

        let widget = Self {
            panel: find("fm-translate-panel")?,
            fab: find("fm-translate-fab")?,
            select: find("fm-translate-select")?,
            apply: find("apply")?,
            reset: find("reset")?,
            status: find("fm-translate-status")?,
            root: root.clone(),
        };
        // 预置空文本节点，之后的状态更新都是原地字符数据修改
        document.append_child(&widget.status, &document.create_text(""));

        Ok(Some(widget))
    }

    /// 重新生成下拉选项并选中当前语言
    pub fn render_options(
        &self,
        document: &Document,
        languages: &[LanguageDescriptor],
        current: &str,
    ) {
        document.clear_children(&self.select);
        for lang in languages {
            let option = document.create_element("option", &[("value", lang.code.as_str())]);
            document.append_child(&option, &document.create_text(&lang.label));
            document.append_child(&self.select, &option);
        }
        self.select(current);
    }

    /// 当前选中的语言代码，没有显式选中时取第一项
    pub fn selected_language(&self) -> Option<String> {
        let options = self.options();
        options
            .iter()
            .find(|option| get_node_attr(option, "selected").is_some())
            .or_else(|| options.first())
            .and_then(|option| get_node_attr(option, "value"))
    }

    /// 选中指定语言，返回是否存在该选项
    pub fn select(&self, code: &str) -> bool {
        let mut found = false;
        for option in self.options() {
            let matched = get_node_attr(&option, "value").as_deref() == Some(code);
            set_node_attr(&option, "selected", if matched { Some("") } else { None });
            found |= matched;
        }
        found
    }

    /// 更新状态栏
    pub fn set_status(&self, document: &Document, text: &str, kind: StatusKind) {
        document.set_text_content(&self.status, text);
        set_node_attr(&self.status, "class", Some(kind.class_name()));
    }

    /// 进行中时禁用控件
    pub fn set_busy(&self, busy: bool) {
        for control in [&self.apply, &self.reset, &self.select] {
            set_node_attr(control, "disabled", if busy { Some("") } else { None });
        }
        set_class(&self.panel, "busy", busy);
    }

    pub fn set_open(&self, open: bool) {
        set_class(&self.root, "open", open);
    }

    /// 切换面板，返回切换后是否展开
    pub fn toggle(&self) -> bool {
        toggle_class(&self.root, "open")
    }

    pub fn is_open(&self) -> bool {
        has_class(&self.root, "open")
    }

    pub fn is_busy(&self) -> bool {
        has_class(&self.panel, "busy")
    }

    /// 节点是否位于挂件内
    pub fn contains(&self, node: &Handle) -> bool {
        contains(&self.root, node)
    }

    fn options(&self) -> Vec<Handle> {
        descendant_elements(&self.select)
            .into_iter()
            .filter(|el| get_node_name(el) == Some("option"))
            .collect()
    }
}

/// 点击目标是否位于 `.lang-switch` 元素内
pub fn is_lang_switch_target(node: &Handle) -> bool {
    closest(node, |el| has_class(el, constants::LANG_SWITCH_CLASS)).is_some()
}

fn widget_markup(default_label: &str) -> String {
    format!(
        concat!(
            r#"<button class="fm-translate-fab" type="button">Translate</button>"#,
            r#"<div class="fm-translate-panel" role="dialog" aria-label="Translate page">"#,
            r#"<label class="fm-translate-label" for="fmTranslateSelect">Language</label>"#,
            r#"<select id="fmTranslateSelect" class="fm-translate-select"></select>"#,
            r#"<div class="fm-translate-actions">"#,
            r#"<button class="fm-translate-btn apply" type="button">Apply</button>"#,
            r#"<button class="fm-translate-btn reset" type="button">{}</button>"#,
            r#"</div>"#,
            r#"<div class="fm-translate-status" aria-live="polite"></div>"#,
            r#"</div>"#
        ),
        escape_text(default_label)
    )
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
