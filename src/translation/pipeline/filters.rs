//! 文本过滤器模块
//!
//! 判断文本是否需要翻译，以及元素是否被页面作者标记为不翻译

use std::collections::HashSet;
use std::sync::OnceLock;

use markup5ever_rcdom::Handle;
use regex::Regex;

use crate::parsers::html::{closest, get_node_attr, get_node_name, has_class, has_node_attr};
use crate::translation::config::constants;

/// 文本过滤器
pub struct TextFilter {
    /// 不翻译的品牌词
    skip_texts: HashSet<String>,
}

/// 链接匹配规则，输入只需按 ASCII 忽略大小写
fn url_regex() -> Option<&'static Regex> {
    static URL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    URL_REGEX
        .get_or_init(|| match Regex::new(r"(?i-u)https?://|www\.") {
            Ok(regex) => Some(regex),
            Err(e) => {
                tracing::error!("链接匹配规则编译失败，改用逐段比较: {}", e);
                None
            }
        })
        .as_ref()
}

fn looks_like_url(text: &str) -> bool {
    match url_regex() {
        Some(regex) => regex.is_match(text),
        None => {
            let lower = text.to_ascii_lowercase();
            ["http://", "https://", "www."]
                .iter()
                .any(|marker| lower.contains(marker))
        }
    }
}

impl TextFilter {
    /// 创建新的文本过滤器
    pub fn new<I, S>(skip_texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            skip_texts: skip_texts.into_iter().map(Into::into).collect(),
        }
    }

    /// 判断文本是否需要跳过（不发送翻译）
    pub fn should_skip(&self, text: &str) -> bool {
        let trimmed = text.trim();

        if trimmed.is_empty() {
            return true;
        }

        if self.skip_texts.contains(trimmed) {
            return true;
        }

        // 不含任何字母
        if !trimmed.chars().any(|c| c.is_ascii_alphabetic()) {
            return true;
        }

        if looks_like_url(trimmed) {
            return true;
        }

        trimmed.contains('@')
    }
}

impl Default for TextFilter {
    fn default() -> Self {
        Self::new(constants::SKIP_TEXTS.iter().copied())
    }
}

/// 元素自身是否带有不翻译标记
pub fn is_opt_out_marker(element: &Handle) -> bool {
    has_node_attr(element, constants::NO_TRANSLATE_ATTR)
        || has_class(element, constants::NO_TRANSLATE_CLASS)
        || get_node_attr(element, "translate").as_deref() == Some("no")
}

/// 元素是否为可编辑区域
pub fn is_editable_region(element: &Handle) -> bool {
    get_node_attr(element, "contenteditable").as_deref() == Some("true")
}

/// 文本节点不翻译的标签
pub fn is_skipped_tag(tag_name: &str) -> bool {
    constants::SKIP_ELEMENTS.contains(&tag_name)
}

/// 节点或其祖先是否被标记为不翻译或可编辑
pub fn is_opted_out(node: &Handle) -> bool {
    closest(node, |el| is_opt_out_marker(el) || is_editable_region(el)).is_some()
}

/// 元素子树中的文本是否应整体跳过
pub fn excludes_subtree(element: &Handle) -> bool {
    is_opt_out_marker(element)
        || is_editable_region(element)
        || get_node_name(element).map(is_skipped_tag).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::Document;

    #[test]
    fn test_skip_rules() {
        let filter = TextFilter::default();

        assert!(filter.should_skip(""));
        assert!(filter.should_skip("   \n "));
        assert!(filter.should_skip("FarmMind"));
        assert!(filter.should_skip("  FARMMIND "));
        assert!(filter.should_skip("42"));
        assert!(filter.should_skip("12.5 %  —  ₹3,400"));
        assert!(filter.should_skip("farmer@farmmind.in"));
        assert!(filter.should_skip("See http://example.com"));
        assert!(filter.should_skip("HTTPS://Example.com"));
        assert!(filter.should_skip("www.farmmind.in"));
        assert!(filter.should_skip("Visit WWW.FARMMIND.IN today"));
        assert!(filter.should_skip("Prices at HtTp://mandi.example"));

        assert!(!filter.should_skip("Welcome"));
        assert!(!filter.should_skip("  Soil moisture: 42% "));
        assert!(!filter.should_skip("FarmMind dashboard"));
        assert!(!filter.should_skip("Browse the crop guide"));
    }

    #[test]
    fn test_url_rule_compiles() {
        assert!(url_regex().is_some());
        assert!(looks_like_url("WWW.FARMMIND.IN"));
        assert!(!looks_like_url("wwwx"));
    }

    #[test]
    fn test_non_ascii_only_text_is_skipped() {
        let filter = TextFilter::default();
        assert!(filter.should_skip("स्वागत है"));
    }

    #[test]
    fn test_custom_skip_list() {
        let filter = TextFilter::new(["Kisan"]);
        assert!(filter.should_skip("Kisan"));
        assert!(!filter.should_skip("FarmMind"));
    }

    #[test]
    fn test_opt_out_markers() {
        let doc = Document::parse(
            r#"<body>
                <div id="a" data-no-translate><span id="a1">x</span></div>
                <div id="b" class="card notranslate"></div>
                <div id="c" translate="no"></div>
                <div id="d" translate="yes"></div>
                <div id="e" contenteditable="true"><p id="e1">x</p></div>
                <pre id="f"></pre>
            </body>"#,
        )
        .unwrap();
        let el = |id: &str| doc.get_element_by_id(id).unwrap();

        assert!(is_opt_out_marker(&el("a")));
        assert!(is_opt_out_marker(&el("b")));
        assert!(is_opt_out_marker(&el("c")));
        assert!(!is_opt_out_marker(&el("d")));
        assert!(is_opted_out(&el("a1")));
        assert!(is_opted_out(&el("e1")));
        assert!(!is_opted_out(&el("d")));
        assert!(excludes_subtree(&el("f")));
        assert!(!excludes_subtree(&el("d")));
    }
}
