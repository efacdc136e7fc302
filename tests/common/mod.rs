// 集成测试公共模块
//
// 提供可控的翻译后端与测试页面

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;

use farmmind_translate::network::{RawLanguage, TranslationApi};
use farmmind_translate::parsers::Document;
use farmmind_translate::translation::{
    LanguageStore, MemoryStore, TranslationEngine, TranslationError, TranslationResult,
    TranslatorConfig,
};

/// 一次翻译请求的记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub texts: Vec<String>,
    pub source_lang: String,
    pub target_lang: String,
}

/// 可控的翻译后端
///
/// 词典中没有的文本翻译为 `[目标语言] 原文`。
pub struct MockApi {
    dictionary: HashMap<String, String>,
    calls: RefCell<Vec<RecordedCall>>,
    fail_on_call: Cell<Option<usize>>,
    delay: Cell<Duration>,
    languages: RefCell<Option<Vec<RawLanguage>>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            dictionary: HashMap::new(),
            calls: RefCell::new(Vec::new()),
            fail_on_call: Cell::new(None),
            delay: Cell::new(Duration::ZERO),
            languages: RefCell::new(None),
        }
    }

    pub fn with_translation(mut self, source: &str, translated: &str) -> Self {
        self.dictionary
            .insert(source.to_string(), translated.to_string());
        self
    }

    /// 第 `n` 次请求（从 1 开始）返回服务端错误
    pub fn fail_on_call(&self, n: Option<usize>) {
        self.fail_on_call.set(n);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay.set(delay);
    }

    pub fn set_languages(&self, languages: Vec<(&str, &str)>) {
        *self.languages.borrow_mut() = Some(
            languages
                .into_iter()
                .map(|(code, name)| RawLanguage {
                    code: Some(code.to_string()),
                    name: Some(name.to_string()),
                    label: None,
                })
                .collect(),
        );
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }
}

#[async_trait(?Send)]
impl TranslationApi for MockApi {
    async fn translate(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<Vec<String>> {
        let call_number = {
            let mut calls = self.calls.borrow_mut();
            calls.push(RecordedCall {
                texts: texts.to_vec(),
                source_lang: source_lang.to_string(),
                target_lang: target_lang.to_string(),
            });
            calls.len()
        };

        let delay = self.delay.get();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.fail_on_call.get() == Some(call_number) {
            return Err(TranslationError::ServiceError {
                status: 500,
                message: "Quota exceeded".to_string(),
            });
        }

        Ok(texts
            .iter()
            .map(|text| {
                self.dictionary
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| format!("[{}] {}", target_lang, text))
            })
            .collect())
    }

    async fn fetch_languages(&self) -> TranslationResult<Vec<RawLanguage>> {
        self.languages
            .borrow()
            .clone()
            .ok_or_else(|| TranslationError::NetworkError("connection refused".to_string()))
    }
}

/// 不注入挂件的配置
pub fn headless_config() -> TranslatorConfig {
    TranslatorConfig {
        build_widget: false,
        ..TranslatorConfig::default()
    }
}

pub fn widget_config() -> TranslatorConfig {
    TranslatorConfig::default()
}

pub fn engine_with(
    html: &str,
    api: &Rc<MockApi>,
    store: Box<dyn LanguageStore>,
    config: TranslatorConfig,
) -> TranslationEngine {
    TranslationEngine::new(Document::parse(html).unwrap(), api.clone(), store, config)
}

pub fn headless_engine(html: &str, api: &Rc<MockApi>) -> TranslationEngine {
    engine_with(html, api, Box::new(MemoryStore::new()), headless_config())
}

/// 测试页面
pub struct Pages;

impl Pages {
    /// 欢迎标题、品牌名与搜索框
    pub fn welcome() -> &'static str {
        "<!DOCTYPE html><html><head><title>FarmMind</title></head><body>\n\
         <h1>  Welcome  </h1>\n\
         <span class=\"brand\">FarmMind</span>\n\
         <input placeholder=\"Search crops\">\n\
         </body></html>"
    }

    /// 带动态区域的页面
    pub fn feed() -> &'static str {
        "<html><body><h1>Market prices</h1><div id=\"feed\"></div></body></html>"
    }

    /// `count` 个互不相同的段落
    pub fn many_paragraphs(count: usize) -> String {
        let paragraphs: String = (0..count)
            .map(|i| format!("<p>Field report {}</p>", i))
            .collect();
        format!("<html><body>{}</body></html>", paragraphs)
    }
}

pub fn translated_dictionary() -> MockApi {
    MockApi::new()
        .with_translation("Welcome", "स्वागत है")
        .with_translation("Search crops", "फसलें खोजें")
}
