//! 翻译引擎核心实现
//!
//! 引擎是一个显式的上下文对象，每个文档一个实例，持有当前语言、进行中标记、
//! 译文缓存与原始值表。所有方法都只需要 `&self`，以便监听循环与用户操作在同一
//! 线程上交替推进。
//!
//! ## 状态
//! - `Original`：页面显示原文（当前语言为默认语言）
//! - `Translated(code)`：页面显示 `code` 的译文
//!
//! ## 工作流程
//! 1. 收集当前文档的全部可翻译单元
//! 2. 去重后查询缓存，缺失部分按批次顺序请求翻译接口
//! 3. 任一批次失败即中止，已成功的批次保留在缓存中
//! 4. 写入译文（缓存缺失或为空时显示原文），持久化语言并更新页面指示
//!
//! 同一时刻只允许一个应用操作进行，期间的应用或还原请求直接返回 [`ApplyOutcome::Busy`]。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::network::api::TranslationApi;
use crate::parsers::html::{set_node_attr, Document};
use crate::translation::config::{constants, TranslatorConfig};
use crate::translation::core::watcher::MutationWatcher;
use crate::translation::error::{helpers::log_error, TranslationError, TranslationResult};
use crate::translation::languages::{LanguageDescriptor, LanguageRegistry};
use crate::translation::pipeline::{
    unique_keys, BatchPlanner, OriginalValueStore, TextCollector, TextFilter, TranslatableItem,
};
use crate::translation::storage::{CacheStats, LanguageStore, TranslationCache};
use crate::translation::widget::{is_lang_switch_target, StatusKind, Widget, WidgetEvent};

/// 应用选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// 静默操作不修改状态栏
    pub silent: bool,
}

impl ApplyOptions {
    pub fn silent() -> Self {
        Self { silent: true }
    }
}

/// 一次应用/还原的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Translated {
        language: String,
        /// 写入的单元数
        items: usize,
        /// 本次向接口请求的文本数
        fetched: usize,
        batches: usize,
    },
    Restored {
        items: usize,
    },
    /// 已有操作在进行，本次请求被忽略
    Busy,
}

/// 翻译引擎
pub struct TranslationEngine {
    document: Document,
    api: Rc<dyn TranslationApi>,
    store: Box<dyn LanguageStore>,
    config: TranslatorConfig,
    filter: TextFilter,
    planner: BatchPlanner,
    registry: RefCell<LanguageRegistry>,
    cache: RefCell<TranslationCache>,
    originals: RefCell<OriginalValueStore>,
    current: RefCell<String>,
    translating: Cell<bool>,
    widget: RefCell<Option<Widget>>,
    observing: Cell<bool>,
}

/// 在作用域内保持进行中状态，离开时（成功、失败或提前返回）自动清除
struct BusyGuard<'a> {
    engine: &'a TranslationEngine,
}

impl<'a> BusyGuard<'a> {
    fn engage(engine: &'a TranslationEngine) -> Self {
        engine.set_busy(true);
        Self { engine }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.engine.set_busy(false);
    }
}

impl TranslationEngine {
    /// 创建新的翻译引擎
    ///
    /// 创建时不会修改文档；挂件、语言列表与监听都在 [`init`](Self::init) 中完成。
    pub fn new(
        document: Document,
        api: Rc<dyn TranslationApi>,
        store: Box<dyn LanguageStore>,
        config: TranslatorConfig,
    ) -> Self {
        Self {
            filter: TextFilter::new(config.skip_texts.iter().cloned()),
            planner: BatchPlanner::new(config.batch_size),
            current: RefCell::new(config.default_lang.clone()),
            document,
            api,
            store,
            config,
            registry: RefCell::new(LanguageRegistry::builtin()),
            cache: RefCell::new(TranslationCache::new()),
            originals: RefCell::new(OriginalValueStore::new()),
            translating: Cell::new(false),
            widget: RefCell::new(None),
            observing: Cell::new(false),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn current_language(&self) -> String {
        self.current.borrow().clone()
    }

    pub fn is_translating(&self) -> bool {
        self.translating.get()
    }

    pub fn languages(&self) -> Vec<LanguageDescriptor> {
        self.registry.borrow().all().to_vec()
    }

    pub fn widget(&self) -> Option<Widget> {
        self.widget.borrow().clone()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.borrow().get_stats().clone()
    }

    /// 某语言已缓存的译文条数
    pub fn cached_entries(&self, lang: &str) -> usize {
        self.cache.borrow().len_for(lang)
    }

    /// 初始化
    ///
    /// 依次读取保存的语言、构建挂件、标记语言切换按钮、刷新语言列表、渲染选项，
    /// 然后开始监听结构变化；保存的语言不是默认语言时静默应用一次。
    /// 返回的监听器交给 [`watch`](Self::watch) 驱动，重复初始化时返回 `None`。
    pub async fn init(&self) -> TranslationResult<Option<MutationWatcher>> {
        let default_lang = self.config.default_lang.clone();

        if let Some(saved) = self.store.load(&self.config.storage_key) {
            if self.registry.borrow().contains(&saved) {
                *self.current.borrow_mut() = saved;
            }
        }

        if self.config.build_widget {
            let label = self.registry.borrow().resolve(&default_lang).label.clone();
            // 页面上已有挂件时保留现有句柄
            if let Some(widget) = Widget::build(&self.document, &label)? {
                *self.widget.borrow_mut() = Some(widget);
            }
        }

        self.update_lang_buttons();
        self.load_languages().await;
        self.render_language_options();
        self.update_lang_buttons();

        let current = self.current_language();
        self.set_html_lang(&current);

        let watcher = self.start_observer();

        if current != default_lang {
            if let Err(e) = self.apply_language(&current, ApplyOptions::silent()).await {
                tracing::warn!("恢复上次语言 {} 失败: {}", current, e);
            }
        }

        tracing::info!("翻译引擎初始化完成，当前语言: {}", self.current_language());
        Ok(watcher)
    }

    /// 开始监听 body 下的结构变化，已在监听时返回 `None`
    pub fn start_observer(&self) -> Option<MutationWatcher> {
        if self.observing.replace(true) {
            return None;
        }
        Some(MutationWatcher::new(
            self.document.observe(),
            self.config.debounce(),
        ))
    }

    /// 停止监听，正在运行的 [`watch`](Self::watch) 循环随之结束
    pub fn stop_observer(&self) {
        self.document.disconnect();
        self.observing.set(false);
    }

    /// 切换到指定语言
    ///
    /// 未知代码按注册表首个语言处理；目标为默认语言时等同于还原。
    /// 失败时已写入的单元不回滚，错误消息显示在状态栏（静默操作除外）。
    pub async fn apply_language(
        &self,
        code: &str,
        options: ApplyOptions,
    ) -> TranslationResult<ApplyOutcome> {
        let lang = self.registry.borrow().resolve(code).clone();
        if lang.code == self.config.default_lang {
            return Ok(self.restore_with(options));
        }
        if self.translating.get() {
            tracing::debug!("翻译进行中，忽略切换到 {} 的请求", lang.code);
            return Ok(ApplyOutcome::Busy);
        }

        let _guard = BusyGuard::engage(self);
        if !options.silent {
            self.set_status("Translating...", StatusKind::None);
        }

        match self.translate_into(&lang).await {
            Ok(outcome) => {
                self.commit_language(&lang.code);
                if !options.silent {
                    self.set_status("Translated.", StatusKind::Success);
                }
                tracing::info!("已应用语言 {}: {:?}", lang.code, outcome);
                Ok(outcome)
            }
            Err(e) => {
                log_error(&e);
                if !options.silent {
                    self.set_status(&e.user_message(), StatusKind::Error);
                }
                Err(e)
            }
        }
    }

    /// 将页面还原为原文
    pub fn restore_original(&self) -> ApplyOutcome {
        self.restore_with(ApplyOptions::default())
    }

    /// 处理挂件与页面事件
    ///
    /// 应用与还原按钮返回对应操作的结果，其余事件返回 `None`。
    pub async fn handle_event(&self, event: WidgetEvent) -> TranslationResult<Option<ApplyOutcome>> {
        match event {
            WidgetEvent::FabClicked | WidgetEvent::LangSwitchClicked => {
                self.with_widget(|widget| {
                    widget.toggle();
                });
                Ok(None)
            }
            WidgetEvent::ApplyClicked => {
                let code = self
                    .widget
                    .borrow()
                    .as_ref()
                    .and_then(Widget::selected_language)
                    .unwrap_or_else(|| self.config.default_lang.clone());
                self.apply_language(&code, ApplyOptions::default())
                    .await
                    .map(Some)
            }
            WidgetEvent::ResetClicked => Ok(Some(self.restore_original())),
            WidgetEvent::SelectChanged(code) => {
                self.with_widget(|widget| {
                    widget.select(&code);
                });
                Ok(None)
            }
            WidgetEvent::DocumentClicked(target) => {
                self.with_widget(|widget| {
                    if !widget.contains(&target) && !is_lang_switch_target(&target) {
                        widget.set_open(false);
                    }
                });
                Ok(None)
            }
            WidgetEvent::KeyDown(key) => {
                if key == "Escape" {
                    self.with_widget(|widget| widget.set_open(false));
                }
                Ok(None)
            }
        }
    }

    /// 监听循环
    ///
    /// 当前语言不是默认语言时，结构变化触发一次去抖后的静默重新应用；
    /// 计时结束时若仍有操作进行，则重新计时。通道关闭后返回。
    pub async fn watch(&self, mut watcher: MutationWatcher) {
        while watcher.next_record().await.is_some() {
            if self.is_default_language() {
                continue;
            }

            loop {
                if !watcher.settle().await {
                    return;
                }
                if !self.translating.get() {
                    break;
                }
                tracing::debug!("翻译进行中，推迟重新应用");
            }

            if self.is_default_language() {
                continue;
            }

            let lang = self.current_language();
            tracing::debug!("文档结构变化，重新应用语言 {}", lang);
            if let Err(e) = self.apply_language(&lang, ApplyOptions::silent()).await {
                tracing::warn!("重新应用语言 {} 失败: {}", lang, e);
            }
        }
        tracing::debug!("结构变化通道已关闭，监听结束");
    }

    async fn translate_into(&self, lang: &LanguageDescriptor) -> TranslationResult<ApplyOutcome> {
        let items = self.collect_items();
        let keys = unique_keys(&items);
        let missing = self.cache.borrow_mut().missing(&lang.code, &keys);
        let batches = self.planner.plan(&missing);

        tracing::debug!(
            "语言 {}: {} 个单元, {} 个唯一文本, {} 个待请求, {} 个批次",
            lang.code,
            items.len(),
            keys.len(),
            missing.len(),
            batches.len()
        );

        for (index, batch) in batches.iter().enumerate() {
            let translations = self
                .api
                .translate(batch, &self.config.default_lang, &lang.code)
                .await?;
            if translations.len() != batch.len() {
                return Err(TranslationError::InvalidResponse(format!(
                    "Invalid translation response: expected {} translations, got {}",
                    batch.len(),
                    translations.len()
                )));
            }
            self.cache
                .borrow_mut()
                .store_batch(&lang.code, batch, translations);
            tracing::debug!("批次 {}/{} 完成", index + 1, batches.len());
        }

        let cache = self.cache.borrow();
        for item in &items {
            item.apply(cache.get(&lang.code, &item.key).unwrap_or(item.key.as_str()));
        }

        Ok(ApplyOutcome::Translated {
            language: lang.code.clone(),
            items: items.len(),
            fetched: missing.len(),
            batches: batches.len(),
        })
    }

    fn restore_with(&self, options: ApplyOptions) -> ApplyOutcome {
        if self.translating.get() {
            tracing::debug!("翻译进行中，忽略还原请求");
            return ApplyOutcome::Busy;
        }

        let items = self.collect_items();
        for item in &items {
            item.restore();
        }

        let default_lang = self.config.default_lang.clone();
        self.commit_language(&default_lang);
        if !options.silent {
            let label = self.registry.borrow().resolve(&default_lang).label.clone();
            self.set_status(&format!("{} restored.", label), StatusKind::Success);
        }

        tracing::info!("已还原 {} 个单元", items.len());
        ApplyOutcome::Restored { items: items.len() }
    }

    fn collect_items(&self) -> Vec<TranslatableItem> {
        let mut originals = self.originals.borrow_mut();
        TextCollector::new(&self.filter).collect(&self.document, &mut originals)
    }

    /// 记录当前语言并同步到偏好存储与页面
    fn commit_language(&self, code: &str) {
        *self.current.borrow_mut() = code.to_string();

        if let Err(e) = self.store.save(&self.config.storage_key, code) {
            tracing::warn!("保存语言偏好失败: {}", e);
        }

        self.set_html_lang(code);
        self.update_lang_buttons();
        self.with_widget(|widget| {
            widget.select(code);
        });
    }

    async fn load_languages(&self) {
        match self.api.fetch_languages().await {
            Ok(raw) => {
                let updated = self
                    .registry
                    .borrow_mut()
                    .apply_fetched(&raw, &self.config.default_lang);
                if updated {
                    tracing::debug!("已加载 {} 种语言", self.registry.borrow().len());
                } else {
                    tracing::debug!("语言列表为空，保留内置列表");
                }
            }
            Err(e) => tracing::debug!("语言列表加载失败，保留内置列表: {}", e),
        }
    }

    fn render_language_options(&self) {
        let registry = self.registry.borrow();
        if !registry.contains(&self.current_language()) {
            *self.current.borrow_mut() = self.config.default_lang.clone();
        }
        let current = self.current_language();
        self.with_widget(|widget| widget.render_options(&self.document, registry.all(), &current));
    }

    /// `.lang-switch` 元素显示当前语言缩写
    fn update_lang_buttons(&self) {
        let short = self
            .registry
            .borrow()
            .resolve(&self.current_language())
            .short
            .clone();

        for button in self.document.elements_by_class(constants::LANG_SWITCH_CLASS) {
            set_node_attr(&button, constants::NO_TRANSLATE_ATTR, Some("true"));
            set_node_attr(&button, "type", Some("button"));
            self.document.set_text_content(&button, &short);
        }
    }

    fn set_html_lang(&self, code: &str) {
        if let Some(html) = self.document.html_element() {
            set_node_attr(&html, "lang", Some(code));
        }
    }

    fn set_busy(&self, busy: bool) {
        self.translating.set(busy);
        self.with_widget(|widget| widget.set_busy(busy));
    }

    fn set_status(&self, text: &str, kind: StatusKind) {
        self.with_widget(|widget| widget.set_status(&self.document, text, kind));
    }

    fn is_default_language(&self) -> bool {
        *self.current.borrow() == self.config.default_lang
    }

    fn with_widget<F: FnOnce(&Widget)>(&self, f: F) {
        if let Some(widget) = self.widget.borrow().as_ref() {
            f(widget);
        }
    }
}
