//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslatorConfig};

/// 配置常量
pub mod constants {
    // 语言与存储
    pub const DEFAULT_LANG: &str = "en";
    pub const STORAGE_KEY: &str = "fm_translate_lang";

    // 默认API设置
    pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
    pub const TRANSLATE_PATH: &str = "/api/translate";
    pub const LANGUAGES_PATH: &str = "/api/translate/languages";

    // 批次与去抖
    pub const DEFAULT_BATCH_SIZE: usize = 30;
    pub const DEFAULT_DEBOUNCE_MS: u64 = 350;

    // 不翻译的品牌词
    pub const SKIP_TEXTS: &[&str] = &["FarmMind", "FARMMIND"];

    // 文本节点不翻译的父元素
    pub const SKIP_ELEMENTS: &[&str] = &[
        "script", "style", "noscript", "code", "pre", "svg", "math", "textarea", "input",
    ];

    // 可翻译属性
    pub const TRANSLATABLE_ATTRS: &[&str] = &["placeholder", "title", "aria-label"];

    // 按钮类 input 只翻译 value
    pub const BUTTON_INPUT_TYPES: &[&str] = &["button", "submit", "reset"];

    // 页面作者可用的退出标记
    pub const NO_TRANSLATE_ATTR: &str = "data-no-translate";
    pub const NO_TRANSLATE_CLASS: &str = "notranslate";

    // 挂件
    pub const WIDGET_ID: &str = "fmTranslateWidget";
    pub const LANG_SWITCH_CLASS: &str = "lang-switch";

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "farmmind-translate.toml",
        ".farmmind-translate.toml",
        "~/.config/farmmind/translate.toml",
    ];

    pub const DEFAULT_STATE_FILE: &str = "~/.config/farmmind/state.json";
}

/// 加载配置，失败时退回默认值
pub fn load_translator_config() -> TranslatorConfig {
    match ConfigManager::new() {
        Ok(manager) => manager.into_config(),
        Err(e) => {
            tracing::warn!("配置加载失败，使用默认配置: {}", e);
            TranslatorConfig::default()
        }
    }
}
