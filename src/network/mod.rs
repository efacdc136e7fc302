//! # 网络模块
//!
//! 与翻译服务通信：
//!
//! - `api` - 翻译接口与语言列表接口，以及可替换的后端特性

pub mod api;

pub use api::{HttpTranslationApi, RawLanguage, TranslateRequest, TranslationApi};
