//! 语言注册表
//!
//! 内置 `[en, hi]`，初始化时用语言列表接口的结果刷新。默认语言始终存在且位于首位。

use crate::network::api::RawLanguage;

/// 语言描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageDescriptor {
    pub code: String,
    /// 显示用缩写
    pub short: String,
    pub label: String,
}

impl LanguageDescriptor {
    pub fn new(code: &str, short: &str, label: &str) -> Self {
        Self {
            code: code.to_string(),
            short: short.to_string(),
            label: label.to_string(),
        }
    }
}

/// 有序的语言列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRegistry {
    languages: Vec<LanguageDescriptor>,
}

impl LanguageRegistry {
    /// 内置语言列表
    pub fn builtin() -> Self {
        Self {
            languages: vec![
                LanguageDescriptor::new("en", "EN", "English"),
                LanguageDescriptor::new("hi", "HI", "Hindi"),
            ],
        }
    }

    /// 规范化接口返回的原始条目
    ///
    /// 丢弃缺少 `code` 或名称的条目，缩写取代码的大写形式；
    /// 结果中没有默认语言时插入到首位。
    pub fn normalize(raw: &[RawLanguage], default_code: &str) -> Vec<LanguageDescriptor> {
        let mut languages = valid_entries(raw);
        if !languages.iter().any(|lang| lang.code == default_code) {
            languages.insert(0, default_descriptor(default_code));
        }
        languages
    }

    /// 用接口数据替换列表
    ///
    /// 没有任何有效条目时保留现有列表，避免只剩默认语言。
    pub fn apply_fetched(&mut self, raw: &[RawLanguage], default_code: &str) -> bool {
        if valid_entries(raw).is_empty() {
            return false;
        }
        self.languages = Self::normalize(raw, default_code);
        true
    }

    /// 按代码查找语言，未知代码回退到首个（默认）语言
    pub fn resolve(&self, code: &str) -> &LanguageDescriptor {
        self.languages
            .iter()
            .find(|lang| lang.code == code)
            .unwrap_or(&self.languages[0])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.languages.iter().any(|lang| lang.code == code)
    }

    pub fn all(&self) -> &[LanguageDescriptor] {
        &self.languages
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn valid_entries(raw: &[RawLanguage]) -> Vec<LanguageDescriptor> {
    raw.iter()
        .filter_map(|item| {
            let code = item.code.as_deref().filter(|c| !c.is_empty())?;
            let label = item
                .name
                .as_deref()
                .filter(|n| !n.is_empty())
                .or_else(|| item.label.as_deref().filter(|l| !l.is_empty()))?;
            Some(LanguageDescriptor::new(code, &code.to_uppercase(), label))
        })
        .collect()
}

fn default_descriptor(code: &str) -> LanguageDescriptor {
    match code {
        "en" => LanguageDescriptor::new("en", "EN", "English"),
        other => LanguageDescriptor::new(other, &other.to_uppercase(), &other.to_uppercase()),
    }
}
