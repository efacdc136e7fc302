//! 翻译服务接口
//!
//! 翻译接口与语言列表接口的请求/响应边界。引擎只依赖 [`TranslationApi`] 特性，
//! 测试或嵌入方可以替换成自己的后端。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::translation::config::TranslatorConfig;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslateRequest<'a> {
    pub texts: &'a [String],
    pub source_lang: &'a str,
    pub target_lang: &'a str,
}

/// 语言列表接口返回的原始条目
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawLanguage {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// 翻译后端
#[async_trait(?Send)]
pub trait TranslationApi {
    /// 翻译一个批次，返回与输入等长、同序的译文
    async fn translate(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<Vec<String>>;

    /// 获取服务端支持的语言列表
    async fn fetch_languages(&self) -> TranslationResult<Vec<RawLanguage>>;
}

/// 基于 HTTP 的翻译后端
#[derive(Debug, Clone)]
pub struct HttpTranslationApi {
    client: reqwest::Client,
    translate_url: Url,
    languages_url: Url,
}

impl HttpTranslationApi {
    pub fn new(translate_url: Url, languages_url: Url) -> TranslationResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            translate_url,
            languages_url,
        })
    }

    /// 按配置中的服务地址创建
    pub fn from_config(config: &TranslatorConfig) -> TranslationResult<Self> {
        Self::new(config.translate_url()?, config.languages_url()?)
    }

    pub fn translate_url(&self) -> &Url {
        &self.translate_url
    }
}

#[async_trait(?Send)]
impl TranslationApi for HttpTranslationApi {
    async fn translate(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<Vec<String>> {
        let request = TranslateRequest {
            texts,
            source_lang,
            target_lang,
        };

        tracing::debug!(
            "POST {} ({} 条, {} -> {})",
            self.translate_url,
            texts.len(),
            source_lang,
            target_lang
        );

        let response = self
            .client
            .post(self.translate_url.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        // 响应体不是 JSON 时按空对象处理
        let data: Value = serde_json::from_str(&body).unwrap_or(Value::Null);

        parse_translate_response(status.as_u16(), &data, texts.len())
    }

    async fn fetch_languages(&self) -> TranslationResult<Vec<RawLanguage>> {
        let response = self.client.get(self.languages_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::ServiceError {
                status: status.as_u16(),
                message: "Language list failed".to_string(),
            });
        }

        let data: Value = response.json().await?;
        Ok(parse_languages_response(&data))
    }
}

/// 解析翻译接口的响应
///
/// 非 2xx 时取响应中的 `error` 字段作为消息；`translations` 缺失、不是数组
/// 或长度与请求不一致时视为无效响应。
pub fn parse_translate_response(
    status: u16,
    data: &Value,
    expected_len: usize,
) -> TranslationResult<Vec<String>> {
    if !(200..300).contains(&status) {
        let message = data
            .get("error")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .unwrap_or("Translation failed")
            .to_string();
        return Err(TranslationError::ServiceError { status, message });
    }

    let translations = data
        .get("translations")
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::InvalidResponse("Invalid translation response".to_string()))?;

    if translations.len() != expected_len {
        return Err(TranslationError::InvalidResponse(format!(
            "Invalid translation response: expected {} translations, got {}",
            expected_len,
            translations.len()
        )));
    }

    Ok(translations
        .iter()
        .map(|value| match value {
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect())
}

/// 解析语言列表响应，接受 `{languages: [...]}` 或裸数组，其余形状按空列表处理
pub fn parse_languages_response(data: &Value) -> Vec<RawLanguage> {
    let list = match data {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("languages") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    list.iter()
        .filter_map(|item| serde_json::from_value::<RawLanguage>(item.clone()).ok())
        .collect()
}
