//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::constants;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译引擎配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslatorConfig {
    // 接口配置
    pub api_base_url: String,
    pub translate_path: String,
    pub languages_path: String,

    // 语言与持久化
    pub default_lang: String,
    pub storage_key: String,
    pub state_file: String,

    // 批次与去抖
    pub batch_size: usize,
    pub debounce_ms: u64,

    // 过滤
    pub skip_texts: Vec<String>,

    // 是否向页面注入翻译挂件
    pub build_widget: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_base_url: constants::DEFAULT_API_BASE_URL.to_string(),
            translate_path: constants::TRANSLATE_PATH.to_string(),
            languages_path: constants::LANGUAGES_PATH.to_string(),

            default_lang: constants::DEFAULT_LANG.to_string(),
            storage_key: constants::STORAGE_KEY.to_string(),
            state_file: constants::DEFAULT_STATE_FILE.to_string(),

            batch_size: constants::DEFAULT_BATCH_SIZE,
            debounce_ms: constants::DEFAULT_DEBOUNCE_MS,

            skip_texts: constants::SKIP_TEXTS.iter().map(|s| s.to_string()).collect(),

            build_widget: true,
        }
    }
}

impl TranslatorConfig {
    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.batch_size == 0 {
            return Err(TranslationError::ConfigError("批次大小不能为0".to_string()));
        }

        if self.default_lang.trim().is_empty() {
            return Err(TranslationError::ConfigError("默认语言不能为空".to_string()));
        }

        if self.storage_key.is_empty() {
            return Err(TranslationError::ConfigError("存储键不能为空".to_string()));
        }

        Url::parse(&self.api_base_url)?;
        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{translation, EnvVar};

        if let Ok(base) = translation::ApiBaseUrl::get() {
            tracing::info!("环境变量覆盖 API 地址: {}", base);
            self.api_base_url = base;
        }

        if let Ok(batch_size) = translation::BatchSize::get() {
            self.batch_size = batch_size;
        }

        if let Ok(debounce) = translation::Debounce::get() {
            self.debounce_ms = debounce.as_millis() as u64;
        }

        if let Ok(state_file) = translation::StateFile::get() {
            self.state_file = state_file;
        }
    }

    /// 翻译接口完整地址
    pub fn translate_url(&self) -> TranslationResult<Url> {
        Ok(Url::parse(&self.api_base_url)?.join(&self.translate_path)?)
    }

    /// 语言列表接口完整地址
    pub fn languages_url(&self) -> TranslationResult<Url> {
        Ok(Url::parse(&self.api_base_url)?.join(&self.languages_path)?)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// 展开 `~` 后的偏好文件路径
    pub fn state_file_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.state_file).as_ref())
    }
}

/// 简化的配置管理器
pub struct ConfigManager {
    config: TranslatorConfig,
}

impl ConfigManager {
    /// 按搜索路径加载配置并应用环境变量覆盖
    pub fn new() -> TranslationResult<Self> {
        let mut config = Self::load_config()?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 从指定文件加载配置并应用环境变量覆盖
    pub fn from_file<P: AsRef<Path>>(path: P) -> TranslationResult<Self> {
        Self::load_dotenv();
        let mut config = Self::load_from_file(path.as_ref())?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn into_config(self) -> TranslatorConfig {
        self.config
    }

    /// 从搜索路径加载配置
    fn load_config() -> TranslationResult<TranslatorConfig> {
        // 首先尝试加载 .env 文件
        Self::load_dotenv();

        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            let candidate = Path::new(expanded_path.as_ref());
            if candidate.exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(candidate);
            }
        }

        tracing::debug!("未找到配置文件，使用默认配置");
        Ok(TranslatorConfig::default())
    }

    /// 从指定文件加载配置
    fn load_from_file(path: &Path) -> TranslationResult<TranslatorConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TranslationError::ConfigError(format!("读取配置文件失败: {}", e)))?;

        let is_toml = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        if is_toml {
            toml::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析TOML配置失败: {}", e)))
        } else {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::debug!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> TranslationResult<()> {
        let config = TranslatorConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}
