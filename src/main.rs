//! 命令行入口
//!
//! 读取一个 HTML 页面，初始化翻译引擎并切换到目标语言，输出处理后的页面。

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;
use std::rc::Rc;

use clap::Parser;
use encoding_rs::Encoding;
use tracing::Level;

use farmmind_translate::env::{self, EnvVar};
use farmmind_translate::network::{HttpTranslationApi, TranslationApi};
use farmmind_translate::parsers::Document;
use farmmind_translate::translation::config::{load_translator_config, ConfigManager};
use farmmind_translate::translation::{
    ApplyOptions, ApplyOutcome, FileStore, LanguageRegistry, TranslationEngine, TranslationError,
    TranslationResult, TranslatorConfig,
};

#[derive(Parser, Debug)]
#[command(name = "farmmind-translate", version, about = "Translate an HTML page through the FarmMind translation service", long_about = None)]
struct Cli {
    /// Input HTML file, `-` reads from stdin
    #[arg(default_value = "-")]
    input: String,

    /// Target language code; the default language restores the original text
    #[arg(short, long)]
    lang: Option<String>,

    /// Write the result to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the translation service
    #[arg(long)]
    api_base: Option<String>,

    /// File storing the last applied language
    #[arg(long)]
    state_file: Option<String>,

    /// Maximum number of texts per translation request
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=500))]
    batch_size: Option<u16>,

    /// Inject the floating translate widget into the page
    #[arg(long)]
    widget: bool,

    /// Charset of the input document; output is always UTF-8
    #[arg(short = 'E', long, default_value = "utf-8")]
    encoding: String,

    /// Print the languages offered by the service and exit
    #[arg(long)]
    list_languages: bool,

    /// Log level: trace, debug, info, warn, error
    #[arg(long)]
    log_level: Option<String>,

    /// Print the supported environment variables and exit
    #[arg(long)]
    print_env_docs: bool,

    /// Write an example configuration file and exit
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            process::exit(1);
        }
    };

    let code = match runtime.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };
    process::exit(code);
}

/// 日志输出到 stderr，命令行参数优先于环境变量
fn init_logging(cli_level: Option<&str>) {
    let level = cli_level
        .map(str::to_string)
        .or_else(|| env::core::LogLevel::get().ok())
        .and_then(|level| level.parse::<Level>().ok())
        .unwrap_or(Level::WARN);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> TranslationResult<i32> {
    if cli.print_env_docs {
        print!("{}", env::generate_env_docs());
        return Ok(0);
    }

    if let Some(path) = &cli.write_config {
        ConfigManager::generate_example_config(path)?;
        eprintln!("Example configuration written to {}", path.display());
        return Ok(0);
    }

    if Encoding::for_label_no_replacement(cli.encoding.as_bytes()).is_none() {
        return Err(TranslationError::ConfigError(format!(
            "unknown encoding '{}'",
            cli.encoding
        )));
    }

    let config = build_config(&cli)?;
    let api = Rc::new(HttpTranslationApi::from_config(&config)?);

    if cli.list_languages {
        let mut registry = LanguageRegistry::builtin();
        match api.fetch_languages().await {
            Ok(raw) => {
                registry.apply_fetched(&raw, &config.default_lang);
            }
            Err(e) => tracing::warn!("Language list unavailable, showing built-in list: {}", e),
        }
        for lang in registry.all() {
            println!("{}\t{}\t{}", lang.code, lang.short, lang.label);
        }
        return Ok(0);
    }

    let input = read_input(&cli.input)?;
    let document = Document::from_bytes(&input, &cli.encoding)?;
    // 输出统一为 UTF-8，页面自带的声明随之改写
    if document.set_charset("utf-8") {
        tracing::debug!("字符集声明已改写为 utf-8");
    }
    let store = FileStore::new(config.state_file_path());
    let engine = TranslationEngine::new(document, api, Box::new(store), config);

    // 命令行只做一次性处理，不需要监听后续变化
    let _ = engine.init().await?;
    engine.stop_observer();

    let target = cli
        .lang
        .clone()
        .or_else(|| env::translation::TargetLang::get().ok());

    let mut code = 0;
    if let Some(target) = target {
        match engine.apply_language(&target, ApplyOptions::default()).await {
            Ok(ApplyOutcome::Translated {
                language,
                items,
                fetched,
                batches,
            }) => tracing::info!(
                "Translated {} items into {} ({} fetched in {} batches)",
                items,
                language,
                fetched,
                batches
            ),
            Ok(ApplyOutcome::Restored { items }) => {
                tracing::info!("Restored {} items", items)
            }
            Ok(ApplyOutcome::Busy) => {}
            Err(e) => {
                eprintln!("Error: {}", e.user_message());
                code = 1;
            }
        }
    }

    write_output(cli.output.as_ref(), &engine.document().to_html()?)?;
    Ok(code)
}

fn build_config(cli: &Cli) -> TranslationResult<TranslatorConfig> {
    let mut config = match &cli.config {
        Some(path) => ConfigManager::from_file(path)?.into_config(),
        None => load_translator_config(),
    };

    if let Some(base) = &cli.api_base {
        config.api_base_url = base.clone();
    }
    if let Some(state_file) = &cli.state_file {
        config.state_file = state_file.clone();
    }
    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size as usize;
    }
    config.build_widget = cli.widget;

    config.validate()?;
    Ok(config)
}

fn read_input(input: &str) -> TranslationResult<Vec<u8>> {
    if input == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(input).map_err(|e| TranslationError::IoError(format!("{}: {}", input, e)))
    }
}

fn write_output(path: Option<&PathBuf>, html: &str) -> TranslationResult<()> {
    match path {
        Some(path) => fs::write(path, html)
            .map_err(|e| TranslationError::IoError(format!("{}: {}", path.display(), e))),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}
