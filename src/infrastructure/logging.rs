//! 日志系统配置模块
//! 支持结构化日志、日志级别配置和按天轮转的文件日志
//!
//! 控制台日志写到 stderr，stdout 留给命令行输出的导入结果。

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::config::LoggingConfig;

const DEFAULT_LOG_DIR: &str = "./logs";
const DEFAULT_LOG_FILE: &str = "ironcore-derivations.log";

/// 初始化日志系统
///
/// 启用文件日志时返回写入线程的 guard，调用方需持有到进程退出。
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    // 设置日志级别过滤器
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.format == "json" {
        init_json_logging(filter, config)
    } else {
        init_text_logging(filter, config)
    }
}

/// 日志目录和文件名
fn log_file_location(config: &LoggingConfig) -> (&Path, &str) {
    let path = config.log_file_path.as_deref().map(Path::new);

    let dir = path
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new(DEFAULT_LOG_DIR));
    let file = path
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_LOG_FILE);

    (dir, file)
}

fn file_writer(config: &LoggingConfig) -> Result<(non_blocking::NonBlocking, WorkerGuard)> {
    let (log_dir, file_name) = log_file_location(config);
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = rolling::daily(log_dir, file_name);
    Ok(non_blocking(file_appender))
}

/// 初始化JSON格式日志（结构化日志）
fn init_json_logging(filter: EnvFilter, config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    if config.enable_file_logging {
        let (writer, guard) = file_writer(config)?;
        let file_layer = fmt::layer()
            .json()
            .with_writer(writer)
            .with_timer(ChronoUtc::rfc_3339());

        Registry::default()
            .with(filter)
            .with(file_layer)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_timer(ChronoUtc::rfc_3339()),
            )
            .try_init()
            .context("Failed to install tracing subscriber")?;
        Ok(Some(guard))
    } else {
        Registry::default()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_timer(ChronoUtc::rfc_3339()),
            )
            .try_init()
            .context("Failed to install tracing subscriber")?;
        Ok(None)
    }
}

/// 初始化文本格式日志
fn init_text_logging(filter: EnvFilter, config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    if config.enable_file_logging {
        let (writer, guard) = file_writer(config)?;
        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false);

        Registry::default()
            .with(filter)
            .with(file_layer)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(true),
            )
            .try_init()
            .context("Failed to install tracing subscriber")?;
        Ok(Some(guard))
    } else {
        Registry::default()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(true),
            )
            .try_init()
            .context("Failed to install tracing subscriber")?;
        Ok(None)
    }
}

/// 简化初始化（使用默认配置）
pub fn init_default_logging() -> Option<WorkerGuard> {
    let config = LoggingConfig::default();
    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("Failed to initialize logging: {:#}", e);
        // 回退到最基本的日志初始化
        let _ = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .try_init();
        None
    })
}
