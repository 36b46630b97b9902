//! ironcore-derivations 命令行入口
//! 将密钥导出文件导入到根账户的派生记录中，结果以 JSON 输出到 stdout

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use ironcore_derivations::{
    cli::CliArgs,
    config::Config,
    domain::NetworkRegistry,
    infrastructure::logging,
    repository::JsonFileDerivationRepository,
    service::{export_text, DerivationImportService, ImportOptions, ServiceError},
    utils::error_codes::ErrorCode,
};

#[tokio::main]
async fn main() -> ExitCode {
    // 1. 加载环境变量
    dotenvy::dotenv().ok();

    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run() -> Result<ExitCode> {
    let args = CliArgs::parse(std::env::args().skip(1))?;

    // 2. 配置
    let config = Config::from_env_and_file(args.config_path.as_deref())
        .with_context(|| ErrorCode::ConfigurationError.message_en())?;
    config.validate()?;

    // 3. 日志（guard 持有到进程结束）
    let _log_guard = logging::init_logging(&config.logging).unwrap_or_else(|e| {
        eprintln!("Failed to initialize logging: {:#}", e);
        logging::init_default_logging()
    });

    // 4. 网络注册表
    let mut registry = NetworkRegistry::new();
    for network in &config.import.extra_networks {
        registry.register(network.clone());
    }
    if let Err(errors) = registry.validate_configs() {
        anyhow::bail!("Invalid network configuration: {}", errors.join("; "));
    }

    let repository = Arc::new(JsonFileDerivationRepository::new(&config.import.store_path));
    let service = DerivationImportService::from_config(&config.import, repository, Arc::new(registry));

    let bytes = tokio::fs::read(&args.export_file)
        .await
        .with_context(|| format!("Failed to read export file {}", args.export_file.display()))?;
    let text = match export_text(bytes) {
        Ok(text) => text,
        Err(e) => {
            println!("{}", serde_json::to_string_pretty(&e.to_failure())?);
            return Ok(ExitCode::FAILURE);
        }
    };

    tracing::info!(
        file = %args.export_file.display(),
        root = %args.root,
        dry_run = args.dry_run,
        "Importing derivations"
    );

    let options = ImportOptions {
        dry_run: args.dry_run,
    };
    match service.import(&args.root, &text, options).await {
        Ok(success) => {
            println!("{}", serde_json::to_string_pretty(&success)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(ServiceError::Import(e)) => {
            println!("{}", serde_json::to_string_pretty(&e.to_failure())?);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
