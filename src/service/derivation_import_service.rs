//! 派生导入服务
//!
//! 从存储加载根账户的已知派生，运行一次导入，并在实际完成对账时保存合并结果。

use std::sync::Arc;

use thiserror::Error;

use crate::config::{ImportConfig, DEFAULT_MAX_PAYLOAD_BYTES};
use crate::domain::chain_config::ChainRegistry;
use crate::error::{ImportError, ImportFailure};
use crate::repository::DerivationRepository;
use crate::service::import_orchestrator::{ImportOrchestrator, ImportSuccess};
use crate::utils::error_codes::ErrorCode;

/// 服务层错误
#[derive(Debug, Error)]
pub enum ServiceError {
    /// 导入被拒绝
    #[error(transparent)]
    Import(#[from] ImportError),

    /// 存储读写失败
    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ServiceError::Import(e) => e.kind().error_code(),
            ServiceError::Storage(_) => ErrorCode::StorageError,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.error_code().is_retryable()
    }

    /// 导入失败的对外结构（存储错误没有对应结构）
    pub fn import_failure(&self) -> Option<ImportFailure> {
        match self {
            ServiceError::Import(e) => Some(e.to_failure()),
            ServiceError::Storage(_) => None,
        }
    }
}

/// 导入选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// 只计算结果，不写回存储
    pub dry_run: bool,
}

/// 派生导入服务
pub struct DerivationImportService {
    repository: Arc<dyn DerivationRepository>,
    registry: Arc<dyn ChainRegistry>,
    max_payload_bytes: usize,
}

impl DerivationImportService {
    pub fn new(repository: Arc<dyn DerivationRepository>, registry: Arc<dyn ChainRegistry>) -> Self {
        Self {
            repository,
            registry,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }

    pub fn from_config(
        config: &ImportConfig,
        repository: Arc<dyn DerivationRepository>,
        registry: Arc<dyn ChainRegistry>,
    ) -> Self {
        Self {
            max_payload_bytes: config.max_payload_bytes,
            ..Self::new(repository, registry)
        }
    }

    /// 为根账户导入一份密钥导出文件
    pub async fn import(
        &self,
        root: &str,
        text: &str,
        options: ImportOptions,
    ) -> Result<ImportSuccess, ServiceError> {
        let existing = self.repository.existing_derivations(root).await?;
        tracing::debug!(root = %root, existing = existing.len(), "Loaded existing derivations");

        let mut orchestrator = ImportOrchestrator::new(self.registry.clone())
            .with_max_payload_bytes(self.max_payload_bytes);
        orchestrator.reset_values(Some(root.to_string()), existing);

        let success = orchestrator.file_uploaded(text).await?;

        if !success.reconciled {
            tracing::info!(root = %root, "Nothing reconciled, store left unchanged");
        } else if options.dry_run {
            tracing::info!(root = %root, "Dry run, merged derivations not saved");
        } else {
            self.repository
                .save_derivations(root, &success.outcome.merged_derivations)
                .await?;
        }

        Ok(success)
    }
}
