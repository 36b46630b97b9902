//! 导入编排器
//!
//! 按 `Validating -> Extracting -> Checking -> Reconciling` 顺序串联各阶段，
//! 任一阶段失败即进入 `Failed`。会话状态只有 `ImportContext`（期望的根账户和
//! 已知派生），只能通过 `reset_values` 修改，导入过程不会改动它。

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::DEFAULT_MAX_PAYLOAD_BYTES;
use crate::domain::chain_config::ChainRegistry;
use crate::domain::derivation::{MergeOutcome, MergeReport, ValidatedDerivation};
use crate::domain::derivation_extractor::{extract_derivations, Extraction};
use crate::domain::derivation_validator::DerivationValidator;
use crate::domain::import_file::{FileStructureValidator, ImportDocument};
use crate::error::{ImportError, ImportResult};
use crate::service::import_state_machine::{ImportState, ImportStateMachine, StateTransition};
use crate::service::reconciliation_service::ReconciliationEngine;

/// 导入会话上下文
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportContext {
    /// 当前钱包的根账户
    pub root: Option<String>,
    /// 该根账户已知的派生记录快照
    pub existing: Vec<ValidatedDerivation>,
}

/// 导入成功的结果 `{ root, mergedDerivations, report }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSuccess {
    pub root: String,
    #[serde(flatten)]
    pub outcome: MergeOutcome,
    /// 是否实际执行了对账；跳过时结果不应被保存
    #[serde(skip)]
    pub reconciled: bool,
}

/// 根账户比较（十六进制标识，忽略大小写）
pub fn roots_match(expected: &str, found: &str) -> bool {
    expected.trim().eq_ignore_ascii_case(found.trim())
}

/// 导出文件原始字节转为文本，非 UTF-8 按文件结构错误处理
pub fn export_text(bytes: Vec<u8>) -> ImportResult<String> {
    String::from_utf8(bytes)
        .map_err(|e| ImportError::file_structure(format!("Export file is not valid UTF-8: {}", e)))
}

/// 异步解码导入文本
///
/// 解码放到阻塞线程池执行，解析失败和任务中断都按文件结构错误处理。
pub async fn decode_document(text: String) -> ImportResult<Value> {
    tokio::task::spawn_blocking(move || serde_json::from_str::<Value>(&text))
        .await
        .map_err(|e| ImportError::file_structure(format!("Decoding was interrupted: {}", e)))?
        .map_err(|e| ImportError::file_structure(format!("Not a valid JSON document: {}", e)))
}

/// 导入编排器
pub struct ImportOrchestrator {
    registry: Arc<dyn ChainRegistry>,
    structure: FileStructureValidator,
    engine: ReconciliationEngine,
    max_payload_bytes: usize,
    context: ImportContext,
    state: ImportState,
    last_failure: Option<ImportError>,
    history: Vec<StateTransition>,
}

impl ImportOrchestrator {
    pub fn new(registry: Arc<dyn ChainRegistry>) -> Self {
        Self {
            registry,
            structure: FileStructureValidator::new(),
            engine: ReconciliationEngine::new(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            context: ImportContext::default(),
            state: ImportState::Idle,
            last_failure: None,
            history: Vec::new(),
        }
    }

    pub fn with_max_payload_bytes(mut self, max_payload_bytes: usize) -> Self {
        self.max_payload_bytes = max_payload_bytes;
        self
    }

    /// 切换钱包或根账户时重置上下文
    pub fn reset_values(&mut self, root: Option<String>, existing: Vec<ValidatedDerivation>) {
        tracing::debug!(
            root = ?root,
            existing = existing.len(),
            "Import context reset"
        );
        self.context = ImportContext { root, existing };
        self.last_failure = None;
        self.advance(ImportState::Idle, Some("reset".into()));
    }

    pub fn context(&self) -> &ImportContext {
        &self.context
    }

    pub fn state(&self) -> ImportState {
        self.state
    }

    /// 最近一次导入的失败原因
    pub fn last_failure(&self) -> Option<&ImportError> {
        self.last_failure.as_ref()
    }

    /// 状态转换记录
    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// 处理上传的导入文本
    pub async fn file_uploaded(&mut self, text: &str) -> ImportResult<ImportSuccess> {
        self.last_failure = None;
        self.advance(ImportState::Validating, None);

        // 1. 文件结构
        let result = self.validate_structure(text).await;
        let document = match result {
            Ok(document) => document,
            Err(e) => return Err(self.fail(e)),
        };

        // 2. 提取并核对根账户
        self.advance(ImportState::Extracting, None);
        let result = extract_derivations(&document, self.context.root.as_deref())
            .and_then(|x| self.check_root(x));
        let extraction = match result {
            Ok(extraction) => extraction,
            Err(e) => return Err(self.fail(e)),
        };

        // 3. 逐条校验
        self.advance(ImportState::Checking, None);
        let result =
            DerivationValidator::new(self.registry.as_ref()).validate_all(&extraction.derivations);
        let validated = match result {
            Ok(validated) => validated,
            Err(e) => return Err(self.fail(e)),
        };

        // 4. 对账
        self.advance(ImportState::Reconciling, None);
        let success = self.reconcile(extraction, &validated);

        self.advance(ImportState::Succeeded, None);
        tracing::info!(
            root = %success.root,
            reconciled = success.reconciled,
            added_keys = success.outcome.report.added_keys,
            duplicated_keys = success.outcome.report.duplicated_keys,
            updated_networks = success.outcome.report.updated_networks,
            ignored_networks = success.outcome.report.ignored_networks.len(),
            "Derivation import succeeded"
        );

        Ok(success)
    }

    async fn validate_structure(&self, text: &str) -> ImportResult<ImportDocument> {
        if text.len() > self.max_payload_bytes {
            return Err(ImportError::file_structure(format!(
                "Payload of {} bytes exceeds the limit of {} bytes",
                text.len(),
                self.max_payload_bytes
            )));
        }

        let value = decode_document(text.to_string()).await?;
        self.structure.validate(&value)
    }

    fn check_root(&self, extraction: Extraction) -> ImportResult<Extraction> {
        match self.context.root.as_deref() {
            Some(expected) if roots_match(expected, &extraction.root) => Ok(extraction),
            expected => Err(ImportError::InvalidRoot {
                expected: expected.map(str::to_string),
                found: extraction.root,
            }),
        }
    }

    fn reconcile(&self, extraction: Extraction, validated: &[ValidatedDerivation]) -> ImportSuccess {
        let Extraction {
            root, chain_ids, ..
        } = extraction;

        if self.context.existing.is_empty() {
            let ignored_networks = chain_ids;
            tracing::info!(
                root = %root,
                ignored_networks = ?ignored_networks,
                "No existing derivations for root, reconciliation skipped"
            );
            return ImportSuccess {
                root,
                outcome: MergeOutcome {
                    merged_derivations: Vec::new(),
                    report: MergeReport {
                        ignored_networks,
                        ..Default::default()
                    },
                },
                reconciled: false,
            };
        }

        ImportSuccess {
            root,
            outcome: self.engine.reconcile(&self.context.existing, validated),
            reconciled: true,
        }
    }

    fn fail(&mut self, error: ImportError) -> ImportError {
        tracing::warn!(
            error = %error,
            kind = error.kind().as_str(),
            stage = self.state.as_str(),
            "Derivation import rejected"
        );
        self.advance(ImportState::Failed, Some(error.kind().as_str().to_string()));
        self.last_failure = Some(error.clone());
        error
    }

    /// 非法转换不生效，状态和历史保持原样
    fn advance(&mut self, to: ImportState, reason: Option<String>) -> bool {
        if let Err(e) = ImportStateMachine::validate_transition(self.state, to) {
            tracing::error!(error = %e, "Rejected import state transition");
            debug_assert!(ImportStateMachine::can_transition(self.state, to), "{}", e);
            return false;
        }
        self.history
            .push(ImportStateMachine::create_transition(self.state, to, reason));
        self.state = to;
        true
    }
}
