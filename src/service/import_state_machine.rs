//! 导入流水线状态机
//!
//! ```text
//! Idle -> Validating -> Extracting -> Checking -> Reconciling -> Succeeded
//!             |             |            |
//!             +-------------+------------+--> Failed
//! ```
//! 终态可以直接开始下一次导入（-> Validating），任何状态都可以被重置回 Idle。

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// 导入状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportState {
    Idle,
    Validating,
    Extracting,
    Checking,
    Reconciling,
    Succeeded,
    Failed,
}

impl ImportState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportState::Idle => "idle",
            ImportState::Validating => "validating",
            ImportState::Extracting => "extracting",
            ImportState::Checking => "checking",
            ImportState::Reconciling => "reconciling",
            ImportState::Succeeded => "succeeded",
            ImportState::Failed => "failed",
        }
    }

    /// 判断是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportState::Succeeded | ImportState::Failed)
    }

    /// 是否可以开始一次新的导入
    pub fn accepts_upload(&self) -> bool {
        matches!(self, ImportState::Idle) || self.is_terminal()
    }
}

impl std::fmt::Display for ImportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 状态转换记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: ImportState,
    pub to: ImportState,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub reason: Option<String>,
}

/// 导入状态机
pub struct ImportStateMachine;

impl ImportStateMachine {
    /// 判断状态转换是否合法
    pub fn can_transition(from: ImportState, to: ImportState) -> bool {
        if to == ImportState::Idle {
            return true;
        }

        match from {
            ImportState::Idle | ImportState::Succeeded | ImportState::Failed => {
                matches!(to, ImportState::Validating)
            }
            ImportState::Validating => {
                matches!(to, ImportState::Extracting | ImportState::Failed)
            }
            ImportState::Extracting => matches!(to, ImportState::Checking | ImportState::Failed),
            ImportState::Checking => matches!(to, ImportState::Reconciling | ImportState::Failed),
            ImportState::Reconciling => matches!(to, ImportState::Succeeded),
        }
    }

    /// 验证状态转换
    pub fn validate_transition(from: ImportState, to: ImportState) -> Result<()> {
        if Self::can_transition(from, to) {
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "Invalid import state transition: {} -> {}",
                from.as_str(),
                to.as_str()
            ))
        }
    }

    /// 获取下一个可能状态列表（不含重置）
    pub fn next_states(current: ImportState) -> Vec<ImportState> {
        match current {
            ImportState::Idle | ImportState::Succeeded | ImportState::Failed => {
                vec![ImportState::Validating]
            }
            ImportState::Validating => vec![ImportState::Extracting, ImportState::Failed],
            ImportState::Extracting => vec![ImportState::Checking, ImportState::Failed],
            ImportState::Checking => vec![ImportState::Reconciling, ImportState::Failed],
            ImportState::Reconciling => vec![ImportState::Succeeded],
        }
    }

    /// 创建状态转换记录
    pub fn create_transition(
        from: ImportState,
        to: ImportState,
        reason: Option<String>,
    ) -> StateTransition {
        StateTransition {
            from,
            to,
            timestamp: chrono::Utc::now(),
            reason,
        }
    }
}
