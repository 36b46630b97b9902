//! 导入错误定义
//!
//! 导入流水线的所有失败都是终态：不重试、不做部分恢复，
//! 原样携带分类和无效路径列表返回给调用方。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::error_codes::ErrorCode;

pub type ImportResult<T> = std::result::Result<T, ImportError>;

/// 导入失败
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImportError {
    /// 文件结构不符合导出格式，或某个条目缺少派生路径
    #[error("File structure invalid: {reason}")]
    FileStructureInvalid { reason: String },

    /// 文档中没有任何根账户
    #[error("No root account found in import document")]
    NoRootFound,

    /// 文档根账户与当前会话的根账户不一致
    #[error("Root account mismatch (expected {expected:?}, found {found})")]
    InvalidRoot {
        expected: Option<String>,
        found: String,
    },

    /// 所有无效路径都包含密码标记 `///`
    #[error("Derivation paths contain a password: {paths:?}")]
    PasswordPath { paths: Vec<String> },

    /// 路径语法、链、类型或分片数量不合法
    #[error("Invalid derivation paths: {paths:?}")]
    InvalidPath { paths: Vec<String> },
}

impl ImportError {
    pub fn file_structure(reason: impl Into<String>) -> Self {
        Self::FileStructureInvalid {
            reason: reason.into(),
        }
    }

    /// 四类对外分类
    pub fn kind(&self) -> ImportErrorKind {
        match self {
            Self::FileStructureInvalid { .. } => ImportErrorKind::FileStructureInvalid,
            Self::NoRootFound | Self::InvalidRoot { .. } => ImportErrorKind::InvalidRoot,
            Self::PasswordPath { .. } => ImportErrorKind::PasswordPath,
            Self::InvalidPath { .. } => ImportErrorKind::InvalidPath,
        }
    }

    /// 被拒绝的派生路径（仅路径类错误携带）
    pub fn invalid_paths(&self) -> Option<&[String]> {
        match self {
            Self::PasswordPath { paths } | Self::InvalidPath { paths } => Some(paths),
            _ => None,
        }
    }

    /// 转换为对外输出的失败结构
    pub fn to_failure(&self) -> ImportFailure {
        let kind = self.kind();
        ImportFailure {
            error: kind,
            code: kind.error_code().code(),
            message: kind.user_message().to_string(),
            recovery_hint: kind.error_code().recovery_hint_en().map(str::to_string),
            invalid_paths: self.invalid_paths().map(<[String]>::to_vec),
        }
    }
}

/// 对外错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportErrorKind {
    FileStructureInvalid,
    InvalidRoot,
    PasswordPath,
    InvalidPath,
}

impl ImportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileStructureInvalid => "file_structure_invalid",
            Self::InvalidRoot => "invalid_root",
            Self::PasswordPath => "password_path",
            Self::InvalidPath => "invalid_path",
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::FileStructureInvalid => ErrorCode::FileStructureInvalid,
            Self::InvalidRoot => ErrorCode::InvalidRoot,
            Self::PasswordPath => ErrorCode::PasswordPath,
            Self::InvalidPath => ErrorCode::InvalidPath,
        }
    }

    /// 用户友好提示
    pub fn user_message(&self) -> &'static str {
        self.error_code().message_en()
    }
}

/// 失败输出 `{ error, invalidPaths? }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    pub error: ImportErrorKind,
    pub code: u32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_paths: Option<Vec<String>>,
}
