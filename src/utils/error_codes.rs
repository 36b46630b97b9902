//! 导入错误代码标准
//! 标准化错误代码，便于客户端展示和处理

use serde::{Deserialize, Serialize};

/// 标准错误代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum ErrorCode {
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 导入错误（4xxx）
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    /// 文件结构无效
    FileStructureInvalid = 4001,
    /// 根账户不匹配
    InvalidRoot = 4002,
    /// 路径包含密码
    PasswordPath = 4003,
    /// 路径无效
    InvalidPath = 4004,

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 后端错误（3xxx）
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    /// 存储读写失败
    StorageError = 3002,
    /// 配置错误
    ConfigurationError = 3005,
}

impl ErrorCode {
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// 获取错误消息（英文）
    pub fn message_en(&self) -> &'static str {
        match self {
            ErrorCode::FileStructureInvalid => "The key export file is not in the expected format",
            ErrorCode::InvalidRoot => "The key export file belongs to a different root account",
            ErrorCode::PasswordPath => "Derivation paths with a password cannot be imported",
            ErrorCode::InvalidPath => "Some derivation paths are invalid",
            ErrorCode::StorageError => "Failed to access stored derivations",
            ErrorCode::ConfigurationError => "Configuration error",
        }
    }

    /// 获取错误消息（中文）
    pub fn message_zh(&self) -> &'static str {
        match self {
            ErrorCode::FileStructureInvalid => "密钥导出文件格式不正确",
            ErrorCode::InvalidRoot => "密钥导出文件属于其他根账户",
            ErrorCode::PasswordPath => "不能导入带密码的派生路径",
            ErrorCode::InvalidPath => "部分派生路径无效",
            ErrorCode::StorageError => "读取或保存派生记录失败",
            ErrorCode::ConfigurationError => "配置错误",
        }
    }

    /// 获取错误消息（多语言）
    pub fn message(&self, lang: &str) -> &'static str {
        match lang {
            "zh" | "zh-CN" | "zh-TW" => self.message_zh(),
            _ => self.message_en(),
        }
    }

    /// 获取恢复建议（英文）
    pub fn recovery_hint_en(&self) -> Option<&'static str> {
        match self {
            ErrorCode::PasswordPath => Some("Remove the '///' password part from the listed paths"),
            ErrorCode::InvalidPath => Some("Fix or remove the listed paths and export again"),
            ErrorCode::InvalidRoot => Some("Switch to the wallet the file was exported from"),
            _ => None,
        }
    }

    /// 获取恢复建议（中文）
    pub fn recovery_hint_zh(&self) -> Option<&'static str> {
        match self {
            ErrorCode::PasswordPath => Some("请删除所列路径中的 '///' 密码部分"),
            ErrorCode::InvalidPath => Some("请修正或删除所列路径后重新导出"),
            ErrorCode::InvalidRoot => Some("请切换到导出该文件的钱包"),
            _ => None,
        }
    }

    /// 导入失败均为终态，只有存储错误可重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::StorageError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::FileStructureInvalid.code(), 4001);
        assert_eq!(ErrorCode::InvalidRoot.code(), 4002);
        assert_eq!(ErrorCode::PasswordPath.code(), 4003);
        assert_eq!(ErrorCode::InvalidPath.code(), 4004);
        assert_eq!(ErrorCode::StorageError.code(), 3002);
    }

    #[test]
    fn test_multilingual_messages() {
        assert_eq!(ErrorCode::InvalidPath.message("zh"), "部分派生路径无效");
        assert_eq!(
            ErrorCode::InvalidPath.message("en"),
            "Some derivation paths are invalid"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::StorageError.is_retryable());
        assert!(!ErrorCode::PasswordPath.is_retryable());
        assert!(!ErrorCode::FileStructureInvalid.is_retryable());
    }
}
