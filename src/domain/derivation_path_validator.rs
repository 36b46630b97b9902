//! 派生路径语法验证器
//!
//! 路径方言：`//` 表示硬派生，`/` 表示软派生，`///` 之后为密码。
//! 带密码的路径一律禁止导入。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::derivation::KeyType;

/// 以一个或两个斜杠开头，之后紧跟非空段，且不以斜杠结尾
static WELL_FORMED_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(//|/)[^/].*[^/]$").unwrap());

/// 密码标记
pub const PASSWORD_MARKER: &str = "///";

/// 分片数量上限（含）
pub const MAX_SHARDS: u32 = 50;

/// 分片数量下限（不含）
pub const MIN_SHARDS_EXCLUSIVE: u32 = 1;

pub fn is_well_formed(path: &str) -> bool {
    WELL_FORMED_PATH.is_match(path)
}

pub fn has_password_marker(path: &str) -> bool {
    path.contains(PASSWORD_MARKER)
}

pub fn is_path_valid(path: &str) -> bool {
    is_well_formed(path) && !has_password_marker(path)
}

/// 缺省，或 `1 < s <= 50`
pub fn is_shard_count_valid(sharded: Option<u32>) -> bool {
    match sharded {
        None => true,
        Some(s) => s > MIN_SHARDS_EXCLUSIVE && s <= MAX_SHARDS,
    }
}

/// 解析文本形式的分片数量，只接受十进制整数
pub fn parse_shard_count(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<u32>().ok()
}

pub fn sharding_allowed_for_type(key_type: KeyType) -> bool {
    key_type.allows_sharding()
}

/// 路径校验结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathVerdict {
    Valid,
    Malformed,
    PasswordProtected,
}

/// 派生路径验证器
#[derive(Debug, Clone, Copy, Default)]
pub struct DerivationPathValidator;

impl DerivationPathValidator {
    pub fn new() -> Self {
        Self
    }

    /// 验证派生路径
    ///
    /// 同时满足格式错误和带密码时返回 `PasswordProtected`，
    /// 以便上层按密码路径归类。
    pub fn check_path(&self, path: &str) -> PathVerdict {
        if has_password_marker(path) {
            PathVerdict::PasswordProtected
        } else if is_well_formed(path) {
            PathVerdict::Valid
        } else {
            PathVerdict::Malformed
        }
    }

    /// 验证分片数量及其与密钥类型的组合
    pub fn validate_sharding(&self, key_type: KeyType, sharded: Option<u32>) -> Result<(), String> {
        if !is_shard_count_valid(sharded) {
            return Err(format!(
                "Shard count must be greater than {} and at most {}",
                MIN_SHARDS_EXCLUSIVE, MAX_SHARDS
            ));
        }
        if sharded.is_some() && !sharding_allowed_for_type(key_type) {
            return Err(format!("Key type {} cannot be sharded", key_type));
        }
        Ok(())
    }
}
