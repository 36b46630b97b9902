//! 派生记录领域模型
//!
//! `RawDerivation` 是从导出文件中提取出的未校验候选，
//! `ValidatedDerivation` 是通过全部规则校验后的强类型记录。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 派生密钥的语义角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyType {
    Main,
    Hot,
    Public,
    Staking,
    Governance,
    Custom,
}

impl KeyType {
    pub const ALL: [KeyType; 6] = [
        KeyType::Main,
        KeyType::Hot,
        KeyType::Public,
        KeyType::Staking,
        KeyType::Governance,
        KeyType::Custom,
    ];

    /// 转换为导出文件中的字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Main => "MAIN",
            KeyType::Hot => "HOT",
            KeyType::Public => "PUBLIC",
            KeyType::Staking => "STAKING",
            KeyType::Governance => "GOVERNANCE",
            KeyType::Custom => "CUSTOM",
        }
    }

    /// 该类型是否允许分片（PUBLIC / HOT 不允许）
    pub fn allows_sharding(&self) -> bool {
        !matches!(self, KeyType::Public | KeyType::Hot)
    }
}

impl FromStr for KeyType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MAIN" => Ok(KeyType::Main),
            "HOT" => Ok(KeyType::Hot),
            "PUBLIC" => Ok(KeyType::Public),
            "STAKING" => Ok(KeyType::Staking),
            "GOVERNANCE" => Ok(KeyType::Governance),
            "CUSTOM" => Ok(KeyType::Custom),
            _ => Err(anyhow::anyhow!("Invalid key type: {}", s)),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 未校验的派生候选，所有字段都可能缺失
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDerivation {
    pub derivation_path: Option<String>,
    pub chain_id: Option<String>,
    pub sharded: Option<String>,
    #[serde(rename = "type")]
    pub key_type: Option<String>,
}

impl RawDerivation {
    /// 非空派生路径
    pub fn path(&self) -> Option<&str> {
        self.derivation_path.as_deref().filter(|p| !p.is_empty())
    }
}

/// 已校验的派生记录
///
/// `sharded` 存在时表示该路径代表一组 N 个子密钥，取值范围 (1, 50]。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedDerivation {
    pub derivation_path: String,
    pub chain_id: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sharded: Option<u32>,
}

impl ValidatedDerivation {
    pub fn new(
        derivation_path: impl Into<String>,
        chain_id: impl Into<String>,
        key_type: KeyType,
    ) -> Self {
        Self {
            derivation_path: derivation_path.into(),
            chain_id: chain_id.into(),
            key_type,
            sharded: None,
        }
    }

    pub fn with_shards(mut self, sharded: u32) -> Self {
        self.sharded = Some(sharded);
        self
    }

    /// 该条目代表的密钥数量
    pub fn key_count(&self) -> u64 {
        u64::from(self.sharded.unwrap_or(1))
    }

    pub fn is_sharded(&self) -> bool {
        self.sharded.is_some()
    }
}

/// 一次对账的统计报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    pub added_keys: u64,
    pub duplicated_keys: u64,
    pub updated_networks: u64,
    pub ignored_networks: Vec<String>,
}

/// 对账结果 `{ mergedDerivations, report }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    pub merged_derivations: Vec<ValidatedDerivation>,
    pub report: MergeReport,
}

/// 所有条目代表的密钥总数
pub fn total_key_count(derivations: &[ValidatedDerivation]) -> u64 {
    derivations.iter().map(ValidatedDerivation::key_count).sum()
}
