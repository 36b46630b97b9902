//! 网络配置模块
//!
//! 以创世哈希标识的网络注册表，用于校验导入条目引用的链是否存在

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 链存在性查询接口
pub trait ChainRegistry: Send + Sync {
    /// 是否存在给定标识的链
    fn exists(&self, chain_id: &str) -> bool;
}

/// 网络配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// 创世哈希 (0x...)
    pub genesis_hash: String,
    /// 网络名称
    pub name: String,
    /// 原生代币符号
    pub symbol: String,
    /// 是否为测试网
    #[serde(default)]
    pub is_testnet: bool,
}

impl NetworkConfig {
    pub fn new(
        genesis_hash: impl Into<String>,
        name: impl Into<String>,
        symbol: impl Into<String>,
        is_testnet: bool,
    ) -> Self {
        Self {
            genesis_hash: genesis_hash.into(),
            name: name.into(),
            symbol: symbol.into(),
            is_testnet,
        }
    }
}

/// 网络注册表
pub struct NetworkRegistry {
    configs: HashMap<String, NetworkConfig>,
}

impl NetworkRegistry {
    /// 创建预配置的注册表
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_default_networks();
        registry
    }

    /// 不含任何网络的注册表
    pub fn empty() -> Self {
        Self {
            configs: HashMap::new(),
        }
    }

    /// 注册默认支持的网络
    fn register_default_networks(&mut self) {
        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        // 主网
        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

        self.register(NetworkConfig::new(
            "0x91b171bb158e2d3848fa23a9f1c25182fb8e20313b2c1eb49219da7a70ce90c3",
            "Polkadot",
            "DOT",
            false,
        ));

        self.register(NetworkConfig::new(
            "0xb0a8d493285c2df73290dfb7e61f870f17b41801197a149ca93654499ea3dafe",
            "Kusama",
            "KSM",
            false,
        ));

        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
        // 测试网
        // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

        self.register(NetworkConfig::new(
            "0xe143f23803ac50e8f6f8e62695d1ce9e4e1d68aa36c1cd2cfd15340213f3423e",
            "Westend",
            "WND",
            true,
        ));

        self.register(NetworkConfig::new(
            "0x6408de7737c59c238890533af25896a2c20608d8b380bb01029acb392781063e",
            "Rococo",
            "ROC",
            true,
        ));
    }

    /// 注册网络配置（同一创世哈希后注册的覆盖先注册的）
    pub fn register(&mut self, config: NetworkConfig) {
        let key = normalize_hash(&config.genesis_hash);
        self.configs.insert(key, config);
    }

    /// 通过创世哈希获取配置
    pub fn get_by_genesis_hash(&self, genesis_hash: &str) -> Option<&NetworkConfig> {
        self.configs.get(&normalize_hash(genesis_hash))
    }

    /// 列出所有网络
    pub fn list_all(&self) -> Vec<&NetworkConfig> {
        self.configs.values().collect()
    }

    /// 验证网络配置完整性
    pub fn validate_configs(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for config in self.configs.values() {
            if !crate::domain::import_file::is_hex_identifier(&config.genesis_hash) {
                errors.push(format!(
                    "Network {} has invalid genesis hash: {}",
                    config.name, config.genesis_hash
                ));
            }
            if config.name.is_empty() {
                errors.push(format!("Network {} has empty name", config.genesis_hash));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl ChainRegistry for NetworkRegistry {
    fn exists(&self, chain_id: &str) -> bool {
        self.get_by_genesis_hash(chain_id).is_some()
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_hash(hash: &str) -> String {
    hash.trim().to_ascii_lowercase()
}
