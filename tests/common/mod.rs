//! 测试辅助模块
//! 提供导入文档构造和预置数据

#![allow(dead_code)]

use std::sync::Arc;

use ironcore_derivations::domain::{
    ChainRegistry, KeyType, NetworkConfig, NetworkRegistry, ValidatedDerivation,
};
use serde_json::{json, Value};

/// 测试根账户
pub const ROOT: &str = "0x5c9f1b0e8d2a4c6e";

/// Polkadot 创世哈希
pub const POLKADOT: &str = "0x91b171bb158e2d3848fa23a9f1c25182fb8e20313b2c1eb49219da7a70ce90c3";

/// Kusama 创世哈希
pub const KUSAMA: &str = "0xb0a8d493285c2df73290dfb7e61f870f17b41801197a149ca93654499ea3dafe";

/// 本地测试链
pub const LOCAL_CHAIN: &str = "0x0badc0de";

/// 预置网络加本地测试链
pub fn test_registry() -> Arc<dyn ChainRegistry> {
    let mut registry = NetworkRegistry::new();
    registry.register(NetworkConfig::new(LOCAL_CHAIN, "Local", "UNIT", true));
    Arc::new(registry)
}

/// 构造单个密钥描述
pub fn key(path: &str, key_type: &str, sharded: Option<&str>) -> Value {
    let mut props = vec![json!({ "derivation_path": path }), json!({ "type": key_type })];
    if let Some(s) = sharded {
        props.push(json!({ "sharded": s }));
    }
    json!({ "key": props })
}

/// 构造导出文档
pub fn export_document(root: &str, chains: &[(&str, Vec<Value>)]) -> String {
    let mut chain_map = serde_json::Map::new();
    for (chain, keys) in chains {
        chain_map.insert(chain.to_string(), Value::Array(keys.clone()));
    }

    let mut doc = serde_json::Map::new();
    doc.insert("version".into(), json!("1"));
    doc.insert(root.to_string(), Value::Object(chain_map));
    Value::Object(doc).to_string()
}

/// 已知派生：一个主密钥、一个质押密钥、一个 10 分片的质押组
pub fn existing_polkadot() -> Vec<ValidatedDerivation> {
    vec![
        ValidatedDerivation::new("//polkadot", POLKADOT, KeyType::Main),
        ValidatedDerivation::new("//polkadot//staking//k", POLKADOT, KeyType::Staking),
        ValidatedDerivation::new("//polkadot//staking", POLKADOT, KeyType::Staking)
            .with_shards(10),
    ]
}
