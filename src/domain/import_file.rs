//! 密钥导出文件结构
//!
//! 只校验文档形状（版本、十六进制键、嵌套列表），不做任何语义校验。
//!
//! ```text
//! {
//!   "version": "1",
//!   "0x<root>": {
//!     "0x<genesis>": [
//!       { "key": [ { "derivation_path": "//polkadot" }, { "type": "MAIN" } ] }
//!     ]
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{ImportError, ImportResult};

/// 当前支持的文件版本
pub const SUPPORTED_VERSION: &str = "1";

pub const VERSION_FIELD: &str = "version";
pub const KEY_FIELD: &str = "key";

static HEX_IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]+$").unwrap());

/// 是否为 `0x` 前缀的十六进制标识
pub fn is_hex_identifier(value: &str) -> bool {
    HEX_IDENTIFIER.is_match(value)
}

/// 密钥描述中的单个属性
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyProperty {
    DerivationPath(String),
    Type(String),
    Sharded(String),
    /// 未识别的属性，提取时丢弃
    Other { name: String, value: String },
}

impl KeyProperty {
    /// 按属性名归类，`derivation_path` 与 `derivationPath` 视为同一字段
    pub fn from_pair(name: &str, value: String) -> Self {
        match name {
            "derivation_path" | "derivationPath" => KeyProperty::DerivationPath(value),
            "type" => KeyProperty::Type(value),
            "sharded" => KeyProperty::Sharded(value),
            _ => KeyProperty::Other {
                name: name.to_string(),
                value,
            },
        }
    }
}

/// 单个密钥描述（属性列表）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDescriptor {
    pub key: Vec<KeyProperty>,
}

/// 链 -> 密钥描述列表
pub type ChainKeys = BTreeMap<String, Vec<KeyDescriptor>>;

/// 根账户 -> 链 -> 密钥描述列表
pub type RootKeys = BTreeMap<String, ChainKeys>;

/// 通过结构校验的导出文件
///
/// `roots` 为空表示文档中除 `version` 外没有任何根账户键，
/// 由提取阶段报告 `NoRootFound`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDocument {
    pub version: String,
    pub roots: RootKeys,
}

impl ImportDocument {
    /// 文档中的第一个根账户
    pub fn first_root(&self) -> Option<(&str, &ChainKeys)> {
        self.roots
            .iter()
            .next()
            .map(|(root, chains)| (root.as_str(), chains))
    }

    /// 选出要导入的根账户：优先与期望根账户一致（忽略大小写）的键，否则取第一个
    pub fn select_root(&self, expected: Option<&str>) -> Option<(&str, &ChainKeys)> {
        expected
            .and_then(|expected| {
                self.roots
                    .iter()
                    .find(|(root, _)| root.eq_ignore_ascii_case(expected.trim()))
                    .map(|(root, chains)| (root.as_str(), chains))
            })
            .or_else(|| self.first_root())
    }

    /// 密钥描述总数
    pub fn descriptor_count(&self) -> usize {
        self.roots
            .values()
            .flat_map(|chains| chains.values())
            .map(Vec::len)
            .sum()
    }
}

/// 文件结构验证器
#[derive(Debug, Clone)]
pub struct FileStructureValidator {
    supported_version: String,
}

impl FileStructureValidator {
    pub fn new() -> Self {
        Self::with_version(SUPPORTED_VERSION)
    }

    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            supported_version: version.into(),
        }
    }

    /// 校验解码后的文档并转换为 `ImportDocument`
    pub fn validate(&self, document: &Value) -> ImportResult<ImportDocument> {
        let top = document
            .as_object()
            .ok_or_else(|| ImportError::file_structure("Document must be a JSON object"))?;

        // 1. 版本
        let version = match top.get(VERSION_FIELD) {
            Some(Value::String(v)) if *v == self.supported_version => v.clone(),
            Some(other) => {
                return Err(ImportError::file_structure(format!(
                    "Unsupported version {}, expected \"{}\"",
                    other, self.supported_version
                )))
            }
            None => return Err(ImportError::file_structure("Missing version field")),
        };

        // 2. 根账户 -> 链 -> 描述列表
        let roots = top
            .iter()
            .filter(|(key, _)| key.as_str() != VERSION_FIELD)
            .map(|(root, chains)| Ok((root.clone(), parse_root(root, chains)?)))
            .collect::<ImportResult<RootKeys>>()?;

        Ok(ImportDocument { version, roots })
    }
}

impl Default for FileStructureValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_root(root: &str, chains_value: &Value) -> ImportResult<ChainKeys> {
    if !is_hex_identifier(root) {
        return Err(ImportError::file_structure(format!(
            "Root account must be a hex identifier: {}",
            root
        )));
    }

    let chains_obj = chains_value.as_object().ok_or_else(|| {
        ImportError::file_structure(format!("Root {} must map to an object of chains", root))
    })?;

    chains_obj
        .iter()
        .map(|(chain_id, descriptors)| {
            if !is_hex_identifier(chain_id) {
                return Err(ImportError::file_structure(format!(
                    "Chain identifier must be a hex identifier: {}",
                    chain_id
                )));
            }
            let list = descriptors.as_array().ok_or_else(|| {
                ImportError::file_structure(format!(
                    "Chain {} must map to a list of keys",
                    chain_id
                ))
            })?;
            let parsed = list
                .iter()
                .map(|descriptor| parse_descriptor(chain_id, descriptor))
                .collect::<ImportResult<Vec<_>>>()?;
            Ok((chain_id.clone(), parsed))
        })
        .collect()
}

fn parse_descriptor(chain_id: &str, descriptor: &Value) -> ImportResult<KeyDescriptor> {
    let properties = descriptor
        .as_object()
        .and_then(|obj| obj.get(KEY_FIELD))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ImportError::file_structure(format!(
                "Every key of chain {} must carry a \"key\" list",
                chain_id
            ))
        })?;

    let mut key = Vec::new();
    for property in properties {
        let pairs = property.as_object().ok_or_else(|| {
            ImportError::file_structure(format!(
                "Key properties of chain {} must be objects",
                chain_id
            ))
        })?;
        key.extend(parse_pairs(chain_id, pairs)?);
    }

    Ok(KeyDescriptor { key })
}

fn parse_pairs(chain_id: &str, pairs: &Map<String, Value>) -> ImportResult<Vec<KeyProperty>> {
    pairs
        .iter()
        .map(|(name, value)| match value {
            Value::String(s) => Ok(KeyProperty::from_pair(name, s.clone())),
            // 数字按十进制文本交给路径校验（如 `"sharded": 10`）
            Value::Number(n) => Ok(KeyProperty::from_pair(name, n.to_string())),
            _ => Err(ImportError::file_structure(format!(
                "Property {} of chain {} must be a string or a number",
                name, chain_id
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const ROOT: &str = "0xaabbcc";
    const CHAIN: &str = "0x91b171bb158e2d3848fa23a9f1c25182fb8e20313b2c1eb49219da7a70ce90c3";

    fn validate(doc: Value) -> ImportResult<ImportDocument> {
        FileStructureValidator::new().validate(&doc)
    }

    #[test]
    fn test_valid_document() {
        let doc = validate(json!({
            "version": "1",
            ROOT: {
                CHAIN: [
                    { "key": [ { "derivation_path": "//polkadot" }, { "type": "MAIN" } ] },
                    { "key": [ { "derivationPath": "//polkadot//staking", "type": "STAKING" }, { "sharded": "10" } ] }
                ]
            }
        }))
        .unwrap();

        assert_eq!(doc.version, "1");
        assert_eq!(doc.first_root().map(|(root, _)| root), Some(ROOT));
        assert_eq!(doc.descriptor_count(), 2);

        let keys = &doc.roots[ROOT][CHAIN];
        assert_eq!(
            keys[0].key,
            vec![
                KeyProperty::DerivationPath("//polkadot".into()),
                KeyProperty::Type("MAIN".into())
            ]
        );
        assert!(keys[1]
            .key
            .contains(&KeyProperty::DerivationPath("//polkadot//staking".into())));
        assert!(keys[1].key.contains(&KeyProperty::Sharded("10".into())));
    }

    #[test]
    fn test_missing_version() {
        let err = validate(json!({ ROOT: {} })).unwrap_err();
        assert!(matches!(err, ImportError::FileStructureInvalid { .. }));
    }

    #[test]
    fn test_unsupported_version() {
        assert!(validate(json!({ "version": "2", ROOT: {} })).is_err());
        assert!(validate(json!({ "version": 1, ROOT: {} })).is_err());
    }

    #[test]
    fn test_non_hex_root() {
        let err = validate(json!({ "version": "1", "root": { CHAIN: [] } })).unwrap_err();
        assert!(matches!(err, ImportError::FileStructureInvalid { .. }));
    }

    #[test]
    fn test_non_hex_chain() {
        assert!(validate(json!({ "version": "1", ROOT: { "polkadot": [] } })).is_err());
    }

    #[test]
    fn test_descriptor_without_key_list() {
        assert!(validate(json!({ "version": "1", ROOT: { CHAIN: [ { "derivation_path": "//a" } ] } })).is_err());
        assert!(validate(json!({ "version": "1", ROOT: { CHAIN: [ { "key": "//a" } ] } })).is_err());
        assert!(validate(json!({ "version": "1", ROOT: { CHAIN: { "key": [] } } })).is_err());
    }

    #[test]
    fn test_numeric_property_kept_as_text() {
        let doc = validate(json!({
            "version": "1",
            ROOT: { CHAIN: [ { "key": [ { "derivation_path": "//s" }, { "sharded": 10 }, { "index": 2.5 } ] } ] }
        }))
        .unwrap();

        let key = &doc.roots[ROOT][CHAIN][0].key;
        assert!(key.contains(&KeyProperty::Sharded("10".into())));
        assert!(key.contains(&KeyProperty::Other {
            name: "index".into(),
            value: "2.5".into()
        }));
    }

    #[test]
    fn test_non_scalar_property() {
        for value in [json!(true), json!(null), json!(["10"]), json!({ "n": 10 })] {
            let err = validate(json!({
                "version": "1",
                ROOT: { CHAIN: [ { "key": [ { "sharded": value } ] } ] }
            }))
            .unwrap_err();
            assert!(matches!(err, ImportError::FileStructureInvalid { .. }));
        }
    }

    #[test]
    fn test_multiple_roots_accepted() {
        let doc = validate(json!({
            "version": "1",
            ROOT: { CHAIN: [ { "key": [ { "derivation_path": "//a" } ] } ] },
            "0xffff": { CHAIN: [ { "key": [ { "derivation_path": "//b" } ] } ] }
        }))
        .unwrap();

        assert_eq!(doc.roots.len(), 2);
        assert_eq!(doc.descriptor_count(), 2);
        assert_eq!(doc.select_root(Some("0xFFFF")).map(|(root, _)| root), Some("0xffff"));
        assert_eq!(doc.select_root(Some(ROOT)).map(|(root, _)| root), Some(ROOT));
        // 没有匹配时取第一个根账户，交给根账户核对
        assert_eq!(doc.select_root(Some("0x01")), doc.first_root());
        assert_eq!(doc.select_root(None), doc.first_root());
    }

    #[test]
    fn test_every_root_checked() {
        // 额外的根账户同样要求十六进制键和合法结构
        assert!(validate(json!({ "version": "1", ROOT: {}, "other": {} })).is_err());
        assert!(validate(json!({ "version": "1", ROOT: {}, "0xffff": { CHAIN: {} } })).is_err());
        assert!(validate(json!({ "version": "1", ROOT: {}, "0xffff": [] })).is_err());
    }

    #[test]
    fn test_document_without_root() {
        let doc = validate(json!({ "version": "1" })).unwrap();
        assert!(doc.roots.is_empty());
        assert!(doc.first_root().is_none());
    }

    #[test]
    fn test_not_an_object() {
        assert!(validate(json!(["version", "1"])).is_err());
        assert!(validate(json!({ "version": "1", ROOT: "0x01" })).is_err());
    }

    #[test]
    fn test_hex_identifier() {
        assert!(is_hex_identifier("0x00ff"));
        assert!(is_hex_identifier("0xABCDEF"));
        assert!(!is_hex_identifier("0x"));
        assert!(!is_hex_identifier("ff00"));
        assert!(!is_hex_identifier("0xzz"));
    }
}
