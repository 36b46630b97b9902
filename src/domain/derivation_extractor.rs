//! 派生记录提取
//!
//! 将按链嵌套的密钥描述展开为扁平的 `RawDerivation` 列表。

use crate::domain::derivation::RawDerivation;
use crate::domain::import_file::{ImportDocument, KeyDescriptor, KeyProperty};
use crate::error::{ImportError, ImportResult};

/// 提取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// 文档声明的根账户
    pub root: String,
    /// 该根账户下出现的链
    pub chain_ids: Vec<String>,
    pub derivations: Vec<RawDerivation>,
}

/// 属性折叠器
#[derive(Debug, Default)]
struct RawDerivationBuilder {
    raw: RawDerivation,
}

impl RawDerivationBuilder {
    fn for_chain(chain_id: &str) -> Self {
        Self {
            raw: RawDerivation {
                chain_id: Some(chain_id.to_string()),
                ..Default::default()
            },
        }
    }

    /// 同名属性后出现的覆盖先出现的
    fn apply(mut self, property: &KeyProperty) -> Self {
        match property {
            KeyProperty::DerivationPath(v) => self.raw.derivation_path = Some(v.clone()),
            KeyProperty::Type(v) => self.raw.key_type = Some(v.clone()),
            KeyProperty::Sharded(v) => self.raw.sharded = Some(v.clone()),
            KeyProperty::Other { name, .. } => {
                tracing::debug!(property = %name, "Ignoring unrecognized key property");
            }
        }
        self
    }

    fn build(self) -> RawDerivation {
        self.raw
    }
}

/// 折叠单个密钥描述
pub fn fold_descriptor(chain_id: &str, descriptor: &KeyDescriptor) -> RawDerivation {
    descriptor
        .key
        .iter()
        .fold(RawDerivationBuilder::for_chain(chain_id), RawDerivationBuilder::apply)
        .build()
}

/// 展开整个文档
///
/// 文档含多个根账户时，取与 `expected_root` 一致的那个，否则取第一个，
/// 是否匹配由调用方核对。
pub fn extract_derivations(
    document: &ImportDocument,
    expected_root: Option<&str>,
) -> ImportResult<Extraction> {
    let (root, chains) = document
        .select_root(expected_root)
        .ok_or(ImportError::NoRootFound)?;

    let derivations: Vec<RawDerivation> = chains
        .iter()
        .flat_map(|(chain_id, descriptors)| {
            descriptors
                .iter()
                .map(move |descriptor| fold_descriptor(chain_id, descriptor))
        })
        .collect();

    tracing::debug!(
        root = %root,
        roots = document.roots.len(),
        chains = chains.len(),
        derivations = derivations.len(),
        "Extracted raw derivations"
    );

    Ok(Extraction {
        root: root.to_string(),
        chain_ids: chains.keys().cloned().collect(),
        derivations,
    })
}
