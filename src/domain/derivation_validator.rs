//! 派生记录校验
//!
//! 单条校验是一个全函数：要么得到 `ValidatedDerivation`，要么得到带原因的拒绝。
//! 整批校验是全有或全无的，任何一条无效都会拒绝整个导入。

use std::fmt;

use crate::domain::chain_config::ChainRegistry;
use crate::domain::derivation::{KeyType, RawDerivation, ValidatedDerivation};
use crate::domain::derivation_path_validator::{
    has_password_marker, parse_shard_count, DerivationPathValidator, PathVerdict,
};
use crate::error::{ImportError, ImportResult};

/// 条目无效的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    MalformedPath,
    PasswordPath,
    UnknownChain(Option<String>),
    UnknownKeyType(Option<String>),
    InvalidShardCount(String),
    ShardingNotAllowed(KeyType),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedPath => write!(f, "malformed path"),
            Self::PasswordPath => write!(f, "path contains a password"),
            Self::UnknownChain(Some(c)) => write!(f, "unknown chain {}", c),
            Self::UnknownChain(None) => write!(f, "missing chain"),
            Self::UnknownKeyType(Some(t)) => write!(f, "unknown key type {}", t),
            Self::UnknownKeyType(None) => write!(f, "missing key type"),
            Self::InvalidShardCount(s) => write!(f, "invalid shard count {}", s),
            Self::ShardingNotAllowed(t) => write!(f, "key type {} cannot be sharded", t),
        }
    }
}

/// 单条校验失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerivationRejection {
    /// 缺少派生路径，整份文件视为结构错误
    MissingPath,
    Invalid {
        path: String,
        reasons: Vec<InvalidReason>,
    },
}

/// 派生记录验证器
pub struct DerivationValidator<'a> {
    registry: &'a dyn ChainRegistry,
    paths: DerivationPathValidator,
}

impl<'a> DerivationValidator<'a> {
    pub fn new(registry: &'a dyn ChainRegistry) -> Self {
        Self {
            registry,
            paths: DerivationPathValidator::new(),
        }
    }

    /// 校验单条记录
    pub fn validate(
        &self,
        raw: &RawDerivation,
    ) -> Result<ValidatedDerivation, DerivationRejection> {
        let path = raw.path().ok_or(DerivationRejection::MissingPath)?;
        let mut reasons = Vec::new();

        match self.paths.check_path(path) {
            PathVerdict::Valid => {}
            PathVerdict::Malformed => reasons.push(InvalidReason::MalformedPath),
            PathVerdict::PasswordProtected => reasons.push(InvalidReason::PasswordPath),
        }

        let chain_id = match raw.chain_id.as_deref() {
            Some(chain) if self.registry.exists(chain) => Some(chain.to_string()),
            other => {
                reasons.push(InvalidReason::UnknownChain(other.map(str::to_string)));
                None
            }
        };

        let key_type = match raw.key_type.as_deref().map(str::parse::<KeyType>) {
            Some(Ok(key_type)) => Some(key_type),
            _ => {
                reasons.push(InvalidReason::UnknownKeyType(raw.key_type.clone()));
                None
            }
        };

        let sharded = match raw.sharded.as_deref() {
            None => None,
            Some(text) => match parse_shard_count(text) {
                Some(count) => Some(count),
                None => {
                    reasons.push(InvalidReason::InvalidShardCount(text.to_string()));
                    None
                }
            },
        };

        if let Some(key_type) = key_type {
            if let Err(e) = self.paths.validate_sharding(key_type, sharded) {
                tracing::debug!(path = %path, error = %e, "Sharding rejected");
                reasons.push(if sharded.is_some() && !key_type.allows_sharding() {
                    InvalidReason::ShardingNotAllowed(key_type)
                } else {
                    InvalidReason::InvalidShardCount(
                        sharded.map(|s| s.to_string()).unwrap_or_default(),
                    )
                });
            }
        }

        match (chain_id, key_type) {
            (Some(chain_id), Some(key_type)) if reasons.is_empty() => Ok(ValidatedDerivation {
                derivation_path: path.to_string(),
                chain_id,
                key_type,
                sharded,
            }),
            _ => Err(DerivationRejection::Invalid {
                path: path.to_string(),
                reasons,
            }),
        }
    }

    /// 校验整批记录
    pub fn validate_all(&self, raws: &[RawDerivation]) -> ImportResult<Vec<ValidatedDerivation>> {
        let mut validated = Vec::with_capacity(raws.len());
        let mut invalid_paths = Vec::new();

        for raw in raws {
            match self.validate(raw) {
                Ok(derivation) => validated.push(derivation),
                Err(DerivationRejection::MissingPath) => {
                    return Err(ImportError::file_structure(format!(
                        "A key of chain {} has no derivation path",
                        raw.chain_id.as_deref().unwrap_or("<unknown>")
                    )));
                }
                Err(DerivationRejection::Invalid { path, reasons }) => {
                    let reasons = reasons
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    tracing::debug!(path = %path, reasons = %reasons, "Derivation rejected");
                    invalid_paths.push(path);
                }
            }
        }

        if invalid_paths.is_empty() {
            return Ok(validated);
        }

        if invalid_paths.iter().all(|p| has_password_marker(p)) {
            Err(ImportError::PasswordPath {
                paths: invalid_paths,
            })
        } else {
            Err(ImportError::InvalidPath {
                paths: invalid_paths,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain_config::{NetworkConfig, NetworkRegistry};

    const CHAIN: &str = "0x01";

    fn registry() -> NetworkRegistry {
        let mut registry = NetworkRegistry::empty();
        registry.register(NetworkConfig::new(CHAIN, "Test", "UNIT", true));
        registry
    }

    fn raw(path: &str, key_type: &str, sharded: Option<&str>) -> RawDerivation {
        RawDerivation {
            derivation_path: Some(path.to_string()),
            chain_id: Some(CHAIN.to_string()),
            sharded: sharded.map(str::to_string),
            key_type: Some(key_type.to_string()),
        }
    }

    #[test]
    fn test_valid_entry() {
        let registry = registry();
        let validator = DerivationValidator::new(&registry);

        let d = validator
            .validate(&raw("//polkadot//staking", "STAKING", Some("10")))
            .unwrap();
        assert_eq!(d.derivation_path, "//polkadot//staking");
        assert_eq!(d.key_type, KeyType::Staking);
        assert_eq!(d.sharded, Some(10));
    }

    #[test]
    fn test_rejection_reasons() {
        let registry = registry();
        let validator = DerivationValidator::new(&registry);

        let unknown_chain = RawDerivation {
            chain_id: Some("0x02".into()),
            ..raw("//a1", "MAIN", None)
        };
        assert_eq!(
            validator.validate(&unknown_chain),
            Err(DerivationRejection::Invalid {
                path: "//a1".into(),
                reasons: vec![InvalidReason::UnknownChain(Some("0x02".into()))],
            })
        );

        match validator.validate(&raw("//a1", "ROOT", None)) {
            Err(DerivationRejection::Invalid { reasons, .. }) => {
                assert_eq!(reasons, vec![InvalidReason::UnknownKeyType(Some("ROOT".into()))])
            }
            other => panic!("unexpected {other:?}"),
        }

        match validator.validate(&raw("//a1", "PUBLIC", Some("5"))) {
            Err(DerivationRejection::Invalid { reasons, .. }) => {
                assert_eq!(reasons, vec![InvalidReason::ShardingNotAllowed(KeyType::Public)])
            }
            other => panic!("unexpected {other:?}"),
        }

        for bad in ["0", "1", "51", "many"] {
            assert!(validator.validate(&raw("//a1", "MAIN", Some(bad))).is_err());
        }
    }

    #[test]
    fn test_missing_path_is_fatal() {
        let registry = registry();
        let validator = DerivationValidator::new(&registry);

        let missing = RawDerivation {
            derivation_path: None,
            ..raw("", "MAIN", None)
        };
        assert_eq!(
            validator.validate(&missing),
            Err(DerivationRejection::MissingPath)
        );

        // 即使前面已有无效条目，缺少路径仍按结构错误处理
        let err = validator
            .validate_all(&[raw("//a1/", "MAIN", None), raw("", "MAIN", None)])
            .unwrap_err();
        assert!(matches!(err, ImportError::FileStructureInvalid { .. }));
    }

    #[test]
    fn test_all_or_nothing() {
        let registry = registry();
        let validator = DerivationValidator::new(&registry);

        let err = validator
            .validate_all(&[
                raw("//polkadot", "MAIN", None),
                raw("//polkadot//staking/", "STAKING", None),
            ])
            .unwrap_err();
        assert_eq!(
            err,
            ImportError::InvalidPath {
                paths: vec!["//polkadot//staking/".into()]
            }
        );
    }

    #[test]
    fn test_password_classification() {
        let registry = registry();
        let validator = DerivationValidator::new(&registry);

        let err = validator
            .validate_all(&[
                raw("//polkadot///pwd", "MAIN", None),
                raw("//kusama///secret", "MAIN", None),
            ])
            .unwrap_err();
        assert_eq!(
            err,
            ImportError::PasswordPath {
                paths: vec!["//polkadot///pwd".into(), "//kusama///secret".into()]
            }
        );

        // 混合了其他原因的无效路径时归为 InvalidPath
        let err = validator
            .validate_all(&[
                raw("//polkadot///pwd", "MAIN", None),
                raw("//kusama/", "MAIN", None),
            ])
            .unwrap_err();
        assert_eq!(
            err,
            ImportError::InvalidPath {
                paths: vec!["//polkadot///pwd".into(), "//kusama/".into()]
            }
        );
    }

    #[test]
    fn test_public_and_hot_never_sharded() {
        let registry = registry();
        let validator = DerivationValidator::new(&registry);

        for key_type in ["PUBLIC", "HOT"] {
            assert!(validator
                .validate(&raw("//a1", key_type, Some("2")))
                .is_err());
            let d = validator.validate(&raw("//a1", key_type, None)).unwrap();
            assert!(d.sharded.is_none());
        }
    }
}
