//! Domain 模块
//!
//! 导入文件结构、派生记录模型及其校验规则

pub mod chain_config;
pub mod derivation;
pub mod derivation_extractor;
pub mod derivation_path_validator;
pub mod derivation_validator;
pub mod import_file;

// 重新导出常用类型
pub use chain_config::{ChainRegistry, NetworkConfig, NetworkRegistry};
pub use derivation::{KeyType, MergeOutcome, MergeReport, RawDerivation, ValidatedDerivation};
pub use derivation_extractor::{extract_derivations, Extraction};
pub use derivation_path_validator::DerivationPathValidator;
pub use derivation_validator::{DerivationRejection, DerivationValidator, InvalidReason};
pub use import_file::{FileStructureValidator, ImportDocument};
