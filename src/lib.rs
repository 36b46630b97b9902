//! IronCore 派生导入
//!
//! 解析硬件签名根密钥的密钥导出文件，校验其结构和派生路径，
//! 并与钱包已知的派生记录对账，输出合并结果和统计报告。

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod repository;
pub mod service;
pub mod utils;

// 重新导出常用类型
pub use error::{ImportError, ImportErrorKind, ImportFailure, ImportResult};

// 统一模块导出
pub mod prelude {
    pub use crate::{
        domain::{ChainRegistry, KeyType, MergeOutcome, MergeReport, NetworkRegistry, ValidatedDerivation},
        error::{ImportError, ImportErrorKind, ImportResult},
        repository::{DerivationRepository, InMemoryDerivationRepository, JsonFileDerivationRepository},
        service::{DerivationImportService, ImportOptions, ImportOrchestrator, ImportSuccess},
    };
}
