// Repository 抽象层
pub mod derivation_repository;

pub use derivation_repository::{
    DerivationRepository, InMemoryDerivationRepository, JsonFileDerivationRepository,
};
