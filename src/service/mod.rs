pub mod derivation_import_service;
pub mod import_orchestrator;
pub mod import_state_machine; // 导入流水线状态机
pub mod reconciliation_service;

pub use derivation_import_service::{DerivationImportService, ImportOptions, ServiceError};
pub use import_orchestrator::{export_text, ImportContext, ImportOrchestrator, ImportSuccess};
pub use import_state_machine::{ImportState, ImportStateMachine};
pub use reconciliation_service::ReconciliationEngine;
