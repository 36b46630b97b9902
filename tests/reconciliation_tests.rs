//! 对账集成测试
//!
//! 以完整导出文档驱动流水线，核对合并结果和统计报告

mod common;

use common::*;
use ironcore_derivations::{
    domain::{derivation::total_key_count, KeyType, MergeOutcome},
    service::ImportOrchestrator,
};
use serde_json::Value;

async fn import(keys: Vec<Value>) -> MergeOutcome {
    let mut orchestrator = ImportOrchestrator::new(test_registry());
    orchestrator.reset_values(Some(ROOT.to_string()), existing_polkadot());

    let text = export_document(ROOT, &[(POLKADOT, keys)]);
    orchestrator.file_uploaded(&text).await.unwrap().outcome
}

#[tokio::test]
async fn test_new_keys_added() {
    let outcome = import(vec![
        key("//polkadot//gov", "GOVERNANCE", None),
        key("//polkadot//staking//other", "STAKING", None),
    ])
    .await;

    assert_eq!(outcome.report.added_keys, 2);
    assert_eq!(outcome.report.duplicated_keys, 0);
    assert_eq!(outcome.report.updated_networks, 1);
    assert_eq!(outcome.merged_derivations.len(), 5);
}

#[tokio::test]
async fn test_duplicate_key_collapsed() {
    let outcome = import(vec![
        key("//polkadot//gov", "GOVERNANCE", None),
        key("//polkadot", "MAIN", None),
    ])
    .await;

    assert_eq!(outcome.report.added_keys, 1);
    assert_eq!(outcome.report.duplicated_keys, 1);
    assert_eq!(
        outcome
            .merged_derivations
            .iter()
            .filter(|d| d.derivation_path == "//polkadot")
            .count(),
        1
    );
}

#[tokio::test]
async fn test_shard_group_grows() {
    let outcome = import(vec![
        key("//polkadot//staking", "STAKING", Some("20")),
        key("//polkadot//some_path", "CUSTOM", None),
    ])
    .await;

    assert_eq!(outcome.report.added_keys, 11);
    assert_eq!(outcome.report.duplicated_keys, 10);

    let sharded: Vec<_> = outcome
        .merged_derivations
        .iter()
        .filter(|d| d.sharded.is_some())
        .collect();
    assert_eq!(sharded.len(), 1);
    assert_eq!(sharded[0].sharded, Some(20));
    assert_eq!(sharded[0].key_type, KeyType::Staking);
}

#[tokio::test]
async fn test_reimport_is_idempotent() {
    let outcome = import(vec![
        key("//polkadot", "MAIN", None),
        key("//polkadot//staking//k", "STAKING", None),
        key("//polkadot//staking", "STAKING", Some("10")),
    ])
    .await;

    assert_eq!(outcome.report.added_keys, 0);
    assert_eq!(
        outcome.report.duplicated_keys,
        total_key_count(&existing_polkadot())
    );
    assert_eq!(outcome.report.updated_networks, 0);
    assert_eq!(outcome.merged_derivations, existing_polkadot());
}

#[tokio::test]
async fn test_type_parsing_is_case_insensitive() {
    let outcome = import(vec![key("//polkadot//gov", "governance", None)]).await;

    assert_eq!(outcome.report.added_keys, 1);
    let added = outcome.merged_derivations.last().unwrap();
    assert_eq!(added.key_type, KeyType::Governance);
}

#[tokio::test]
async fn test_new_chain_counts_as_updated_network() {
    let mut orchestrator = ImportOrchestrator::new(test_registry());
    orchestrator.reset_values(Some(ROOT.to_string()), existing_polkadot());

    let text = export_document(
        ROOT,
        &[
            (POLKADOT, vec![key("//polkadot", "MAIN", None)]),
            (KUSAMA, vec![key("//kusama", "MAIN", None), key("//kusama//s", "STAKING", Some("4"))]),
        ],
    );
    let outcome = orchestrator.file_uploaded(&text).await.unwrap().outcome;

    assert_eq!(outcome.report.added_keys, 5);
    assert_eq!(outcome.report.duplicated_keys, 1);
    assert_eq!(outcome.report.updated_networks, 1);
    assert!(outcome.report.ignored_networks.is_empty());
    assert_eq!(outcome.merged_derivations.len(), 5);
}
