//! 派生记录对账服务
//!
//! 将已知派生与新导入的派生按链合并，并统计新增、重复和更新的网络数量。
//!
//! # 合并规则
//! ```text
//! 同链同路径不存在                      -> 新增，addedKeys += d.sharded ?? 1
//! 同路径但分片有无不一致 (XOR)          -> 新增
//! 同路径同分片形态                      -> 重复，duplicatedKeys += m.sharded ?? 1
//! 两者均分片且 d.sharded > m.sharded    -> 额外 addedKeys += 差值，合并结果取 d.sharded
//! ```

use std::collections::HashSet;

use crate::domain::derivation::{MergeOutcome, MergeReport, ValidatedDerivation};

/// 单链对账统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainMergeStats {
    pub chain_id: String,
    pub added_keys: u64,
    pub duplicated_keys: u64,
    pub upgraded_entries: u64,
    /// 新增步骤是否产生了密钥（不含分片扩容）
    pub added_entries: bool,
}

/// 单条导入记录的分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryDecision {
    New,
    Duplicate { index: usize },
}

/// 对账引擎
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self
    }

    /// 执行对账
    ///
    /// `ignored_networks` 始终为空，由编排器在跳过对账时填写。
    pub fn reconcile(
        &self,
        existing: &[ValidatedDerivation],
        imported: &[ValidatedDerivation],
    ) -> MergeOutcome {
        let mut merged = existing.to_vec();
        let mut report = MergeReport::default();

        for chain_id in chains_in_order(imported) {
            let stats = Self::reconcile_chain(&mut merged, chain_id, imported);

            tracing::debug!(
                chain_id = %stats.chain_id,
                added_keys = stats.added_keys,
                duplicated_keys = stats.duplicated_keys,
                upgraded_entries = stats.upgraded_entries,
                "Chain reconciled"
            );

            report.added_keys += stats.added_keys;
            report.duplicated_keys += stats.duplicated_keys;
            if stats.added_entries {
                report.updated_networks += 1;
            }
        }

        tracing::info!(
            existing = existing.len(),
            imported = imported.len(),
            merged = merged.len(),
            added_keys = report.added_keys,
            duplicated_keys = report.duplicated_keys,
            updated_networks = report.updated_networks,
            "Reconciliation completed"
        );

        MergeOutcome {
            merged_derivations: merged,
            report,
        }
    }

    /// 对单条链执行合并，直接修改 `merged`
    fn reconcile_chain(
        merged: &mut Vec<ValidatedDerivation>,
        chain_id: &str,
        imported: &[ValidatedDerivation],
    ) -> ChainMergeStats {
        let mut stats = ChainMergeStats {
            chain_id: chain_id.to_string(),
            ..Default::default()
        };

        for d in imported.iter().filter(|d| d.chain_id == chain_id) {
            match classify(merged, d) {
                EntryDecision::New => {
                    stats.added_keys += d.key_count();
                    stats.added_entries = true;
                    merged.push(d.clone());
                }
                EntryDecision::Duplicate { index } => {
                    let m = &mut merged[index];
                    stats.duplicated_keys += m.key_count();

                    if let (Some(current), Some(incoming)) = (m.sharded, d.sharded) {
                        if incoming > current {
                            stats.added_keys += u64::from(incoming - current);
                            stats.upgraded_entries += 1;
                            m.sharded = Some(incoming);
                        }
                    }
                }
            }
        }

        stats
    }
}

/// 导入中出现的链，按首次出现顺序
fn chains_in_order(imported: &[ValidatedDerivation]) -> Vec<&str> {
    let mut seen = HashSet::new();
    imported
        .iter()
        .map(|d| d.chain_id.as_str())
        .filter(|chain| seen.insert(*chain))
        .collect()
}

/// 在当前合并列表中查找同链同路径的记录
///
/// 优先匹配分片形态一致的记录；只有形态不一致的记录时按新增处理。
fn classify(merged: &[ValidatedDerivation], d: &ValidatedDerivation) -> EntryDecision {
    merged
        .iter()
        .position(|m| {
            m.chain_id == d.chain_id
                && m.derivation_path == d.derivation_path
                && m.is_sharded() == d.is_sharded()
        })
        .map(|index| EntryDecision::Duplicate { index })
        .unwrap_or(EntryDecision::New)
}
