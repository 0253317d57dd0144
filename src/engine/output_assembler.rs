// ==========================================
// 库存合并决策 - 输出组装
// ==========================================
// 输出:
//   1) 移库明细（一行 = 一个存储单元）
//   2) 配对汇总（一行 = 一个 源库位→目标库位 配对）
//   3) 开放库位容量快照（受影响库位重算，其余原样透传）
//   4) 剩余端架库存（可选，剔除已整体移出的库位）
// ==========================================

use crate::config::RunConfig;
use crate::domain::inventory::{utilization_pct, TargetRecord};
use crate::domain::plan::{ConsolidationReport, RunStats};
use crate::domain::types::SourceBinState;
use crate::engine::assignment::{AssignmentOutput, REASON_RECEIVED_STOCK};
use crate::engine::capacity_ledger::CapacityLedger;
use crate::engine::normalizer::NormalizedInventory;

pub struct OutputAssembler<'a> {
    config: &'a RunConfig,
}

impl<'a> OutputAssembler<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    pub fn assemble(
        &self,
        run_id: String,
        inventory: NormalizedInventory,
        output: AssignmentOutput,
    ) -> ConsolidationReport {
        let stats = RunStats {
            source_rows_in: inventory.stats.source_rows_in,
            source_rows_kept: inventory.stats.source_rows_kept,
            target_rows_in: inventory.stats.target_rows_in,
            target_rows_reserved_dropped: inventory.stats.target_rows_reserved_dropped,
            target_rows_kept: inventory.stats.target_rows_kept,
            source_bins_total: output.outcomes.len(),
            source_bins_committed: output.count_state(SourceBinState::Committed),
            source_bins_unmatched: output
                .outcomes
                .iter()
                .filter(|o| {
                    o.state == SourceBinState::Exhausted && o.reason != REASON_RECEIVED_STOCK
                })
                .count(),
            source_bins_skipped: output
                .outcomes
                .iter()
                .filter(|o| o.reason == REASON_RECEIVED_STOCK)
                .count(),
            units_moved: output.assignments.len(),
            target_bins_touched: output.ledger.touched_count(),
        };

        let updated_targets = inventory
            .targets
            .into_iter()
            .map(|target| apply_ledger(target, &output.ledger))
            .collect();

        let remaining_sources = if self.config.emit_remaining_sources {
            Some(
                inventory
                    .sources
                    .into_iter()
                    .filter(|r| !output.consumed_bins.contains(&r.bin_id))
                    .collect(),
            )
        } else {
            None
        };

        ConsolidationReport {
            run_id,
            policy: self.config.move_policy,
            assignments: output.assignments,
            summary: output.summary,
            updated_targets,
            remaining_sources,
            stats,
        }
    }
}

/// 按台账重算受影响库位的容量字段
fn apply_ledger(target: TargetRecord, ledger: &CapacityLedger) -> TargetRecord {
    if !ledger.is_touched(&target.bin_id) {
        return target;
    }

    match ledger.available(&target.bin_id) {
        Some(available) => TargetRecord {
            available_capacity: available,
            unit_count: target.capacity - available,
            utilization_pct: utilization_pct(target.capacity, available),
            ..target
        },
        None => target,
    }
}
