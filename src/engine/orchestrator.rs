// ==========================================
// 库存合并决策 - 引擎编排器
// ==========================================
// 流程: 标准化 → 分配 → 输出组装
// 红线: 单线程同步执行，全部成功或整体失败，不保留跨运行状态
// ==========================================

use crate::config::{ConfigManager, RunConfig};
use crate::domain::inventory::{RawSourceRecord, RawTargetRecord};
use crate::domain::plan::RunOutcome;
use crate::engine::assignment::AssignmentEngine;
use crate::engine::error::ConsolidationResult;
use crate::engine::normalizer::Normalizer;
use crate::engine::output_assembler::OutputAssembler;
use crate::importer::InventoryImporter;
use std::path::Path;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ConsolidationPlanner - 合并方案编排器
// ==========================================
pub struct ConsolidationPlanner {
    config: RunConfig,
}

impl ConsolidationPlanner {
    /// 创建编排器（配置在运行时校验）
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// 从文件运行（端架表 + 开放库位表）
    pub fn run_files<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source_path: P,
        target_path: Q,
    ) -> ConsolidationResult<RunOutcome> {
        self.config.validate()?;

        let importer = InventoryImporter::new(self.config.excel_sheet.clone());
        let raw_sources = importer.import_sources(source_path)?;
        let raw_targets = importer.import_targets(target_path)?;

        self.run(raw_sources, raw_targets)
    }

    /// 对已映射的原始记录运行完整流程
    #[instrument(skip_all, fields(run_id))]
    pub fn run(
        &self,
        raw_sources: Vec<RawSourceRecord>,
        raw_targets: Vec<RawTargetRecord>,
    ) -> ConsolidationResult<RunOutcome> {
        self.config.validate()?;

        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());
        info!(
            policy = %self.config.move_policy,
            source_rows = raw_sources.len(),
            target_rows = raw_targets.len(),
            "开始生成合并方案"
        );
        if let Ok(snapshot) = ConfigManager::snapshot(&self.config) {
            debug!(config = %snapshot, "运行配置");
        }

        // === 步骤 1: 标准化 ===
        let inventory = Normalizer::new(&self.config).normalize(raw_sources, raw_targets);

        // === 步骤 2: 分配 ===
        let output = AssignmentEngine::new(&self.config)
            .assign(&inventory.sources, &inventory.targets)?;

        // === 步骤 3: 输出组装 ===
        let report = OutputAssembler::new(&self.config).assemble(run_id, inventory, output);

        let stats = &report.stats;
        info!(
            source_bins = stats.source_bins_total,
            committed = stats.source_bins_committed,
            unmatched = stats.source_bins_unmatched,
            units_moved = stats.units_moved,
            targets_touched = stats.target_bins_touched,
            "合并方案生成完成"
        );
        if stats.source_bins_unmatched > 0 {
            info!("{} 个端架库位未找到可用目标库位", stats.source_bins_unmatched);
        }

        if report.assignments.is_empty() {
            warn!("未找到任何可执行的移库分配");
            Ok(RunOutcome::NoAssignments(report))
        } else {
            Ok(RunOutcome::Planned(report))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::ConsolidationError;

    #[test]
    fn test_empty_inputs_yield_no_assignments() {
        let planner = ConsolidationPlanner::new(RunConfig::default());
        let outcome = planner.run(vec![], vec![]).unwrap();

        assert!(!outcome.has_assignments());
        assert_eq!(outcome.report().stats.source_bins_total, 0);
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let planner = ConsolidationPlanner::new(RunConfig {
            batch_window_days: -1,
            ..RunConfig::default()
        });
        let result = planner.run(vec![], vec![]);

        assert!(matches!(result, Err(ConsolidationError::Config(_))));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let planner = ConsolidationPlanner::new(RunConfig::default());
        let result = planner.run_files("missing_endcaps.csv", "missing_open_space.csv");

        assert!(matches!(result, Err(ConsolidationError::Import(_))));
    }
}
