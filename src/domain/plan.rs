// ==========================================
// 库存合并决策 - 移库方案领域模型
// ==========================================
// 输出: 移库明细 / 配对汇总 / 目标库位容量快照 / 剩余端架库存
// 红线: 具名字段，禁止位置元组
// ==========================================

use crate::domain::inventory::{SourceRecord, TargetRecord};
use crate::domain::types::MovePolicy;
use serde::{Deserialize, Serialize};

// ==========================================
// Assignment - 移库明细（一行 = 一个存储单元）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub source_bin: String,
    pub target_bin: String,
    pub material_id: String,
    pub unit_id: String,
    pub source_batch: String,
    pub target_oldest_batch: String,
    pub target_newest_batch: String,
    pub quantity: u32,
    pub remaining_capacity: i64, // 本次移入后目标库位剩余容量
}

// ==========================================
// SummaryEntry - 源库位 → 目标库位 配对汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub source_bin: String,
    pub target_bin: String,
    pub material_id: String,

    // ===== 批次范围 =====
    pub source_oldest_batch: String,
    pub source_newest_batch: String,
    pub target_oldest_batch: String,
    pub target_newest_batch: String,

    // ===== 容量 =====
    pub target_available_before: i64,
    pub target_utilization_before: f64,
    pub units_moved: usize,
    pub target_available_after: i64,
}

// ==========================================
// RunStats - 运行统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    // 清洗阶段
    pub source_rows_in: usize,
    pub source_rows_kept: usize,
    pub target_rows_in: usize,
    pub target_rows_reserved_dropped: usize,
    pub target_rows_kept: usize,

    // 分配阶段
    pub source_bins_total: usize,
    pub source_bins_committed: usize,
    pub source_bins_unmatched: usize,
    pub source_bins_skipped: usize, // 本轮已接收库存的库位，不再作为源库位
    pub units_moved: usize,
    pub target_bins_touched: usize,
}

// ==========================================
// ConsolidationReport - 单次运行的完整输出
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationReport {
    pub run_id: String,
    pub policy: MovePolicy,
    pub assignments: Vec<Assignment>,
    pub summary: Vec<SummaryEntry>,
    pub updated_targets: Vec<TargetRecord>,
    pub remaining_sources: Option<Vec<SourceRecord>>,
    pub stats: RunStats,
}

// ==========================================
// RunOutcome - 运行结果（成功有数据 / 成功但为空）
// ==========================================
// 致命错误走 Err(ConsolidationError)
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Planned(ConsolidationReport),
    NoAssignments(ConsolidationReport),
}

impl RunOutcome {
    pub fn report(&self) -> &ConsolidationReport {
        match self {
            RunOutcome::Planned(report) | RunOutcome::NoAssignments(report) => report,
        }
    }

    pub fn has_assignments(&self) -> bool {
        matches!(self, RunOutcome::Planned(_))
    }
}
