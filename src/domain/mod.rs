// ==========================================
// 库存合并决策 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含文件读写逻辑,不含引擎逻辑
// ==========================================

pub mod inventory;
pub mod plan;
pub mod types;

// 重导出核心类型
pub use inventory::{
    utilization_pct, RawSourceRecord, RawTargetRecord, SourceRecord, TargetRecord,
};
pub use plan::{Assignment, ConsolidationReport, RunOutcome, RunStats, SummaryEntry};
pub use types::{BatchDate, MovePolicy, SourceBinState};
