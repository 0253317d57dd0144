// ==========================================
// 库存合并决策 - 引擎层
// ==========================================
// 职责: 标准化 / 分配 / 输出组装
// 红线: 标准化/分配/组装不做文件 IO（run_files 经导入层读取输入）, 所有未匹配必须输出 reason
// ==========================================

pub mod assignment;
pub mod batch_code;
pub mod capacity_ledger;
pub mod error;
pub mod normalizer;
pub mod orchestrator;
pub mod output_assembler;

// 重导出核心引擎
pub use assignment::{AssignmentEngine, AssignmentOutput, SourceBin, SourceBinOutcome};
pub use batch_code::{parse_batch_code, ParsedBatch};
pub use capacity_ledger::CapacityLedger;
pub use error::{ConsolidationError, ConsolidationResult};
pub use normalizer::{NormalizationStats, NormalizedInventory, Normalizer};
pub use orchestrator::ConsolidationPlanner;
pub use output_assembler::OutputAssembler;
