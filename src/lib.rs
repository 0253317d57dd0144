// ==========================================
// 端架库存合并决策 - 核心库
// ==========================================
// 职责: 将端架库位的库存整体移入兼容的开放库位，腾空小库位
// 流程: 导入 → 标准化 → 贪心分配 → 输出组装 → 报表
// 系统定位: 决策支持（只生成移库方案，不执行移库）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录与方案
pub mod domain;

// 引擎层 - 分配规则
pub mod engine;

// 导入层 - 外部表格
pub mod importer;

// 配置层 - 运行配置
pub mod config;

// 报表层 - CSV 输出
pub mod report;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{BatchDate, MovePolicy, SourceBinState};

// 领域实体
pub use domain::{
    Assignment, ConsolidationReport, RawSourceRecord, RawTargetRecord, RunOutcome, RunStats,
    SourceRecord, SummaryEntry, TargetRecord,
};

// 配置
pub use config::{ConfigManager, ConfigOverrides, RunConfig};

// 引擎
pub use engine::{ConsolidationError, ConsolidationPlanner};

// 导入
pub use importer::{ImportError, InventoryImporter};

// 报表
pub use report::{CsvReportWriter, ReportError};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "端架库存合并决策";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
