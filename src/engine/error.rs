// ==========================================
// 库存合并决策 - 引擎层错误类型
// ==========================================
// 说明: 无匹配 / 零分配 不是错误，见 RunOutcome
// ==========================================

use crate::config::ConfigError;
use crate::importer::ImportError;
use thiserror::Error;

/// 合并运行错误（对单次运行均为致命）
#[derive(Error, Debug)]
pub enum ConsolidationError {
    #[error("输入数据错误: {0}")]
    Import(#[from] ImportError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("容量台账中不存在目标库位: {0}")]
    UnknownTargetBin(String),

    #[error("容量约束违反: bin={bin_id}, requested={requested}, available={available}")]
    CapacityViolation {
        bin_id: String,
        requested: i64,
        available: i64,
    },
}

/// Result 类型别名
pub type ConsolidationResult<T> = Result<T, ConsolidationError>;
