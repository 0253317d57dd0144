// ==========================================
// 库存合并决策 - 配置层
// ==========================================
// 职责: 运行配置定义、加载、覆写与校验
// 存储: JSON 配置文件（可选）
// ==========================================

pub mod config_manager;
pub mod error;
pub mod run_config;

// 重导出核心配置类型
pub use config_manager::{ConfigManager, ConfigOverrides};
pub use error::ConfigError;
pub use run_config::{RunConfig, DEFAULT_BATCH_WINDOW_DAYS, DEFAULT_RESERVED_STORAGE_TYPE};
