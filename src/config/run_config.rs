// ==========================================
// 库存合并决策 - 运行配置
// ==========================================
// 职责: 单次运行的显式配置值（无全局状态）
// 包含: 端架/开放库位存储类型白名单、移库策略、批次日期窗口
// ==========================================

use crate::config::error::ConfigError;
use crate::domain::types::MovePolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 默认保留（虚拟）存储类型，永不作为目标库位
pub const DEFAULT_RESERVED_STORAGE_TYPE: &str = "VIR";

/// 默认批次日期窗口（天）
pub const DEFAULT_BATCH_WINDOW_DAYS: i64 = 364;

fn default_reserved_storage_type() -> String {
    DEFAULT_RESERVED_STORAGE_TYPE.to_string()
}

fn default_batch_window_days() -> i64 {
    DEFAULT_BATCH_WINDOW_DAYS
}

/// 运行配置
///
/// 白名单为 `None` 表示不过滤（全部存储类型）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// 端架表参与分析的存储类型
    #[serde(default)]
    pub source_storage_types: Option<BTreeSet<String>>,

    /// 允许移入的开放库位存储类型
    #[serde(default)]
    pub target_storage_types: Option<BTreeSet<String>>,

    /// 移库策略
    #[serde(default)]
    pub move_policy: MovePolicy,

    /// 保留存储类型（如 VIR），直接从目标表剔除
    #[serde(default = "default_reserved_storage_type")]
    pub reserved_storage_type: String,

    /// 源单元批次日期与目标批次日期的最大天数差
    #[serde(default = "default_batch_window_days")]
    pub batch_window_days: i64,

    /// 是否输出剔除已移库位后的端架库存
    #[serde(default)]
    pub emit_remaining_sources: bool,

    /// Excel 工作表名（None = 第一个工作表）
    #[serde(default)]
    pub excel_sheet: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source_storage_types: None,
            target_storage_types: None,
            move_policy: MovePolicy::default(),
            reserved_storage_type: default_reserved_storage_type(),
            batch_window_days: default_batch_window_days(),
            emit_remaining_sources: false,
            excel_sheet: None,
        }
    }
}

impl RunConfig {
    /// 端架存储类型是否在白名单内
    pub fn accepts_source_type(&self, storage_type: &str) -> bool {
        allow_list_contains(self.source_storage_types.as_ref(), storage_type)
    }

    /// 开放库位存储类型是否在移入白名单内
    pub fn accepts_target_type(&self, storage_type: &str) -> bool {
        allow_list_contains(self.target_storage_types.as_ref(), storage_type)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_window_days < 0 {
            return Err(ConfigError::InvalidValue {
                key: "batch_window_days".to_string(),
                value: self.batch_window_days.to_string(),
                message: "批次日期窗口不能为负数".to_string(),
            });
        }

        if self.reserved_storage_type.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "reserved_storage_type".to_string(),
                value: self.reserved_storage_type.clone(),
                message: "保留存储类型不能为空".to_string(),
            });
        }

        for (key, list) in [
            ("source_storage_types", &self.source_storage_types),
            ("target_storage_types", &self.target_storage_types),
        ] {
            if let Some(types) = list {
                if types.is_empty() {
                    return Err(ConfigError::EmptyAllowList(key.to_string()));
                }
            }
        }

        Ok(())
    }
}

fn allow_list_contains(list: Option<&BTreeSet<String>>, storage_type: &str) -> bool {
    match list {
        None => true,
        Some(types) => types.contains(storage_type.trim()),
    }
}
