// ==========================================
// 库存合并决策 - 配置管理器
// ==========================================
// 职责: 配置加载与多级覆写
// 优先级: 命令行覆写 > JSON 配置文件 > 内置默认值
// ==========================================

use crate::config::error::ConfigError;
use crate::config::run_config::RunConfig;
use crate::domain::types::MovePolicy;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 用户配置目录下的子目录名
pub const CONFIG_DIR_NAME: &str = "endcap-consolidation";

/// 默认配置文件名
pub const CONFIG_FILE_NAME: &str = "config.json";

// ==========================================
// ConfigOverrides - 调用方覆写项
// ==========================================
// 空 Vec 表示不覆写（沿用文件/默认值）
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub source_storage_types: Vec<String>,
    pub target_storage_types: Vec<String>,
    pub move_policy: Option<MovePolicy>,
    pub batch_window_days: Option<i64>,
    pub emit_remaining_sources: Option<bool>,
    pub excel_sheet: Option<String>,
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager;

impl ConfigManager {
    /// 默认配置文件路径（{config_dir}/endcap-consolidation/config.json）
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// 加载配置
    ///
    /// # 参数
    /// - `explicit_path`: 显式指定的配置文件（不存在即报错）
    ///
    /// # 说明
    /// 未指定时尝试默认路径，默认路径不存在则使用内置默认值
    pub fn load(explicit_path: Option<&Path>) -> Result<RunConfig, ConfigError> {
        match explicit_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound(path.display().to_string()));
                }
                Self::load_from_file(path)
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::load_from_file(&path),
                _ => {
                    debug!("未找到配置文件，使用内置默认值");
                    Ok(RunConfig::default())
                }
            },
        }
    }

    /// 从 JSON 文件读取配置
    pub fn load_from_file(path: &Path) -> Result<RunConfig, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: RunConfig = serde_json::from_str(&raw)?;
        info!(config_path = %path.display(), "已加载配置文件");
        Ok(config)
    }

    /// 应用覆写并校验
    pub fn resolve(
        mut config: RunConfig,
        overrides: ConfigOverrides,
    ) -> Result<RunConfig, ConfigError> {
        if let Some(types) = to_allow_list(overrides.source_storage_types) {
            config.source_storage_types = Some(types);
        }
        if let Some(types) = to_allow_list(overrides.target_storage_types) {
            config.target_storage_types = Some(types);
        }
        if let Some(policy) = overrides.move_policy {
            config.move_policy = policy;
        }
        if let Some(days) = overrides.batch_window_days {
            config.batch_window_days = days;
        }
        if let Some(flag) = overrides.emit_remaining_sources {
            config.emit_remaining_sources = flag;
        }
        if let Some(sheet) = overrides.excel_sheet {
            config.excel_sheet = Some(sheet);
        }

        config.validate()?;
        Ok(config)
    }

    /// 配置快照（JSON），用于运行日志留痕
    pub fn snapshot(config: &RunConfig) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(config)?)
    }
}

fn to_allow_list(values: Vec<String>) -> Option<BTreeSet<String>> {
    let set: BTreeSet<String> = values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    if set.is_empty() {
        None
    } else {
        Some(set)
    }
}
