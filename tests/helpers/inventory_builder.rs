// ==========================================
// 测试数据构建器 - 端架 / 开放库位记录
// ==========================================

use endcap_consolidation::domain::inventory::{RawSourceRecord, RawTargetRecord};
use std::fs;
use std::path::{Path, PathBuf};

pub const MATERIAL: &str = "M100";
pub const ENDCAP_TYPE: &str = "E01";
pub const OPEN_TYPE: &str = "OPN";

/// 2024 第 3 周（2024-01-15）
pub const BATCH_2024_W03: &str = "AB12340324";
/// 2024 第 5 周（2024-01-29）
pub const BATCH_2024_W05: &str = "AB56780524";
/// 2023 第 3 周（2023-01-16，与 2024-W03 相差 364 天）
pub const BATCH_2023_W03: &str = "AB00000323";
/// 2023 第 2 周（2023-01-09，与 2024-W03 相差 371 天）
pub const BATCH_2023_W02: &str = "AB00000223";
/// 2022 第 3 周（2022-01-17）
pub const BATCH_2022_W03: &str = "AB00000322";

// ==========================================
// 端架记录
// ==========================================

/// 生成一个端架库位的全部行（每个存储单元一行）
pub fn source_bin(bin_id: &str, units: usize, batch_code: &str) -> Vec<RawSourceRecord> {
    (0..units)
        .map(|i| RawSourceRecord {
            bin_id: bin_id.to_string(),
            storage_type: ENDCAP_TYPE.to_string(),
            material_id: MATERIAL.to_string(),
            batch_code: batch_code.to_string(),
            unit_id: format!("{}-SU{}", bin_id, i + 1),
            quantity: 1.0,
            row_number: i + 2,
        })
        .collect()
}

// ==========================================
// 开放库位构建器
// ==========================================

pub struct TargetBuilder {
    bin_id: String,
    storage_type: String,
    material_id: String,
    batch_code: String,
    capacity: i64,
    available: i64,
    utilization: Option<f64>,
}

impl TargetBuilder {
    pub fn new(bin_id: &str) -> Self {
        Self {
            bin_id: bin_id.to_string(),
            storage_type: OPEN_TYPE.to_string(),
            material_id: MATERIAL.to_string(),
            batch_code: BATCH_2024_W03.to_string(),
            capacity: 10,
            available: 10,
            utilization: None,
        }
    }

    pub fn storage_type(mut self, storage_type: &str) -> Self {
        self.storage_type = storage_type.to_string();
        self
    }

    pub fn material(mut self, material_id: &str) -> Self {
        self.material_id = material_id.to_string();
        self
    }

    pub fn batch(mut self, batch_code: &str) -> Self {
        self.batch_code = batch_code.to_string();
        self
    }

    pub fn capacity(mut self, capacity: i64, available: i64) -> Self {
        self.capacity = capacity;
        self.available = available;
        self
    }

    /// 显式利用率（默认按 capacity / available 计算）
    pub fn utilization(mut self, pct: f64) -> Self {
        self.utilization = Some(pct);
        self
    }

    pub fn build(self) -> RawTargetRecord {
        let unit_count = self.capacity - self.available;
        let utilization_pct = self.utilization.unwrap_or_else(|| {
            if self.capacity > 0 {
                unit_count as f64 / self.capacity as f64 * 100.0
            } else {
                100.0
            }
        });
        RawTargetRecord {
            bin_id: self.bin_id,
            storage_type: self.storage_type,
            material_id: self.material_id,
            batch_code: self.batch_code,
            capacity: self.capacity,
            unit_count,
            available_capacity: self.available,
            utilization_pct,
            row_number: 2,
        }
    }
}

// ==========================================
// 文件辅助
// ==========================================

/// 在目录下写出 CSV 文件，返回路径
pub fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, lines.join("\n")).unwrap();
    path
}
