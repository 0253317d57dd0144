// ==========================================
// 库存合并决策 - 库存领域模型
// ==========================================
// 源表: 端架库位明细 (一行 = 库位内一个存储单元)
// 目标表: 开放库位明细 (一行 = 库位内一个批次，容量字段按库位共享)
// ==========================================

use crate::domain::types::BatchDate;
use serde::{Deserialize, Serialize};

// ==========================================
// RawSourceRecord - 端架原始记录（字段映射后、清洗前）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSourceRecord {
    pub bin_id: String,       // Storage Bin
    pub storage_type: String, // Storage Type
    pub material_id: String,  // Material
    pub batch_code: String,   // Batch
    pub unit_id: String,      // Storage Unit
    pub quantity: f64,        // Total Stock

    // 元信息
    pub row_number: usize,
}

// ==========================================
// RawTargetRecord - 开放库位原始记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTargetRecord {
    pub bin_id: String,           // Storage Bin
    pub storage_type: String,     // Storage Type
    pub material_id: String,      // Material Number
    pub batch_code: String,       // Batch Number
    pub capacity: i64,            // Capacity
    pub unit_count: i64,          // SU Count
    pub available_capacity: i64,  // Available Capacity
    pub utilization_pct: f64,     // Utilization %

    // 元信息
    pub row_number: usize,
}

// ==========================================
// SourceRecord - 清洗 + 派生后的端架记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub bin_id: String,
    pub storage_type: String,
    pub material_id: String,
    pub batch_code: String,
    pub unit_id: String,
    pub quantity: f64,

    // ===== 派生字段 =====
    pub batch_prefix: Option<String>,
    pub batch_date: BatchDate,
    pub bin_unit_count: usize, // 同库位去重后的存储单元数
}

// ==========================================
// TargetRecord - 清洗 + 派生后的开放库位记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub bin_id: String,
    pub storage_type: String,
    pub material_id: String,
    pub batch_code: String,
    pub capacity: i64,
    pub unit_count: i64,
    pub available_capacity: i64,
    pub utilization_pct: f64,

    // ===== 派生字段 =====
    pub batch_prefix: Option<String>,
    pub batch_date: BatchDate,
}

/// 利用率计算: (capacity - available) / capacity × 100
///
/// capacity <= 0 时视为已满（100%），不会被选作目标库位
pub fn utilization_pct(capacity: i64, available_capacity: i64) -> f64 {
    if capacity <= 0 {
        return 100.0;
    }
    (capacity - available_capacity) as f64 / capacity as f64 * 100.0
}
