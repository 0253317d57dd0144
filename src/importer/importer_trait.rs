// ==========================================
// 库存合并决策 - 导入 Trait 与原始表结构
// ==========================================
// 职责: 定义文件解析接口（不包含实现）
// ==========================================

use crate::importer::error::ImportResult;
use std::collections::HashMap;
use std::path::Path;

// ==========================================
// RawRow / RawTable - 解析后的原始表
// ==========================================

/// 原始数据行（列名 → 单元格文本）
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    /// 文件中的行号（表头为第 1 行）
    pub row_number: usize,
    pub values: HashMap<String, String>,
}

impl RawRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(|v| v.as_str())
    }
}

/// 原始表（表头 + 数据行）
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser, ExcelParser
pub trait FileParser {
    /// 解析文件为原始表
    ///
    /// # 说明
    /// - 表头与单元格均已 TRIM
    /// - 完全空白的行被跳过
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable>;
}
