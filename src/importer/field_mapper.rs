// ==========================================
// 库存合并决策 - 字段映射器实现
// ==========================================
// 职责: 源列名 → 标准字段映射 + 类型转换
// 规则: 必需列缺失为致命错误；数值列空白按 0 处理（利用率空白按 100%）
// ==========================================

use crate::domain::inventory::{RawSourceRecord, RawTargetRecord};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{RawRow, RawTable};
use std::collections::BTreeSet;

// ==========================================
// 列定义（标准名 + 别名）
// ==========================================

/// 单个标准列及其可接受的列名别名（首项为标准列名）
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub aliases: &'static [&'static str],
}

impl ColumnSpec {
    pub fn canonical(&self) -> &'static str {
        self.aliases[0]
    }
}

pub mod source_columns {
    use super::ColumnSpec;

    pub const BIN: ColumnSpec = ColumnSpec { aliases: &["Storage Bin"] };
    pub const STORAGE_TYPE: ColumnSpec = ColumnSpec { aliases: &["Storage Type"] };
    pub const MATERIAL: ColumnSpec = ColumnSpec {
        aliases: &["Material", "Material Number"],
    };
    pub const BATCH: ColumnSpec = ColumnSpec {
        aliases: &["Batch", "Batch Number"],
    };
    pub const UNIT: ColumnSpec = ColumnSpec {
        aliases: &["Storage Unit", "SU"],
    };
    pub const QUANTITY: ColumnSpec = ColumnSpec {
        aliases: &["Total Stock", "Available stock", "Quantity"],
    };
}

pub mod target_columns {
    use super::ColumnSpec;

    pub const BIN: ColumnSpec = ColumnSpec { aliases: &["Storage Bin"] };
    pub const STORAGE_TYPE: ColumnSpec = ColumnSpec { aliases: &["Storage Type"] };
    pub const MATERIAL: ColumnSpec = ColumnSpec {
        aliases: &["Material Number", "Material"],
    };
    pub const BATCH: ColumnSpec = ColumnSpec {
        aliases: &["Batch Number", "Batch"],
    };
    pub const CAPACITY: ColumnSpec = ColumnSpec {
        aliases: &["Capacity", "Max SU", "SU Capacity"],
    };
    pub const UNIT_COUNT: ColumnSpec = ColumnSpec { aliases: &["SU Count"] };
    pub const AVAILABLE: ColumnSpec = ColumnSpec {
        aliases: &["Available Capacity", "Available SU"],
    };
    pub const UTILIZATION: ColumnSpec = ColumnSpec {
        aliases: &["Utilization %", "Utilization"],
    };
}

pub const SOURCE_TABLE: &str = "endcaps";
pub const TARGET_TABLE: &str = "open_space";

pub struct FieldMapper {
    cleaner: DataCleaner,
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldMapper {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }

    /// 在表头中定位列（按别名顺序），缺失即报错
    pub fn resolve_column(
        &self,
        table: &RawTable,
        table_name: &str,
        spec: ColumnSpec,
    ) -> ImportResult<&'static str> {
        spec.aliases
            .iter()
            .copied()
            .find(|alias| table.has_column(alias))
            .ok_or_else(|| ImportError::MissingColumn {
                table: table_name.to_string(),
                column: spec.canonical().to_string(),
            })
    }

    // ==========================================
    // 端架表映射
    // ==========================================

    pub fn map_source_table(&self, table: &RawTable) -> ImportResult<Vec<RawSourceRecord>> {
        use source_columns::*;

        let bin = self.resolve_column(table, SOURCE_TABLE, BIN)?;
        let storage_type = self.resolve_column(table, SOURCE_TABLE, STORAGE_TYPE)?;
        let material = self.resolve_column(table, SOURCE_TABLE, MATERIAL)?;
        let batch = self.resolve_column(table, SOURCE_TABLE, BATCH)?;
        let unit = self.resolve_column(table, SOURCE_TABLE, UNIT)?;
        let quantity = self.resolve_column(table, SOURCE_TABLE, QUANTITY)?;

        table
            .rows
            .iter()
            .map(|row| -> ImportResult<RawSourceRecord> {
                Ok(RawSourceRecord {
                    bin_id: self.get_string(row, bin),
                    storage_type: self.get_string(row, storage_type),
                    material_id: self.get_string(row, material),
                    batch_code: self.get_string(row, batch),
                    unit_id: self.get_string(row, unit),
                    quantity: self.parse_f64_or(row, quantity, 0.0)?,
                    row_number: row.row_number,
                })
            })
            .collect()
    }

    // ==========================================
    // 开放库位表映射
    // ==========================================

    pub fn map_target_table(&self, table: &RawTable) -> ImportResult<Vec<RawTargetRecord>> {
        use target_columns::*;

        let bin = self.resolve_column(table, TARGET_TABLE, BIN)?;
        let storage_type = self.resolve_column(table, TARGET_TABLE, STORAGE_TYPE)?;
        let material = self.resolve_column(table, TARGET_TABLE, MATERIAL)?;
        let batch = self.resolve_column(table, TARGET_TABLE, BATCH)?;
        let capacity = self.resolve_column(table, TARGET_TABLE, CAPACITY)?;
        let unit_count = self.resolve_column(table, TARGET_TABLE, UNIT_COUNT)?;
        let available = self.resolve_column(table, TARGET_TABLE, AVAILABLE)?;
        let utilization = self.resolve_column(table, TARGET_TABLE, UTILIZATION)?;

        table
            .rows
            .iter()
            .map(|row| -> ImportResult<RawTargetRecord> {
                Ok(RawTargetRecord {
                    bin_id: self.get_string(row, bin),
                    storage_type: self.get_string(row, storage_type),
                    material_id: self.get_string(row, material),
                    batch_code: self.get_string(row, batch),
                    capacity: self.parse_i64_or(row, capacity, 0)?,
                    unit_count: self.parse_i64_or(row, unit_count, 0)?,
                    available_capacity: self.parse_i64_or(row, available, 0)?,
                    // 利用率缺失视为满载，不参与分配
                    utilization_pct: self.parse_f64_or(row, utilization, 100.0)?,
                    row_number: row.row_number,
                })
            })
            .collect()
    }

    /// 列出某列的去重取值（排序），用于存储类型选项
    pub fn distinct_values(
        &self,
        table: &RawTable,
        table_name: &str,
        spec: ColumnSpec,
    ) -> ImportResult<Vec<String>> {
        let column = self.resolve_column(table, table_name, spec)?;
        let values: BTreeSet<String> = table
            .rows
            .iter()
            .filter_map(|row| self.cleaner.normalize_null(row.get(column)))
            .collect();
        Ok(values.into_iter().collect())
    }

    fn get_string(&self, row: &RawRow, column: &str) -> String {
        row.get(column)
            .map(|v| self.cleaner.clean_text(v))
            .unwrap_or_default()
    }

    fn parse_f64_or(&self, row: &RawRow, column: &str, default: f64) -> ImportResult<f64> {
        match self.cleaner.normalize_null(row.get(column)) {
            None => Ok(default),
            Some(value) => self.cleaner.parse_f64(&value, column, row.row_number),
        }
    }

    fn parse_i64_or(&self, row: &RawRow, column: &str, default: i64) -> ImportResult<i64> {
        match self.cleaner.normalize_null(row.get(column)) {
            None => Ok(default),
            Some(value) => self.cleaner.parse_i64(&value, column, row.row_number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let rows = rows
            .iter()
            .enumerate()
            .map(|(idx, cells)| RawRow {
                row_number: idx + 2,
                values: headers
                    .iter()
                    .cloned()
                    .zip(cells.iter().map(|c| c.to_string()))
                    .collect::<HashMap<_, _>>(),
            })
            .collect();
        RawTable { headers, rows }
    }

    #[test]
    fn test_map_source_table() {
        let raw = table(
            &["Storage Bin", "Storage Type", "Material", "Batch", "Storage Unit", "Total Stock"],
            &[&["A1", "E01", "M100", "AB00000324", "SU1", "12"]],
        );

        let records = FieldMapper::new().map_source_table(&raw).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].bin_id, "A1");
        assert_eq!(records[0].unit_id, "SU1");
        assert_eq!(records[0].quantity, 12.0);
        assert_eq!(records[0].row_number, 2);
    }

    #[test]
    fn test_map_source_table_missing_column() {
        let raw = table(&["Storage Bin", "Storage Type"], &[&["A1", "E01"]]);

        let result = FieldMapper::new().map_source_table(&raw);

        match result {
            Err(ImportError::MissingColumn { table, column }) => {
                assert_eq!(table, SOURCE_TABLE);
                assert_eq!(column, "Material");
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_map_target_table_with_aliases() {
        let raw = table(
            &[
                "Storage Bin",
                "Storage Type",
                "Material",
                "Batch Number",
                "Max SU",
                "SU Count",
                "Available SU",
                "Utilization %",
            ],
            &[&["B1", "OPN", "M100", "AB00000324", "5.0", "2", "3", "40"]],
        );

        let records = FieldMapper::new().map_target_table(&raw).unwrap();

        assert_eq!(records[0].material_id, "M100");
        assert_eq!(records[0].capacity, 5);
        assert_eq!(records[0].available_capacity, 3);
        assert_eq!(records[0].utilization_pct, 40.0);
    }

    #[test]
    fn test_map_target_table_blank_numbers() {
        let raw = table(
            &[
                "Storage Bin",
                "Storage Type",
                "Material Number",
                "Batch Number",
                "Capacity",
                "SU Count",
                "Available Capacity",
                "Utilization %",
            ],
            &[&["B1", "OPN", "M100", "AB00000324", "", "", "", ""]],
        );

        let records = FieldMapper::new().map_target_table(&raw).unwrap();

        assert_eq!(records[0].available_capacity, 0);
        assert_eq!(records[0].utilization_pct, 100.0);
    }

    #[test]
    fn test_map_target_table_invalid_number() {
        let raw = table(
            &[
                "Storage Bin",
                "Storage Type",
                "Material Number",
                "Batch Number",
                "Capacity",
                "SU Count",
                "Available Capacity",
                "Utilization %",
            ],
            &[&["B1", "OPN", "M100", "AB00000324", "five", "2", "3", "40"]],
        );

        let result = FieldMapper::new().map_target_table(&raw);
        assert!(matches!(
            result,
            Err(ImportError::TypeConversionError { row: 2, .. })
        ));
    }

    #[test]
    fn test_distinct_values_sorted() {
        let raw = table(
            &["Storage Type"],
            &[&["E02"], &["E01"], &["E02"], &[" "]],
        );

        let values = FieldMapper::new()
            .distinct_values(&raw, SOURCE_TABLE, source_columns::STORAGE_TYPE)
            .unwrap();

        assert_eq!(values, vec!["E01".to_string(), "E02".to_string()]);
    }
}
