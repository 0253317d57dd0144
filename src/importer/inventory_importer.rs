// ==========================================
// 库存合并决策 - 库存表导入器
// ==========================================
// 流程: 解析文件 → 校验必需列 → 字段映射
// ==========================================

use crate::domain::inventory::{RawSourceRecord, RawTargetRecord};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{
    source_columns, target_columns, FieldMapper, SOURCE_TABLE, TARGET_TABLE,
};
use crate::importer::file_parser::UniversalFileParser;
use std::path::Path;
use tracing::{debug, info, instrument};

/// 两张表的存储类型选项
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageTypeOptions {
    pub source_types: Vec<String>,
    pub target_types: Vec<String>,
}

pub struct InventoryImporter {
    parser: UniversalFileParser,
    mapper: FieldMapper,
}

impl InventoryImporter {
    pub fn new(excel_sheet: Option<String>) -> Self {
        Self {
            parser: UniversalFileParser::new(excel_sheet),
            mapper: FieldMapper::new(),
        }
    }

    /// 导入端架表
    #[instrument(skip(self, file_path), fields(file_path = %file_path.as_ref().display()))]
    pub fn import_sources<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawSourceRecord>> {
        debug!("解析端架文件");
        let table = self.parser.parse(file_path.as_ref())?;
        if table.is_empty() {
            return Err(ImportError::EmptyTable(file_path.as_ref().display().to_string()));
        }

        let records = self.mapper.map_source_table(&table)?;
        info!(rows = records.len(), "端架表导入完成");
        Ok(records)
    }

    /// 导入开放库位表
    #[instrument(skip(self, file_path), fields(file_path = %file_path.as_ref().display()))]
    pub fn import_targets<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawTargetRecord>> {
        debug!("解析开放库位文件");
        let table = self.parser.parse(file_path.as_ref())?;
        if table.is_empty() {
            return Err(ImportError::EmptyTable(file_path.as_ref().display().to_string()));
        }

        let records = self.mapper.map_target_table(&table)?;
        info!(rows = records.len(), "开放库位表导入完成");
        Ok(records)
    }

    /// 读取两张表中出现的存储类型（排序去重）
    pub fn storage_type_options<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source_path: P,
        target_path: Q,
    ) -> ImportResult<StorageTypeOptions> {
        let source_table = self.parser.parse(source_path)?;
        let target_table = self.parser.parse(target_path)?;

        Ok(StorageTypeOptions {
            source_types: self.mapper.distinct_values(
                &source_table,
                SOURCE_TABLE,
                source_columns::STORAGE_TYPE,
            )?,
            target_types: self.mapper.distinct_values(
                &target_table,
                TARGET_TABLE,
                target_columns::STORAGE_TYPE,
            )?,
        })
    }
}
