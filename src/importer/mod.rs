// ==========================================
// 库存合并决策 - 导入层
// ==========================================
// 职责: 外部表格导入,生成原始记录
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod inventory_importer;

// 重导出核心类型
pub use data_cleaner::DataCleaner;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use importer_trait::{FileParser, RawRow, RawTable};
pub use inventory_importer::{InventoryImporter, StorageTypeOptions};
