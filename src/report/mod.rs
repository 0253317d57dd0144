// ==========================================
// 库存合并决策 - 报表层
// ==========================================
// 职责: 将合并方案写出为 CSV 表格
// ==========================================

pub mod csv_writer;
pub mod error;

pub use csv_writer::{CsvReportWriter, ReportFiles};
pub use error::{ReportError, ReportResult};
