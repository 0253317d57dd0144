// ==========================================
// 库存合并决策 - 报表层错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("输出目录创建失败: {path}: {message}")]
    OutputDirError { path: String, message: String },

    #[error("文件写入失败: {0}")]
    WriteError(String),

    #[error("CSV 序列化失败: {0}")]
    CsvError(String),
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::WriteError(err.to_string())
    }
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        ReportError::CsvError(err.to_string())
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
