// ==========================================
// 库存合并决策 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{FileParser, RawRow, RawTable};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// 组装一行；完全空白的行返回 None
fn build_row<I>(headers: &[String], cells: I, row_number: usize) -> Option<RawRow>
where
    I: Iterator<Item = String>,
{
    let mut values = HashMap::new();
    for (col_idx, value) in cells.enumerate() {
        if let Some(header) = headers.get(col_idx) {
            if header.is_empty() {
                continue;
            }
            values.insert(header.clone(), value.trim().to_string());
        }
    }

    if values.values().all(|v| v.is_empty()) {
        return None;
    }

    Some(RawRow { row_number, values })
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 读取表头（去除 UTF-8 BOM）
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let cells = record.iter().map(|v| v.to_string());
            if let Some(row) = build_row(&headers, cells, row_idx + 2) {
                rows.push(row);
            }
        }

        Ok(RawTable { headers, rows })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
#[derive(Default)]
pub struct ExcelParser {
    /// 工作表名（None = 第一个工作表）
    pub sheet: Option<String>,
}

impl ExcelParser {
    pub fn with_sheet(sheet: Option<String>) -> Self {
        Self { sheet }
    }
}

impl FileParser for ExcelParser {
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        let sheet_name = select_sheet(&workbook.sheet_names(), self.sheet.as_deref())?;
        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut data_rows = range.rows();
        let header_row = data_rows
            .next()
            .ok_or_else(|| ImportError::EmptyTable(file_path.display().to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (row_idx, data_row) in data_rows.enumerate() {
            let cells = data_row.iter().map(|cell| cell.to_string());
            if let Some(row) = build_row(&headers, cells, row_idx + 2) {
                rows.push(row);
            }
        }

        Ok(RawTable { headers, rows })
    }
}

/// 选择工作表：指定名称必须存在，未指定取第一个
fn select_sheet(sheet_names: &[String], requested: Option<&str>) -> ImportResult<String> {
    match requested {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError(format!("工作表不存在: {}", name))),
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string())),
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
#[derive(Default)]
pub struct UniversalFileParser {
    pub excel_sheet: Option<String>,
}

impl UniversalFileParser {
    pub fn new(excel_sheet: Option<String>) -> Self {
        Self { excel_sheet }
    }

    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<RawTable> {
        let path = file_path.as_ref();
        match extension_of(path).as_str() {
            "csv" => CsvParser.parse_to_raw_table(path),
            "xlsx" | "xls" => {
                ExcelParser::with_sheet(self.excel_sheet.clone()).parse_to_raw_table(path)
            }
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn temp_csv() -> tempfile::NamedTempFile {
        Builder::new().suffix(".csv").tempfile().unwrap()
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let mut temp_file = temp_csv();
        writeln!(temp_file, "Storage Bin,Storage Unit,Material").unwrap();
        writeln!(temp_file, "A1, SU001 ,M100").unwrap();
        writeln!(temp_file, "A1,SU002,M100").unwrap();

        let table = CsvParser.parse_to_raw_table(temp_file.path()).unwrap();

        assert_eq!(table.headers, vec!["Storage Bin", "Storage Unit", "Material"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].get("Storage Unit"), Some("SU001"));
        assert_eq!(table.rows[0].row_number, 2);
        assert_eq!(table.rows[1].get("Material"), Some("M100"));
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_raw_table(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let mut temp_file = temp_csv();
        writeln!(temp_file, "Storage Bin,Storage Unit").unwrap();
        writeln!(temp_file, "A1,SU001").unwrap();
        writeln!(temp_file, ",").unwrap(); // 空行
        writeln!(temp_file, "A2,SU002").unwrap();

        let table = CsvParser.parse_to_raw_table(temp_file.path()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].row_number, 4);
    }

    #[test]
    fn test_csv_parser_strips_bom() {
        let mut temp_file = temp_csv();
        write!(temp_file, "\u{feff}Storage Bin,Storage Type\nA1,E01\n").unwrap();

        let table = CsvParser.parse_to_raw_table(temp_file.path()).unwrap();
        assert!(table.has_column("Storage Bin"));
    }

    fn sheets(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_select_sheet_defaults_to_first() {
        let names = sheets(&["Sheet1", "Sheet2"]);
        assert_eq!(select_sheet(&names, None).unwrap(), "Sheet1");
        assert_eq!(select_sheet(&names, Some("Sheet2")).unwrap(), "Sheet2");
    }

    #[test]
    fn test_select_sheet_unknown_or_empty() {
        let names = sheets(&["Sheet1"]);
        assert!(matches!(
            select_sheet(&names, Some("Bins")),
            Err(ImportError::ExcelParseError(msg)) if msg.contains("Bins")
        ));
        assert!(matches!(
            select_sheet(&[], None),
            Err(ImportError::ExcelParseError(_))
        ));
    }

    #[test]
    fn test_excel_parser_rejects_non_excel_extension() {
        let temp_file = temp_csv();
        let result = ExcelParser::default().parse_to_raw_table(temp_file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_excel_parser_file_not_found() {
        let result = ExcelParser::default().parse_to_raw_table(Path::new("non_existent.xlsx"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_routes_xlsx_to_excel() {
        // 扩展名为 .xlsx 但内容不是 zip 工作簿
        let mut temp_file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        writeln!(temp_file, "Storage Bin,Storage Type").unwrap();

        let result = UniversalFileParser::new(Some("Sheet1".to_string())).parse(temp_file.path());
        assert!(matches!(result, Err(ImportError::ExcelParseError(_))));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let temp_file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = UniversalFileParser::default().parse(temp_file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
