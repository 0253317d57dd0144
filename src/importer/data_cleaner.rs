// ==========================================
// 库存合并决策 - 数据清洗器实现
// ==========================================
// 职责: TRIM / 数值解析（容错 Excel 数值文本）
// 说明: 标识字段大小写敏感，不做 UPPER
// ==========================================

use crate::importer::error::{ImportError, ImportResult};

pub struct DataCleaner;

impl DataCleaner {
    /// 清洗标识文本（仅去除首尾空白，不改大小写、不动内部空白）
    pub fn clean_text(&self, value: &str) -> String {
        value.trim().to_string()
    }

    /// 空白视为缺失
    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 解析浮点数（允许千分位逗号、末尾 %）
    pub fn parse_f64(&self, value: &str, field: &str, row: usize) -> ImportResult<f64> {
        let cleaned = value.trim().trim_end_matches('%').replace(',', "");
        cleaned
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ImportError::TypeConversionError {
                row,
                field: field.to_string(),
                message: format!("无法解析为数值: {}", value),
            })
    }

    /// 解析整数（Excel 常把整数存为 "5.0"，小数部分必须为 0）
    pub fn parse_i64(&self, value: &str, field: &str, row: usize) -> ImportResult<i64> {
        let cleaned = value.trim().replace(',', "");
        if let Ok(v) = cleaned.parse::<i64>() {
            return Ok(v);
        }

        match cleaned.parse::<f64>() {
            Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
            _ => Err(ImportError::TypeConversionError {
                row,
                field: field.to_string(),
                message: format!("无法解析为整数: {}", value),
            }),
        }
    }
}
