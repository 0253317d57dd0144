// ==========================================
// 库存合并决策 - CSV 报表写出
// ==========================================
// 输出文件:
//   assignments.csv          移库明细
//   summary.csv              配对汇总
//   open_space_updated.csv   开放库位容量快照（列名与导入表一致，可直接再次导入）
//   endcaps_remaining.csv    剩余端架库存（可选）
// ==========================================

use crate::domain::inventory::{SourceRecord, TargetRecord};
use crate::domain::plan::{Assignment, ConsolidationReport, SummaryEntry};
use crate::report::error::{ReportError, ReportResult};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const ASSIGNMENTS_FILE: &str = "assignments.csv";
pub const SUMMARY_FILE: &str = "summary.csv";
pub const UPDATED_TARGETS_FILE: &str = "open_space_updated.csv";
pub const REMAINING_SOURCES_FILE: &str = "endcaps_remaining.csv";

/// 报表行: 字段顺序与 HEADERS 一致
trait ReportRow: Serialize {
    const HEADERS: &'static [&'static str];
}

// ==========================================
// 行结构
// ==========================================

#[derive(Debug, Serialize)]
struct AssignmentRow<'a> {
    source_bin: &'a str,
    target_bin: &'a str,
    material: &'a str,
    storage_unit: &'a str,
    source_batch: &'a str,
    target_oldest_batch: &'a str,
    target_newest_batch: &'a str,
    quantity: u32,
    remaining_capacity: i64,
}

impl ReportRow for AssignmentRow<'_> {
    const HEADERS: &'static [&'static str] = &[
        "Source Bin",
        "Target Bin",
        "Material",
        "Storage Unit",
        "Source Batch",
        "Target Oldest Batch",
        "Target Newest Batch",
        "Quantity",
        "Remaining Capacity",
    ];
}

impl<'a> From<&'a Assignment> for AssignmentRow<'a> {
    fn from(a: &'a Assignment) -> Self {
        Self {
            source_bin: &a.source_bin,
            target_bin: &a.target_bin,
            material: &a.material_id,
            storage_unit: &a.unit_id,
            source_batch: &a.source_batch,
            target_oldest_batch: &a.target_oldest_batch,
            target_newest_batch: &a.target_newest_batch,
            quantity: a.quantity,
            remaining_capacity: a.remaining_capacity,
        }
    }
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    source_bin: &'a str,
    target_bin: &'a str,
    material: &'a str,
    source_oldest_batch: &'a str,
    source_newest_batch: &'a str,
    target_oldest_batch: &'a str,
    target_newest_batch: &'a str,
    target_available_before: i64,
    target_utilization_before: f64,
    units_moved: usize,
    target_available_after: i64,
}

impl ReportRow for SummaryRow<'_> {
    const HEADERS: &'static [&'static str] = &[
        "Source Bin",
        "Target Bin",
        "Material",
        "Source Oldest Batch",
        "Source Newest Batch",
        "Target Oldest Batch",
        "Target Newest Batch",
        "Target Available Before",
        "Target Utilization % Before",
        "Units Moved",
        "Target Available After",
    ];
}

impl<'a> From<&'a SummaryEntry> for SummaryRow<'a> {
    fn from(s: &'a SummaryEntry) -> Self {
        Self {
            source_bin: &s.source_bin,
            target_bin: &s.target_bin,
            material: &s.material_id,
            source_oldest_batch: &s.source_oldest_batch,
            source_newest_batch: &s.source_newest_batch,
            target_oldest_batch: &s.target_oldest_batch,
            target_newest_batch: &s.target_newest_batch,
            target_available_before: s.target_available_before,
            target_utilization_before: round_pct(s.target_utilization_before),
            units_moved: s.units_moved,
            target_available_after: s.target_available_after,
        }
    }
}

#[derive(Debug, Serialize)]
struct TargetRow<'a> {
    bin_id: &'a str,
    storage_type: &'a str,
    material: &'a str,
    batch: &'a str,
    capacity: i64,
    unit_count: i64,
    available_capacity: i64,
    utilization_pct: f64,
    batch_date: String,
}

impl ReportRow for TargetRow<'_> {
    const HEADERS: &'static [&'static str] = &[
        "Storage Bin",
        "Storage Type",
        "Material Number",
        "Batch Number",
        "Capacity",
        "SU Count",
        "Available Capacity",
        "Utilization %",
        "Batch Date",
    ];
}

impl<'a> From<&'a TargetRecord> for TargetRow<'a> {
    fn from(t: &'a TargetRecord) -> Self {
        Self {
            bin_id: &t.bin_id,
            storage_type: &t.storage_type,
            material: &t.material_id,
            batch: &t.batch_code,
            capacity: t.capacity,
            unit_count: t.unit_count,
            available_capacity: t.available_capacity,
            utilization_pct: round_pct(t.utilization_pct),
            batch_date: t.batch_date.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SourceRow<'a> {
    bin_id: &'a str,
    storage_type: &'a str,
    material: &'a str,
    batch: &'a str,
    unit_id: &'a str,
    quantity: f64,
    bin_unit_count: usize,
    batch_date: String,
}

impl ReportRow for SourceRow<'_> {
    const HEADERS: &'static [&'static str] = &[
        "Storage Bin",
        "Storage Type",
        "Material",
        "Batch",
        "Storage Unit",
        "Total Stock",
        "Total Unique SU Count",
        "Batch Date",
    ];
}

impl<'a> From<&'a SourceRecord> for SourceRow<'a> {
    fn from(s: &'a SourceRecord) -> Self {
        Self {
            bin_id: &s.bin_id,
            storage_type: &s.storage_type,
            material: &s.material_id,
            batch: &s.batch_code,
            unit_id: &s.unit_id,
            quantity: s.quantity,
            bin_unit_count: s.bin_unit_count,
            batch_date: s.batch_date.to_string(),
        }
    }
}

fn round_pct(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ==========================================
// ReportFiles - 已写出的文件路径
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ReportFiles {
    pub assignments: PathBuf,
    pub summary: PathBuf,
    pub updated_targets: PathBuf,
    pub remaining_sources: Option<PathBuf>,
}

// ==========================================
// CsvReportWriter
// ==========================================
pub struct CsvReportWriter;

impl CsvReportWriter {
    /// 写出全部报表到目录（目录不存在时自动创建）
    #[instrument(skip(report), fields(run_id = %report.run_id))]
    pub fn write_all(report: &ConsolidationReport, dir: &Path) -> ReportResult<ReportFiles> {
        fs::create_dir_all(dir).map_err(|e| ReportError::OutputDirError {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;

        let assignments = dir.join(ASSIGNMENTS_FILE);
        write_table(
            &assignments,
            report.assignments.iter().map(AssignmentRow::from),
        )?;

        let summary = dir.join(SUMMARY_FILE);
        write_table(&summary, report.summary.iter().map(SummaryRow::from))?;

        let updated_targets = dir.join(UPDATED_TARGETS_FILE);
        write_table(
            &updated_targets,
            report.updated_targets.iter().map(TargetRow::from),
        )?;

        let remaining_sources = match &report.remaining_sources {
            Some(rows) => {
                let path = dir.join(REMAINING_SOURCES_FILE);
                write_table(&path, rows.iter().map(SourceRow::from))?;
                Some(path)
            }
            None => None,
        };

        info!(dir = %dir.display(), "报表写出完成");

        Ok(ReportFiles {
            assignments,
            summary,
            updated_targets,
            remaining_sources,
        })
    }
}

/// 写出单张表（空表也写表头）
fn write_table<R, I>(path: &Path, rows: I) -> ReportResult<()>
where
    R: ReportRow,
    I: IntoIterator<Item = R>,
{
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(R::HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
