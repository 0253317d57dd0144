// ==========================================
// 库存合并决策 - 数据标准化
// ==========================================
// 职责: 清洗 + 派生，产出可分析的端架/开放库位表
// 步骤:
//   1) 开放库位剔除保留存储类型 (VIR)
//   2) 端架按存储类型白名单过滤
//   3) 标识字段 TRIM（大小写敏感，不动内部空白）
//   4) 端架按库位统计去重存储单元数
//   5) 批次号解析（失败 → Unknown）
//   6) 排序: 端架按单元数升序；开放库位按当前单元数降序（稳定排序）
// ==========================================

use crate::config::RunConfig;
use crate::domain::inventory::{RawSourceRecord, RawTargetRecord, SourceRecord, TargetRecord};
use crate::engine::batch_code::parse_batch_code;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// 标准化统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationStats {
    pub source_rows_in: usize,
    pub source_rows_kept: usize,
    pub source_rows_unknown_date: usize,
    pub target_rows_in: usize,
    pub target_rows_reserved_dropped: usize,
    pub target_rows_kept: usize,
    pub target_rows_unknown_date: usize,
}

/// 标准化结果
#[derive(Debug, Clone, Default)]
pub struct NormalizedInventory {
    /// 端架记录（按库位单元数升序）
    pub sources: Vec<SourceRecord>,
    /// 开放库位记录（按当前单元数降序）
    pub targets: Vec<TargetRecord>,
    pub stats: NormalizationStats,
}

pub struct Normalizer<'a> {
    config: &'a RunConfig,
}

impl<'a> Normalizer<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    #[instrument(skip_all, fields(
        source_rows = raw_sources.len(),
        target_rows = raw_targets.len()
    ))]
    pub fn normalize(
        &self,
        raw_sources: Vec<RawSourceRecord>,
        raw_targets: Vec<RawTargetRecord>,
    ) -> NormalizedInventory {
        let mut stats = NormalizationStats {
            source_rows_in: raw_sources.len(),
            target_rows_in: raw_targets.len(),
            ..NormalizationStats::default()
        };

        let sources = self.normalize_sources(raw_sources);
        stats.source_rows_kept = sources.len();
        stats.source_rows_unknown_date = sources.iter().filter(|r| !r.batch_date.is_known()).count();

        let (targets, reserved_dropped) = self.normalize_targets(raw_targets);
        stats.target_rows_reserved_dropped = reserved_dropped;
        stats.target_rows_kept = targets.len();
        stats.target_rows_unknown_date = targets.iter().filter(|r| !r.batch_date.is_known()).count();

        debug!(?stats, "标准化完成");

        NormalizedInventory {
            sources,
            targets,
            stats,
        }
    }

    fn normalize_sources(&self, raw_sources: Vec<RawSourceRecord>) -> Vec<SourceRecord> {
        let trimmed: Vec<RawSourceRecord> = raw_sources
            .into_iter()
            .map(|r| RawSourceRecord {
                bin_id: r.bin_id.trim().to_string(),
                storage_type: r.storage_type.trim().to_string(),
                material_id: r.material_id.trim().to_string(),
                batch_code: r.batch_code.trim().to_string(),
                unit_id: r.unit_id.trim().to_string(),
                ..r
            })
            .filter(|r| self.config.accepts_source_type(&r.storage_type))
            .collect();

        // 每库位去重存储单元数
        let mut units_per_bin: HashMap<&str, HashSet<&str>> = HashMap::new();
        for r in &trimmed {
            units_per_bin
                .entry(r.bin_id.as_str())
                .or_default()
                .insert(r.unit_id.as_str());
        }
        let counts: HashMap<String, usize> = units_per_bin
            .into_iter()
            .map(|(bin, units)| (bin.to_string(), units.len()))
            .collect();

        let mut sources: Vec<SourceRecord> = trimmed
            .into_iter()
            .map(|r| {
                let parsed = parse_batch_code(&r.batch_code);
                let bin_unit_count = counts.get(&r.bin_id).copied().unwrap_or(0);
                SourceRecord {
                    bin_id: r.bin_id,
                    storage_type: r.storage_type,
                    material_id: r.material_id,
                    batch_code: r.batch_code,
                    unit_id: r.unit_id,
                    quantity: r.quantity,
                    batch_prefix: parsed.prefix,
                    batch_date: parsed.date,
                    bin_unit_count,
                }
            })
            .collect();

        // 小库位优先（稳定排序，同数量保持原顺序）
        sources.sort_by_key(|r| r.bin_unit_count);
        sources
    }

    fn normalize_targets(&self, raw_targets: Vec<RawTargetRecord>) -> (Vec<TargetRecord>, usize) {
        let reserved = self.config.reserved_storage_type.trim();
        let total = raw_targets.len();

        let mut targets: Vec<TargetRecord> = raw_targets
            .into_iter()
            .filter(|r| r.storage_type.trim() != reserved)
            .map(|r| {
                let batch_code = r.batch_code.trim().to_string();
                let parsed = parse_batch_code(&batch_code);
                TargetRecord {
                    bin_id: r.bin_id.trim().to_string(),
                    storage_type: r.storage_type.trim().to_string(),
                    material_id: r.material_id.trim().to_string(),
                    batch_code,
                    capacity: r.capacity,
                    unit_count: r.unit_count,
                    available_capacity: r.available_capacity,
                    utilization_pct: r.utilization_pct,
                    batch_prefix: parsed.prefix,
                    batch_date: parsed.date,
                }
            })
            .collect();
        let reserved_dropped = total - targets.len();

        // 当前单元数多的库位优先（稳定排序）
        targets.sort_by_key(|r| std::cmp::Reverse(r.unit_count));
        (targets, reserved_dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::BatchDate;

    fn raw_source(bin: &str, unit: &str, storage_type: &str) -> RawSourceRecord {
        RawSourceRecord {
            bin_id: bin.to_string(),
            storage_type: storage_type.to_string(),
            material_id: " M100 ".to_string(),
            batch_code: " AB12340324 ".to_string(),
            unit_id: unit.to_string(),
            quantity: 1.0,
            row_number: 0,
        }
    }

    fn raw_target(bin: &str, storage_type: &str, unit_count: i64) -> RawTargetRecord {
        RawTargetRecord {
            bin_id: bin.to_string(),
            storage_type: storage_type.to_string(),
            material_id: "M100".to_string(),
            batch_code: "AB1".to_string(),
            capacity: 10,
            unit_count,
            available_capacity: 10 - unit_count,
            utilization_pct: unit_count as f64 * 10.0,
            row_number: 0,
        }
    }

    #[test]
    fn test_unit_count_and_ordering() {
        let config = RunConfig::default();
        let raw = vec![
            raw_source("A2", "SU1", "E01"),
            raw_source("A2", "SU2", "E01"),
            raw_source("A2", " SU2", "E01"), // TRIM 后与 SU2 重复
            raw_source(" A1 ", "SU9", "E01"),
        ];

        let result = Normalizer::new(&config).normalize(raw, vec![]);

        assert_eq!(result.sources.len(), 4);
        assert_eq!(result.sources[0].bin_id, "A1");
        assert_eq!(result.sources[0].bin_unit_count, 1);
        assert!(result.sources[1..].iter().all(|r| r.bin_id == "A2" && r.bin_unit_count == 2));
        assert_eq!(result.sources[0].material_id, "M100");
        assert_eq!(result.sources[0].batch_prefix.as_deref(), Some("AB"));
        assert!(result.sources[0].batch_date.is_known());
    }

    #[test]
    fn test_source_allow_list() {
        let config = RunConfig {
            source_storage_types: Some(["E01".to_string()].into_iter().collect()),
            ..RunConfig::default()
        };
        let raw = vec![raw_source("A1", "SU1", "E01"), raw_source("A2", "SU2", "E02")];

        let result = Normalizer::new(&config).normalize(raw, vec![]);

        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.stats.source_rows_in, 2);
        assert_eq!(result.stats.source_rows_kept, 1);
    }

    #[test]
    fn test_reserved_targets_dropped_and_sorted() {
        let config = RunConfig::default();
        let raw = vec![
            raw_target("B1", "OPN", 2),
            raw_target("B2", " VIR ", 0),
            raw_target("B3", "OPN", 7),
        ];

        let result = Normalizer::new(&config).normalize(vec![], raw);

        let bins: Vec<&str> = result.targets.iter().map(|t| t.bin_id.as_str()).collect();
        assert_eq!(bins, vec!["B3", "B1"]);
        assert_eq!(result.stats.target_rows_reserved_dropped, 1);
        // 短批次号 → 无前缀、日期未知
        assert_eq!(result.targets[0].batch_prefix, None);
        assert_eq!(result.targets[0].batch_date, BatchDate::Unknown);
        assert_eq!(result.stats.target_rows_unknown_date, 2);
    }

    #[test]
    fn test_identifiers_are_case_sensitive() {
        let config = RunConfig::default();
        let raw = vec![raw_source("a1", "SU1", "E01"), raw_source("A1", "SU1", "E01")];

        let result = Normalizer::new(&config).normalize(raw, vec![]);

        assert!(result.sources.iter().all(|r| r.bin_unit_count == 1));
    }
}
