// ==========================================
// 库存合并决策 - 目标库位容量台账
// ==========================================
// 职责: 按目标库位记录剩余容量，由分配引擎独占修改
// 红线: 剩余容量永不为负
// ==========================================

use crate::domain::inventory::{utilization_pct, TargetRecord};
use crate::engine::error::{ConsolidationError, ConsolidationResult};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
struct LedgerEntry {
    capacity: i64,
    initial_available: i64,
    initial_utilization_pct: f64,
    available: i64,
}

/// 容量台账（target bin id → 剩余容量）
///
/// 同一库位多行时以首行（标准化排序后）的容量字段为准
#[derive(Debug, Clone, Default)]
pub struct CapacityLedger {
    entries: HashMap<String, LedgerEntry>,
}

impl CapacityLedger {
    pub fn from_targets(targets: &[TargetRecord]) -> Self {
        let mut entries = HashMap::new();
        for target in targets {
            entries
                .entry(target.bin_id.clone())
                .or_insert_with(|| LedgerEntry {
                    capacity: target.capacity,
                    initial_available: target.available_capacity,
                    initial_utilization_pct: target.utilization_pct,
                    available: target.available_capacity,
                });
        }
        Self { entries }
    }

    /// 是否仍可接收库存（剩余容量 > 0 且当前利用率 < 100%）
    pub fn has_room(&self, bin_id: &str) -> bool {
        match (self.available(bin_id), self.utilization_pct(bin_id)) {
            (Some(available), Some(pct)) => available > 0 && pct < 100.0,
            _ => false,
        }
    }

    /// 当前剩余容量
    pub fn available(&self, bin_id: &str) -> Option<i64> {
        self.entries.get(bin_id).map(|e| e.available)
    }

    /// 运行开始时的剩余容量与利用率
    pub fn initial(&self, bin_id: &str) -> Option<(i64, f64)> {
        self.entries
            .get(bin_id)
            .map(|e| (e.initial_available, e.initial_utilization_pct))
    }

    /// 当前利用率（未变动的库位沿用导入值，已接收库存的按台账重算）
    pub fn utilization_pct(&self, bin_id: &str) -> Option<f64> {
        self.entries.get(bin_id).map(|e| {
            if e.available == e.initial_available {
                e.initial_utilization_pct
            } else {
                utilization_pct(e.capacity, e.available)
            }
        })
    }

    /// 本轮是否已接收库存
    pub fn is_touched(&self, bin_id: &str) -> bool {
        self.entries
            .get(bin_id)
            .map(|e| e.available != e.initial_available)
            .unwrap_or(false)
    }

    pub fn touched_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.available != e.initial_available)
            .count()
    }

    /// 扣减容量，返回扣减后剩余容量
    pub fn commit(&mut self, bin_id: &str, quantity: i64) -> ConsolidationResult<i64> {
        let entry = self
            .entries
            .get_mut(bin_id)
            .ok_or_else(|| ConsolidationError::UnknownTargetBin(bin_id.to_string()))?;

        if quantity < 0 || quantity > entry.available {
            return Err(ConsolidationError::CapacityViolation {
                bin_id: bin_id.to_string(),
                requested: quantity,
                available: entry.available,
            });
        }

        entry.available -= quantity;
        Ok(entry.available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::BatchDate;

    fn target(bin: &str, capacity: i64, available: i64) -> TargetRecord {
        TargetRecord {
            bin_id: bin.to_string(),
            storage_type: "OPN".to_string(),
            material_id: "M100".to_string(),
            batch_code: "AB12340324".to_string(),
            capacity,
            unit_count: capacity - available,
            available_capacity: available,
            utilization_pct: utilization_pct(capacity, available),
            batch_prefix: Some("AB".to_string()),
            batch_date: BatchDate::Unknown,
        }
    }

    #[test]
    fn test_commit_reduces_available() {
        let mut ledger = CapacityLedger::from_targets(&[target("B1", 5, 3)]);

        assert_eq!(ledger.commit("B1", 2).unwrap(), 1);
        assert_eq!(ledger.available("B1"), Some(1));
        assert!(ledger.is_touched("B1"));
        assert_eq!(ledger.initial("B1"), Some((3, 40.0)));
        assert_eq!(ledger.utilization_pct("B1"), Some(80.0));
    }

    #[test]
    fn test_commit_never_goes_negative() {
        let mut ledger = CapacityLedger::from_targets(&[target("B1", 5, 3)]);

        let result = ledger.commit("B1", 4);
        assert!(matches!(
            result,
            Err(ConsolidationError::CapacityViolation { available: 3, .. })
        ));
        assert_eq!(ledger.available("B1"), Some(3));
        assert!(!ledger.is_touched("B1"));
    }

    #[test]
    fn test_has_room_follows_commits() {
        let mut full_by_pct = target("B2", 5, 3);
        full_by_pct.utilization_pct = 100.0;
        let mut ledger = CapacityLedger::from_targets(&[target("B1", 5, 2), full_by_pct]);

        assert!(ledger.has_room("B1"));
        assert!(!ledger.has_room("B2"));
        assert!(!ledger.has_room("B9"));

        ledger.commit("B1", 2).unwrap();
        assert!(!ledger.has_room("B1"));
    }

    #[test]
    fn test_unknown_bin() {
        let mut ledger = CapacityLedger::default();
        assert!(matches!(
            ledger.commit("B9", 1),
            Err(ConsolidationError::UnknownTargetBin(_))
        ));
    }

    #[test]
    fn test_first_row_wins_for_shared_bin() {
        let ledger = CapacityLedger::from_targets(&[target("B1", 5, 3), target("B1", 5, 1)]);
        assert_eq!(ledger.available("B1"), Some(3));
        assert_eq!(ledger.touched_count(), 0);
    }
}
