// ==========================================
// 库存合并决策 - 领域类型定义
// ==========================================
// 职责: 批次日期 / 移库策略 / 源库位状态
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 批次日期 (Batch Date)
// ==========================================
// 红线: Unknown 与任何真实日期都可区分，不参与日期比较
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "date", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchDate {
    Known(NaiveDate),
    Unknown,
}

impl BatchDate {
    pub fn known(&self) -> Option<NaiveDate> {
        match self {
            BatchDate::Known(date) => Some(*date),
            BatchDate::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, BatchDate::Known(_))
    }

    /// 两个批次日期之间的绝对天数差；任一方未知则返回 None
    pub fn days_between(&self, other: &BatchDate) -> Option<i64> {
        match (self, other) {
            (BatchDate::Known(a), BatchDate::Known(b)) => Some((*a - *b).num_days().abs()),
            _ => None,
        }
    }
}

impl fmt::Display for BatchDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchDate::Known(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            BatchDate::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ==========================================
// 移库策略 (Move Policy)
// ==========================================
// FullMove: 整库位一次性移入单个目标库位
// PartialMove: 允许按目标剩余容量拆分到多个目标库位（仍需整库位清空）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovePolicy {
    #[default]
    FullMove,
    PartialMove,
}

impl fmt::Display for MovePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovePolicy::FullMove => write!(f, "FULL_MOVE"),
            MovePolicy::PartialMove => write!(f, "PARTIAL_MOVE"),
        }
    }
}

impl std::str::FromStr for MovePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "FULL_MOVE" | "FULL" => Ok(MovePolicy::FullMove),
            "PARTIAL_MOVE" | "PARTIAL" => Ok(MovePolicy::PartialMove),
            other => Err(format!("未知的移库策略: {}", other)),
        }
    }
}

// ==========================================
// 源库位处理状态 (Source Bin State)
// ==========================================
// UNPROCESSED → MATCHING → {COMMITTED, EXHAUSTED}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceBinState {
    Unprocessed,
    Matching,
    Committed,
    Exhausted,
}

impl fmt::Display for SourceBinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceBinState::Unprocessed => write!(f, "UNPROCESSED"),
            SourceBinState::Matching => write!(f, "MATCHING"),
            SourceBinState::Committed => write!(f, "COMMITTED"),
            SourceBinState::Exhausted => write!(f, "EXHAUSTED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_date_days_between() {
        let a = BatchDate::Known(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        let b = BatchDate::Known(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(a.days_between(&b), Some(14));
        assert_eq!(b.days_between(&a), Some(14));
        assert_eq!(a.days_between(&BatchDate::Unknown), None);
    }

    #[test]
    fn test_move_policy_from_str() {
        assert_eq!("full-move".parse::<MovePolicy>().unwrap(), MovePolicy::FullMove);
        assert_eq!("PARTIAL_MOVE".parse::<MovePolicy>().unwrap(), MovePolicy::PartialMove);
        assert!("spill".parse::<MovePolicy>().is_err());
    }

    #[test]
    fn test_unknown_display() {
        assert_eq!(BatchDate::Unknown.to_string(), "UNKNOWN");
    }
}
