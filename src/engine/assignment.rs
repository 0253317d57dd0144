// ==========================================
// 库存合并决策 - 分配引擎
// ==========================================
// 职责: 贪心配对 端架库位 → 开放库位
// 输入: 标准化后的端架/开放库位表 + 运行配置
// 输出: 移库明细 + 配对汇总 + 容量台账
// ==========================================
// 源库位状态: UNPROCESSED → MATCHING → {COMMITTED, EXHAUSTED}
// - 按标准化顺序（小库位优先）逐个处理，每个库位只处理一次
// - 首个通过全部校验的目标即提交（first-fit），不回溯
// - 候选集在处理每个源库位时基于台账重新计算（不可变快照），提交后再写台账
// - 日期校验覆盖当前候选及其后全部剩余候选
// ==========================================

use crate::config::RunConfig;
use crate::domain::inventory::{SourceRecord, TargetRecord};
use crate::domain::plan::{Assignment, SummaryEntry};
use crate::domain::types::{BatchDate, MovePolicy, SourceBinState};
use crate::engine::capacity_ledger::CapacityLedger;
use crate::engine::error::ConsolidationResult;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument, trace};

/// 本轮已接收库存的库位不再作为源库位
pub const REASON_RECEIVED_STOCK: &str = "RECEIVED_STOCK_THIS_RUN";

// ==========================================
// 源库位（按库位聚合后的端架记录）
// ==========================================

#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    pub unit_id: String,
    pub batch_code: String,
    pub batch_date: BatchDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceBin {
    pub bin_id: String,
    /// 代表行（库位首行）的物料号
    pub material_id: String,
    /// 代表行的批次前缀
    pub batch_prefix: Option<String>,
    /// 去重后的存储单元（首次出现顺序）
    pub units: Vec<SourceUnit>,
}

impl SourceBin {
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    fn all_dates_known(&self) -> bool {
        self.units.iter().all(|u| u.batch_date.is_known())
    }
}

/// 按库位聚合（保持标准化后的首次出现顺序）
pub fn group_source_bins(sources: &[SourceRecord]) -> Vec<SourceBin> {
    let mut bins: Vec<SourceBin> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut seen_units: HashSet<(&str, &str)> = HashSet::new();

    for record in sources {
        let idx = *index.entry(record.bin_id.as_str()).or_insert_with(|| {
            bins.push(SourceBin {
                bin_id: record.bin_id.clone(),
                material_id: record.material_id.clone(),
                batch_prefix: record.batch_prefix.clone(),
                units: Vec::new(),
            });
            bins.len() - 1
        });

        if seen_units.insert((record.bin_id.as_str(), record.unit_id.as_str())) {
            bins[idx].units.push(SourceUnit {
                unit_id: record.unit_id.clone(),
                batch_code: record.batch_code.clone(),
                batch_date: record.batch_date,
            });
        }
    }

    bins
}

// ==========================================
// 候选目标库位（每个源库位一次的不可变快照）
// ==========================================

#[derive(Debug, Clone)]
struct CandidateBatch {
    batch_code: String,
    date: BatchDate,
}

#[derive(Debug, Clone)]
struct CandidateTarget {
    bin_id: String,
    available: i64,
    priority: usize,
    batches: Vec<CandidateBatch>,
}

impl CandidateTarget {
    /// 最早 / 最新批次号（按解析日期，同日期取先出现者）
    fn batch_range(&self) -> (String, String) {
        let mut oldest: Option<&CandidateBatch> = None;
        let mut newest: Option<&CandidateBatch> = None;
        for batch in &self.batches {
            if oldest.map_or(true, |o| batch.date.known() < o.date.known()) {
                oldest = Some(batch);
            }
            if newest.map_or(true, |n| batch.date.known() > n.date.known()) {
                newest = Some(batch);
            }
        }
        (
            oldest.map(|b| b.batch_code.clone()).unwrap_or_default(),
            newest.map(|b| b.batch_code.clone()).unwrap_or_default(),
        )
    }
}

/// 单个源库位的处理结果
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBinOutcome {
    pub bin_id: String,
    pub unit_count: usize,
    pub state: SourceBinState,
    pub reason: String,
}

impl SourceBinOutcome {
    fn new(bin: &SourceBin) -> Self {
        Self {
            bin_id: bin.bin_id.clone(),
            unit_count: bin.unit_count(),
            state: SourceBinState::Unprocessed,
            reason: String::new(),
        }
    }

    fn finish(mut self, state: SourceBinState, reason: &str) -> Self {
        self.state = state;
        self.reason = reason.to_string();
        self
    }
}

/// 分配引擎输出
#[derive(Debug, Clone)]
pub struct AssignmentOutput {
    pub assignments: Vec<Assignment>,
    pub summary: Vec<SummaryEntry>,
    pub ledger: CapacityLedger,
    /// 已整体移出的源库位
    pub consumed_bins: HashSet<String>,
    pub outcomes: Vec<SourceBinOutcome>,
}

impl AssignmentOutput {
    pub fn count_state(&self, state: SourceBinState) -> usize {
        self.outcomes.iter().filter(|o| o.state == state).count()
    }
}

// ==========================================
// AssignmentEngine - 分配引擎
// ==========================================
pub struct AssignmentEngine<'a> {
    config: &'a RunConfig,
}

impl<'a> AssignmentEngine<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    /// 执行分配
    ///
    /// # 参数
    /// - `sources`: 标准化后的端架记录（已按单元数升序）
    /// - `targets`: 标准化后的开放库位记录（已按当前单元数降序）
    #[instrument(skip_all, fields(
        policy = %self.config.move_policy,
        source_rows = sources.len(),
        target_rows = targets.len()
    ))]
    pub fn assign(
        &self,
        sources: &[SourceRecord],
        targets: &[TargetRecord],
    ) -> ConsolidationResult<AssignmentOutput> {
        let mut ledger = CapacityLedger::from_targets(targets);
        let mut consumed_bins: HashSet<String> = HashSet::new();
        let mut assignments = Vec::new();
        let mut summary = Vec::new();
        let mut outcomes = Vec::new();

        for bin in group_source_bins(sources) {
            let mut outcome = SourceBinOutcome::new(&bin);

            outcome = if ledger.is_touched(&bin.bin_id) {
                outcome.finish(SourceBinState::Exhausted, REASON_RECEIVED_STOCK)
            } else {
                // UNPROCESSED → MATCHING
                outcome.state = SourceBinState::Matching;
                trace!(bin_id = %bin.bin_id, state = %outcome.state, "计算候选目标库位");

                match self.plan_moves(&bin, targets, &ledger, &consumed_bins) {
                    Err(reason) => outcome.finish(SourceBinState::Exhausted, reason),
                    Ok(moves) => {
                        self.commit(
                            &bin,
                            moves,
                            &mut ledger,
                            &mut assignments,
                            &mut summary,
                        )?;
                        consumed_bins.insert(bin.bin_id.clone());
                        outcome.finish(SourceBinState::Committed, "COMMITTED")
                    }
                }
            };

            debug!(
                bin_id = %outcome.bin_id,
                units = outcome.unit_count,
                state = %outcome.state,
                reason = %outcome.reason,
                "源库位处理完成"
            );
            outcomes.push(outcome);
        }

        Ok(AssignmentOutput {
            assignments,
            summary,
            ledger,
            consumed_bins,
            outcomes,
        })
    }

    /// 计算某源库位的移库方案（不修改台账）
    ///
    /// # 返回
    /// - Ok: [(目标候选, 移入单元数)]，单元数之和等于源库位单元数
    /// - Err: 未匹配原因
    fn plan_moves(
        &self,
        bin: &SourceBin,
        targets: &[TargetRecord],
        ledger: &CapacityLedger,
        consumed_bins: &HashSet<String>,
    ) -> Result<Vec<(CandidateTarget, usize)>, &'static str> {
        if bin.units.is_empty() {
            return Err("EMPTY_BIN");
        }
        if bin.batch_prefix.is_none() {
            return Err("NO_BATCH_PREFIX");
        }
        if !bin.all_dates_known() {
            return Err("UNKNOWN_BATCH_DATE");
        }

        let needed = bin.unit_count();
        let mut candidates = self.candidate_pool(bin, targets, ledger, consumed_bins);
        if self.config.move_policy == MovePolicy::FullMove {
            candidates.retain(|c| c.available >= needed as i64);
        }
        if candidates.is_empty() {
            return Err("NO_CANDIDATE_TARGET");
        }

        match self.config.move_policy {
            MovePolicy::FullMove => (0..candidates.len())
                .find(|&i| self.passes_date_gate(bin, &candidates[i..]))
                .map(|i| vec![(candidates.swap_remove(i), needed)])
                .ok_or("NO_TARGET_PASSED_GATES"),
            MovePolicy::PartialMove => {
                let mut remaining = needed;
                let mut moves = Vec::new();
                for i in 0..candidates.len() {
                    if remaining == 0 {
                        break;
                    }
                    if !self.passes_date_gate(bin, &candidates[i..]) {
                        continue;
                    }
                    let candidate = &candidates[i];
                    let take = remaining.min(candidate.available as usize);
                    remaining -= take;
                    moves.push((candidate.clone(), take));
                }
                // 必须整库位清空，否则不提交
                if remaining > 0 {
                    Err("INSUFFICIENT_TOTAL_CAPACITY")
                } else {
                    Ok(moves)
                }
            }
        }
    }

    /// 候选目标库位（按剩余容量降序，同容量按标准化优先级）
    fn candidate_pool(
        &self,
        bin: &SourceBin,
        targets: &[TargetRecord],
        ledger: &CapacityLedger,
        consumed_bins: &HashSet<String>,
    ) -> Vec<CandidateTarget> {
        let mut pool: Vec<CandidateTarget> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for target in targets {
            if !self.config.accepts_target_type(&target.storage_type)
                || target.bin_id == bin.bin_id
                || consumed_bins.contains(&target.bin_id)
                || target.material_id != bin.material_id
                || target.batch_prefix != bin.batch_prefix
                || !target.batch_date.is_known()
            {
                continue;
            }

            if !ledger.has_room(&target.bin_id) {
                continue;
            }
            let available = ledger.available(&target.bin_id).unwrap_or(0);

            let batch = CandidateBatch {
                batch_code: target.batch_code.clone(),
                date: target.batch_date,
            };
            match index.get(target.bin_id.as_str()) {
                Some(&idx) => pool[idx].batches.push(batch),
                None => {
                    let priority = pool.len();
                    index.insert(target.bin_id.as_str(), priority);
                    pool.push(CandidateTarget {
                        bin_id: target.bin_id.clone(),
                        available,
                        priority,
                        batches: vec![batch],
                    });
                }
            }
        }

        pool.sort_by(|a, b| {
            b.available
                .cmp(&a.available)
                .then(a.priority.cmp(&b.priority))
        });
        pool
    }

    /// 日期校验：源库位每个单元与剩余候选池（当前候选及其后全部候选）
    /// 的每个批次日期差均不超过窗口
    fn passes_date_gate(&self, bin: &SourceBin, remaining: &[CandidateTarget]) -> bool {
        let window = self.config.batch_window_days;
        bin.units.iter().all(|unit| {
            remaining
                .iter()
                .flat_map(|candidate| candidate.batches.iter())
                .all(|batch| {
                    unit.batch_date
                        .days_between(&batch.date)
                        .map_or(false, |days| days <= window)
                })
        })
    }

    /// 提交移库：写台账 + 生成明细与汇总
    fn commit(
        &self,
        bin: &SourceBin,
        moves: Vec<(CandidateTarget, usize)>,
        ledger: &mut CapacityLedger,
        assignments: &mut Vec<Assignment>,
        summary: &mut Vec<SummaryEntry>,
    ) -> ConsolidationResult<()> {
        let mut units = bin.units.iter();

        for (target, take) in moves {
            let available_before = target.available;
            let utilization_before = ledger.utilization_pct(&target.bin_id).unwrap_or(100.0);

            let remaining = ledger.commit(&target.bin_id, take as i64)?;
            let (target_oldest, target_newest) = target.batch_range();

            let moved: Vec<&SourceUnit> = units.by_ref().take(take).collect();
            for unit in &moved {
                assignments.push(Assignment {
                    source_bin: bin.bin_id.clone(),
                    target_bin: target.bin_id.clone(),
                    material_id: bin.material_id.clone(),
                    unit_id: unit.unit_id.clone(),
                    source_batch: unit.batch_code.clone(),
                    target_oldest_batch: target_oldest.clone(),
                    target_newest_batch: target_newest.clone(),
                    quantity: 1,
                    remaining_capacity: remaining,
                });
            }

            let (source_oldest, source_newest) = unit_batch_range(&moved);
            summary.push(SummaryEntry {
                source_bin: bin.bin_id.clone(),
                target_bin: target.bin_id.clone(),
                material_id: bin.material_id.clone(),
                source_oldest_batch: source_oldest,
                source_newest_batch: source_newest,
                target_oldest_batch: target_oldest,
                target_newest_batch: target_newest,
                target_available_before: available_before,
                target_utilization_before: utilization_before,
                units_moved: moved.len(),
                target_available_after: remaining,
            });
        }

        Ok(())
    }
}

/// 一组源单元的最早 / 最新批次号（同日期取先出现者）
fn unit_batch_range(units: &[&SourceUnit]) -> (String, String) {
    let mut oldest: Option<&SourceUnit> = None;
    let mut newest: Option<&SourceUnit> = None;
    for unit in units.iter().copied() {
        if oldest.map_or(true, |o| unit.batch_date.known() < o.batch_date.known()) {
            oldest = Some(unit);
        }
        if newest.map_or(true, |n| unit.batch_date.known() > n.batch_date.known()) {
            newest = Some(unit);
        }
    }
    (
        oldest.map(|u| u.batch_code.clone()).unwrap_or_default(),
        newest.map(|u| u.batch_code.clone()).unwrap_or_default(),
    )
}
