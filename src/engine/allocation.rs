// ==========================================
// 选矿厂运营系统 - 磨矿分配计算器
// ==========================================
// 职责:
// 1. 汇总各磨机分配（粗矿/细矿/合计）
// 2. 计算剩余库存（允许为负，作为超分配信号）
// 3. 计算预计加工时长与结束时刻
// 4. 复制分配到其他激活磨机（按目标容量截断）
// 5. 会话状态变更（命令 → 全量重算派生字段）
// ==========================================
// 红线: 纯计算，无 I/O；每次变更后全量重算，不做增量缓存
// ==========================================

use crate::domain::allocation::{AllocationCommand, AllocationSession, MillAllocation};
use crate::domain::client::StockLevels;
use crate::domain::mill::Mill;
use crate::domain::types::{DurationBucket, OreSubtype};
use crate::engine::duration::{format_end_time, DurationTable};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

// ==========================================
// AllocationError - 会话命令错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("磨机不在当前分配会话中: {0}")]
    UnknownMill(String),
}

// ==========================================
// 计算结果
// ==========================================

/// 单台磨机的计算行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MillTotalsRow {
    pub mill_id: String,
    pub active: bool,
    pub coarse: u32,
    pub fine: u32,
    pub total: u32,
    pub estimated_minutes: u32,
    pub projected_end: Option<String>,
}

/// 会话汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationTotals {
    pub total_coarse: i64,
    pub total_fine: i64,
    pub total_units: i64,

    // ===== 剩余库存（可为负） =====
    pub remaining_coarse: i64,
    pub remaining_fine: i64,
    pub remaining_total: i64,

    // ===== 时间 =====
    pub bucket: Option<DurationBucket>,
    pub estimated_minutes: u32,
    pub start_time: String,
    pub projected_end: Option<String>,

    pub mills: Vec<MillTotalsRow>,
}

impl AllocationTotals {
    /// 是否存在超分配（任一维度剩余为负）
    pub fn is_over_allocated(&self) -> bool {
        self.remaining_total < 0 || self.remaining_coarse < 0 || self.remaining_fine < 0
    }
}

/// 激活磨机的分配量合计（按子类）
pub fn allocated_stock(session: &AllocationSession) -> StockLevels {
    session
        .active_allocations()
        .fold(StockLevels::default(), |acc, a| {
            StockLevels::new(acc.coarse + a.coarse_qty as i64, acc.fine + a.fine_qty as i64)
        })
}

/// 将源磨机的分配复制到其他所有激活磨机
///
/// 目标按自身容量截断: 粗矿 ≤ 容量，细矿 ≤ 容量 − 粗矿。不做校验。
/// 目标行的派生字段（合计、预计时长、预计结束）随之重算。
pub fn replicate_allocation(
    session: &AllocationSession,
    source_mill_id: &str,
    table: &DurationTable,
) -> Result<AllocationSession, AllocationError> {
    let source = session
        .allocation(source_mill_id)
        .ok_or_else(|| AllocationError::UnknownMill(source_mill_id.to_string()))?;
    let (coarse, fine) = (source.coarse_qty, source.fine_qty);
    let minutes = table
        .resolve(session.mineral_category, &session.duration_selection)
        .map(|(_, m)| m);

    let mut next = session.clone();
    let start = next.start_time;
    for target in next
        .allocations
        .iter_mut()
        .filter(|a| a.active && a.mill_id != source_mill_id)
    {
        let capped_coarse = coarse.min(target.capacity);
        let capped_fine = fine.min(target.capacity - capped_coarse);
        target.coarse_qty = capped_coarse;
        target.fine_qty = capped_fine;
        refresh_row(target, minutes, start);
    }
    Ok(next)
}

// ==========================================
// AllocationEngine - 分配计算引擎
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct AllocationEngine {
    table: DurationTable,
}

impl AllocationEngine {
    /// 使用默认档位表
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用配置的档位表
    pub fn with_table(table: DurationTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &DurationTable {
        &self.table
    }

    // ==========================================
    // 汇总计算
    // ==========================================

    /// 计算会话汇总（纯函数，相同输入结果相同）
    pub fn compute_totals(&self, session: &AllocationSession) -> AllocationTotals {
        let resolved = self
            .table
            .resolve(session.mineral_category, &session.duration_selection);
        let estimated_minutes = resolved.map(|(_, m)| m).unwrap_or(0);
        let projected_end = resolved.map(|(_, m)| format_end_time(session.start_time, m));

        let allocated = allocated_stock(session);
        let available = session.available_stock;

        let mills = session
            .allocations
            .iter()
            .map(|a| self.row_for(a, resolved.map(|(_, m)| m), session))
            .collect();

        AllocationTotals {
            total_coarse: allocated.coarse,
            total_fine: allocated.fine,
            total_units: allocated.total(),
            remaining_coarse: available.coarse - allocated.coarse,
            remaining_fine: available.fine - allocated.fine,
            remaining_total: available.total() - allocated.total(),
            bucket: resolved.map(|(b, _)| b),
            estimated_minutes,
            start_time: session.start_time.format("%H:%M").to_string(),
            projected_end,
            mills,
        }
    }

    fn row_for(
        &self,
        allocation: &MillAllocation,
        minutes: Option<u32>,
        session: &AllocationSession,
    ) -> MillTotalsRow {
        if !allocation.active {
            return MillTotalsRow {
                mill_id: allocation.mill_id.clone(),
                active: false,
                coarse: 0,
                fine: 0,
                total: 0,
                estimated_minutes: 0,
                projected_end: None,
            };
        }
        MillTotalsRow {
            mill_id: allocation.mill_id.clone(),
            active: true,
            coarse: allocation.coarse_qty,
            fine: allocation.fine_qty,
            total: allocation.coarse_qty + allocation.fine_qty,
            estimated_minutes: minutes.unwrap_or(0),
            projected_end: minutes.map(|m| format_end_time(session.start_time, m)),
        }
    }

    // ==========================================
    // 状态变更
    // ==========================================

    /// 应用命令并全量重算派生字段
    pub fn apply(
        &self,
        session: &mut AllocationSession,
        command: AllocationCommand,
    ) -> Result<(), AllocationError> {
        debug!(session_id = %session.session_id, ?command, "应用分配命令");

        match command {
            AllocationCommand::SelectClient { client } => {
                session.client_id = Some(client.client_id);
                session.client_name = Some(client.name);
                session.available_stock = client.stock;
                session.mineral_category = client.mineral_category;
            }
            AllocationCommand::ClearClient => {
                session.client_id = None;
                session.client_name = None;
                session.available_stock = StockLevels::default();
            }
            AllocationCommand::SetMineralCategory { category } => {
                session.mineral_category = category;
            }
            AllocationCommand::SetBucket { bucket, selected } => {
                session.duration_selection.set(bucket, selected);
            }
            AllocationCommand::SetStartTime { start_time } => {
                session.start_time = start_time;
            }
            AllocationCommand::SetMillActive { mill_id, active } => {
                let allocation = find_mut(session, &mill_id)?;
                if active {
                    allocation.active = true;
                } else {
                    allocation.clear();
                }
            }
            AllocationCommand::ToggleMill { mill_id } => {
                let allocation = find_mut(session, &mill_id)?;
                if allocation.active {
                    allocation.clear();
                } else {
                    allocation.active = true;
                }
            }
            AllocationCommand::SetQuantity {
                mill_id,
                subtype,
                quantity,
            } => {
                let allocation = find_mut(session, &mill_id)?;
                set_quantity(allocation, subtype, quantity);
            }
            AllocationCommand::Replicate { source_mill_id } => {
                *session = replicate_allocation(session, &source_mill_id, &self.table)?;
            }
            AllocationCommand::SyncMills { mills } => {
                sync_mills(session, &mills);
            }
            AllocationCommand::SetObservations { text } => {
                session.observations = text;
            }
            AllocationCommand::Reset => {
                session.client_id = None;
                session.client_name = None;
                session.available_stock = StockLevels::default();
                session.duration_selection.clear();
                session.observations.clear();
                for allocation in session.allocations.iter_mut() {
                    allocation.clear();
                }
            }
        }

        self.refresh_derived(session);
        Ok(())
    }

    /// 重算每台磨机的派生字段（合计、预计分钟、结束时刻）
    pub fn refresh_derived(&self, session: &mut AllocationSession) {
        let minutes = self
            .table
            .resolve(session.mineral_category, &session.duration_selection)
            .map(|(_, m)| m);
        let start = session.start_time;

        for allocation in session.allocations.iter_mut() {
            refresh_row(allocation, minutes, start);
        }
    }
}

/// 单行派生字段: 激活行按输入重算，未激活行清零
fn refresh_row(allocation: &mut MillAllocation, minutes: Option<u32>, start: NaiveTime) {
    if allocation.active {
        allocation.total = allocation.coarse_qty + allocation.fine_qty;
        allocation.estimated_minutes = minutes.unwrap_or(0);
        allocation.projected_end = minutes.map(|m| format_end_time(start, m));
    } else {
        allocation.total = 0;
        allocation.estimated_minutes = 0;
        allocation.projected_end = None;
    }
}

fn find_mut<'a>(
    session: &'a mut AllocationSession,
    mill_id: &str,
) -> Result<&'a mut MillAllocation, AllocationError> {
    session
        .allocation_mut(mill_id)
        .ok_or_else(|| AllocationError::UnknownMill(mill_id.to_string()))
}

/// 设置数量: 截断到剩余容量；首次录入非零数量时自动激活
fn set_quantity(allocation: &mut MillAllocation, subtype: OreSubtype, quantity: u32) {
    let other = match subtype {
        OreSubtype::Coarse => allocation.fine_qty,
        OreSubtype::Fine => allocation.coarse_qty,
    };
    let capped = quantity.min(allocation.capacity.saturating_sub(other));
    match subtype {
        OreSubtype::Coarse => allocation.coarse_qty = capped,
        OreSubtype::Fine => allocation.fine_qty = capped,
    }
    if capped > 0 {
        allocation.active = true;
    }
}

/// 刷新磨机状态镜像；目录中已不存在的磨机视为不可用。不会取消勾选，也不改写已录入数量
/// （容量下调后超量由校验规则拦截）。
fn sync_mills(session: &mut AllocationSession, mills: &[Mill]) {
    for allocation in session.allocations.iter_mut() {
        match mills.iter().find(|m| m.mill_id == allocation.mill_id) {
            Some(mill) => {
                allocation.mill_name = mill.name.clone();
                allocation.available = mill.is_available();
                allocation.capacity = mill.capacity_sacks;
            }
            None => allocation.available = false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::allocation::ClientSnapshot;
    use crate::domain::types::{MillStatus, MineralCategory};

    // ==========================================
    // 测试辅助函数
    // ==========================================

    fn test_mills() -> Vec<Mill> {
        vec![
            Mill::new("M1".to_string(), "Molino 1".to_string(), 150),
            Mill::new("M2".to_string(), "Molino 2".to_string(), 100),
            Mill::new("M3".to_string(), "Molino 3".to_string(), 200),
            Mill::new("M4".to_string(), "Molino 4".to_string(), 80),
        ]
    }

    fn new_session(start: NaiveTime) -> AllocationSession {
        AllocationSession::new("S1".to_string(), &test_mills(), start)
    }

    fn client(coarse: i64, fine: i64, category: MineralCategory) -> ClientSnapshot {
        ClientSnapshot {
            client_id: "C1".to_string(),
            name: "Minera Sur".to_string(),
            mineral_category: category,
            stock: StockLevels::new(coarse, fine),
        }
    }

    fn qty(mill_id: &str, subtype: OreSubtype, quantity: u32) -> AllocationCommand {
        AllocationCommand::SetQuantity {
            mill_id: mill_id.to_string(),
            subtype,
            quantity,
        }
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    // ==========================================
    // 汇总
    // ==========================================

    #[test]
    fn test_totals_additivity() {
        let engine = AllocationEngine::new();
        let mut session = new_session(at(8, 0));
        engine
            .apply(&mut session, AllocationCommand::SelectClient { client: client(300, 300, MineralCategory::A) })
            .unwrap();
        engine.apply(&mut session, qty("M1", OreSubtype::Coarse, 70)).unwrap();
        engine.apply(&mut session, qty("M1", OreSubtype::Fine, 30)).unwrap();
        engine.apply(&mut session, qty("M3", OreSubtype::Fine, 55)).unwrap();

        let totals = engine.compute_totals(&session);
        let sum_active: i64 = session.active_allocations().map(|a| a.total as i64).sum();
        assert_eq!(totals.total_units, sum_active);
        assert_eq!(totals.total_units, totals.total_coarse + totals.total_fine);
        assert_eq!(totals.total_coarse, 70);
        assert_eq!(totals.total_fine, 85);
    }

    #[test]
    fn test_remaining_may_be_negative() {
        let engine = AllocationEngine::new();
        let mut session = new_session(at(8, 0));
        engine
            .apply(&mut session, AllocationCommand::SelectClient { client: client(50, 50, MineralCategory::A) })
            .unwrap();
        engine.apply(&mut session, qty("M1", OreSubtype::Coarse, 60)).unwrap();

        let totals = engine.compute_totals(&session);
        assert_eq!(totals.remaining_coarse, -10);
        assert_eq!(totals.remaining_fine, 50);
        assert_eq!(totals.remaining_total, 40);
        assert_eq!(totals.remaining_total, 100 - totals.total_units);
        assert!(totals.is_over_allocated());
    }

    #[test]
    fn test_inactive_mills_not_counted() {
        let engine = AllocationEngine::new();
        let mut session = new_session(at(8, 0));
        // 直接构造非法状态: 未激活但有数量
        session.allocation_mut("M2").unwrap().coarse_qty = 40;
        let totals = engine.compute_totals(&session);
        assert_eq!(totals.total_units, 0);
        assert_eq!(totals.mills[1].total, 0);
    }

    #[test]
    fn test_duration_independent_of_sacks() {
        let engine = AllocationEngine::new();
        let mut session = new_session(at(6, 0));
        engine
            .apply(&mut session, AllocationCommand::SetBucket { bucket: DurationBucket::A100, selected: true })
            .unwrap();
        engine.apply(&mut session, qty("M1", OreSubtype::Coarse, 5)).unwrap();
        engine.apply(&mut session, qty("M3", OreSubtype::Coarse, 190)).unwrap();

        for a in session.active_allocations() {
            assert_eq!(a.estimated_minutes, 100);
            assert_eq!(a.projected_end.as_deref(), Some("07:40"));
        }
        assert_eq!(engine.compute_totals(&session).estimated_minutes, 100);

        engine
            .apply(&mut session, AllocationCommand::SetMineralCategory { category: MineralCategory::B })
            .unwrap();
        engine
            .apply(&mut session, AllocationCommand::SetBucket { bucket: DurationBucket::B150, selected: true })
            .unwrap();
        for a in session.active_allocations() {
            assert_eq!(a.estimated_minutes, 150);
        }
    }

    #[test]
    fn test_end_time_wraparound() {
        let engine = AllocationEngine::new();
        let mut session = new_session(at(23, 30));
        engine
            .apply(&mut session, AllocationCommand::SetBucket { bucket: DurationBucket::A100, selected: true })
            .unwrap();
        engine.apply(&mut session, qty("M2", OreSubtype::Fine, 10)).unwrap();

        let totals = engine.compute_totals(&session);
        assert_eq!(totals.projected_end.as_deref(), Some("01:10"));
        assert_eq!(
            session.allocation("M2").unwrap().projected_end.as_deref(),
            Some("01:10")
        );
    }

    #[test]
    fn test_no_bucket_gives_zero_minutes() {
        let engine = AllocationEngine::new();
        let mut session = new_session(at(8, 0));
        engine.apply(&mut session, qty("M1", OreSubtype::Coarse, 10)).unwrap();
        let totals = engine.compute_totals(&session);
        assert_eq!(totals.estimated_minutes, 0);
        assert_eq!(totals.projected_end, None);
        assert_eq!(session.allocation("M1").unwrap().projected_end, None);
    }

    // ==========================================
    // 复制分配
    // ==========================================

    #[test]
    fn test_replicate_clamps_to_target_capacity() {
        let engine = AllocationEngine::new();
        let mut session = new_session(at(8, 0));
        engine.apply(&mut session, qty("M1", OreSubtype::Coarse, 120)).unwrap();
        for id in ["M2", "M3"] {
            engine
                .apply(&mut session, AllocationCommand::SetMillActive { mill_id: id.to_string(), active: true })
                .unwrap();
        }

        engine
            .apply(&mut session, AllocationCommand::Replicate { source_mill_id: "M1".to_string() })
            .unwrap();

        assert_eq!(session.allocation("M2").unwrap().coarse_qty, 100);
        assert_eq!(session.allocation("M3").unwrap().coarse_qty, 120);
        // 未激活磨机不受影响
        assert_eq!(session.allocation("M4").unwrap().coarse_qty, 0);
        assert!(!session.allocation("M4").unwrap().active);
    }

    #[test]
    fn test_replicate_fine_limited_by_remaining_capacity() {
        let engine = AllocationEngine::new();
        let mut session = new_session(at(8, 0));
        engine
            .apply(&mut session, AllocationCommand::SelectClient { client: client(300, 300, MineralCategory::A) })
            .unwrap();
        engine
            .apply(&mut session, AllocationCommand::SetBucket { bucket: DurationBucket::A100, selected: true })
            .unwrap();
        {
            let src = session.allocation_mut("M3").unwrap();
            src.active = true;
            src.coarse_qty = 60;
            src.fine_qty = 50;
        }
        session.allocation_mut("M4").unwrap().active = true;

        let next = replicate_allocation(&session, "M3", engine.table()).unwrap();
        let target = next.allocation("M4").unwrap();
        assert_eq!(target.coarse_qty, 60);
        assert_eq!(target.fine_qty, 20);
        assert_eq!(target.total, target.coarse_qty + target.fine_qty);
        let mut refreshed = next.clone();
        engine.refresh_derived(&mut refreshed);
        let expected = refreshed.allocation("M4").unwrap();
        assert_eq!(target.estimated_minutes, expected.estimated_minutes);
        assert_eq!(target.projected_end, expected.projected_end);
        assert!(target.estimated_minutes > 0);
        assert!(target.coarse_qty <= target.capacity);
        assert!(target.fine_qty <= target.capacity);
        // 源会话不变
        assert_eq!(session.allocation("M4").unwrap().coarse_qty, 0);
    }

    #[test]
    fn test_replicate_unknown_source() {
        let session = new_session(at(8, 0));
        assert_eq!(
            replicate_allocation(&session, "MX", &DurationTable::default()),
            Err(AllocationError::UnknownMill("MX".to_string()))
        );
    }

    // ==========================================
    // 状态机
    // ==========================================

    #[test]
    fn test_toggle_off_zeroes_everything() {
        let engine = AllocationEngine::new();
        let mut session = new_session(at(8, 0));
        engine
            .apply(&mut session, AllocationCommand::SetBucket { bucket: DurationBucket::A60, selected: true })
            .unwrap();
        engine.apply(&mut session, qty("M1", OreSubtype::Coarse, 40)).unwrap();
        engine.apply(&mut session, qty("M1", OreSubtype::Fine, 20)).unwrap();
        {
            let a = session.allocation("M1").unwrap();
            assert!(a.active);
            assert_eq!(a.total, 60);
            assert_eq!(a.estimated_minutes, 60);
            assert!(a.projected_end.is_some());
        }

        engine
            .apply(&mut session, AllocationCommand::ToggleMill { mill_id: "M1".to_string() })
            .unwrap();
        let a = session.allocation("M1").unwrap();
        assert!(!a.active);
        assert_eq!(a.coarse_qty, 0);
        assert_eq!(a.fine_qty, 0);
        assert_eq!(a.total, 0);
        assert_eq!(a.estimated_minutes, 0);
        assert_eq!(a.projected_end, None);
    }

    #[test]
    fn test_first_nonzero_quantity_activates() {
        let engine = AllocationEngine::new();
        let mut session = new_session(at(8, 0));
        engine.apply(&mut session, qty("M2", OreSubtype::Fine, 0)).unwrap();
        assert!(!session.allocation("M2").unwrap().active);
        engine.apply(&mut session, qty("M2", OreSubtype::Fine, 3)).unwrap();
        assert!(session.allocation("M2").unwrap().active);
    }

    #[test]
    fn test_set_quantity_respects_capacity() {
        let engine = AllocationEngine::new();
        let mut session = new_session(at(8, 0));
        engine.apply(&mut session, qty("M4", OreSubtype::Coarse, 50)).unwrap();
        engine.apply(&mut session, qty("M4", OreSubtype::Fine, 50)).unwrap();
        let a = session.allocation("M4").unwrap();
        assert_eq!(a.fine_qty, 30);
        assert!(a.total <= a.capacity);
    }

    #[test]
    fn test_unknown_mill_command_rejected() {
        let engine = AllocationEngine::new();
        let mut session = new_session(at(8, 0));
        let err = engine
            .apply(&mut session, AllocationCommand::ToggleMill { mill_id: "M9".to_string() })
            .unwrap_err();
        assert_eq!(err, AllocationError::UnknownMill("M9".to_string()));
    }

    #[test]
    fn test_sync_mills_marks_busy_without_deselecting() {
        let engine = AllocationEngine::new();
        let mut session = new_session(at(8, 0));
        engine.apply(&mut session, qty("M1", OreSubtype::Coarse, 10)).unwrap();

        let mut mills = test_mills();
        mills[0].status = MillStatus::Busy;
        mills.remove(3);
        engine
            .apply(&mut session, AllocationCommand::SyncMills { mills })
            .unwrap();

        let m1 = session.allocation("M1").unwrap();
        assert!(m1.active);
        assert!(!m1.available);
        assert!(!session.allocation("M4").unwrap().available);
        assert!(session.allocation("M2").unwrap().available);
    }

    #[test]
    fn test_sync_mills_capacity_drop_keeps_quantities() {
        let engine = AllocationEngine::new();
        let mut session = new_session(at(8, 0));
        engine.apply(&mut session, qty("M1", OreSubtype::Coarse, 120)).unwrap();
        engine.apply(&mut session, qty("M1", OreSubtype::Fine, 20)).unwrap();

        let mut mills = test_mills();
        mills[0].capacity_sacks = 100;
        engine
            .apply(&mut session, AllocationCommand::SyncMills { mills })
            .unwrap();

        let m1 = session.allocation("M1").unwrap();
        assert_eq!(m1.capacity, 100);
        assert_eq!(m1.coarse_qty, 120);
        assert_eq!(m1.fine_qty, 20);
        assert_eq!(m1.total, 140);
    }

    #[test]
    fn test_select_client_sets_category_and_stock() {
        let engine = AllocationEngine::new();
        let mut session = new_session(at(8, 0));
        engine
            .apply(&mut session, AllocationCommand::SelectClient { client: client(10, 20, MineralCategory::B) })
            .unwrap();
        assert_eq!(session.client_id.as_deref(), Some("C1"));
        assert_eq!(session.mineral_category, MineralCategory::B);
        assert_eq!(session.available_stock, StockLevels::new(10, 20));
    }

    #[test]
    fn test_reset_clears_session() {
        let engine = AllocationEngine::new();
        let mut session = new_session(at(8, 0));
        engine
            .apply(&mut session, AllocationCommand::SelectClient { client: client(10, 20, MineralCategory::A) })
            .unwrap();
        engine
            .apply(&mut session, AllocationCommand::SetBucket { bucket: DurationBucket::A100, selected: true })
            .unwrap();
        engine.apply(&mut session, qty("M1", OreSubtype::Coarse, 5)).unwrap();
        engine
            .apply(&mut session, AllocationCommand::SetObservations { text: "humedo".to_string() })
            .unwrap();

        engine.apply(&mut session, AllocationCommand::Reset).unwrap();
        assert!(session.client_id.is_none());
        assert!(session.duration_selection.is_empty());
        assert!(session.observations.is_empty());
        assert_eq!(session.allocations.len(), 4);
        assert!(session.allocations.iter().all(|a| !a.active && a.total == 0));
    }

    #[test]
    fn test_compute_totals_deterministic() {
        let engine = AllocationEngine::new();
        let mut session = new_session(at(10, 15));
        engine
            .apply(&mut session, AllocationCommand::SetBucket { bucket: DurationBucket::A60, selected: true })
            .unwrap();
        engine.apply(&mut session, qty("M3", OreSubtype::Fine, 33)).unwrap();
        assert_eq!(engine.compute_totals(&session), engine.compute_totals(&session));
    }
}
