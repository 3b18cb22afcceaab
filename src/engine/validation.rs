// ==========================================
// 选矿厂运营系统 - 提交前校验规则
// ==========================================
// 规则顺序（命中即返回，fail-fast）:
// 0) 必须已选择客户
// 1) 必须勾选当前矿种类别下的时长档位
// 2) 至少一台磨机激活
// 3) 至少一台激活磨机分配量非零
// 4) 剩余总库存 >= 0
// 5) 剩余粗矿 >= 0
// 6) 剩余细矿 >= 0
// 7) 所有激活磨机在最近一次读取时为空闲
// 8) 激活磨机分配量不超过其最新容量（容量下调后不自动截断）
// ==========================================
// 红线: 校验失败不修改会话，也不自动修正输入
// ==========================================

use crate::domain::allocation::AllocationSession;
use crate::engine::allocation::allocated_stock;
use crate::engine::duration::resolve_bucket;
use crate::i18n::{t, t_with_args};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// StockScope - 库存不足的维度
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockScope {
    Total,
    Coarse,
    Fine,
}

impl StockScope {
    fn i18n_key(&self) -> &'static str {
        match self {
            StockScope::Total => "stock.total",
            StockScope::Coarse => "stock.coarse",
            StockScope::Fine => "stock.fine",
        }
    }
}

// ==========================================
// ValidationFailure - 校验失败类型
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationFailure {
    NoClientSelected,
    NoDurationBucket,
    NoActiveMill,
    EmptyAllocation,
    InsufficientStock { scope: StockScope, shortfall: i64 },
    MillsUnavailable { mills: Vec<String> },
    OverCapacity { mills: Vec<String> },
}

impl ValidationFailure {
    /// 稳定错误码（前端据此区分提示）
    pub fn code(&self) -> &'static str {
        match self {
            ValidationFailure::NoClientSelected => "NO_CLIENT",
            ValidationFailure::NoDurationBucket => "NO_DURATION_BUCKET",
            ValidationFailure::NoActiveMill => "NO_ACTIVE_MILL",
            ValidationFailure::EmptyAllocation => "EMPTY_ALLOCATION",
            ValidationFailure::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            ValidationFailure::MillsUnavailable { .. } => "MILLS_UNAVAILABLE",
            ValidationFailure::OverCapacity { .. } => "OVER_CAPACITY",
        }
    }

    /// 本地化提示文本
    pub fn message(&self) -> String {
        match self {
            ValidationFailure::NoClientSelected => t("validation.no_client"),
            ValidationFailure::NoDurationBucket => t("validation.no_duration_bucket"),
            ValidationFailure::NoActiveMill => t("validation.no_active_mill"),
            ValidationFailure::EmptyAllocation => t("validation.empty_allocation"),
            ValidationFailure::InsufficientStock { scope, shortfall } => t_with_args(
                "validation.insufficient_stock",
                &[
                    ("scope", &t(scope.i18n_key())),
                    ("shortfall", &shortfall.to_string()),
                ],
            ),
            ValidationFailure::MillsUnavailable { mills } => t_with_args(
                "validation.mills_unavailable",
                &[("mills", &mills.join(", "))],
            ),
            ValidationFailure::OverCapacity { mills } => t_with_args(
                "validation.over_capacity",
                &[("mills", &mills.join(", "))],
            ),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

// ==========================================
// 校验入口
// ==========================================

/// 按规则顺序校验，返回第一个失败项
pub fn validate_submission(session: &AllocationSession) -> Result<(), ValidationFailure> {
    match evaluate(session, true).into_iter().next() {
        Some(failure) => Err(failure),
        None => Ok(()),
    }
}

/// 运行全部规则，按规则顺序返回所有失败项
pub fn collect_violations(session: &AllocationSession) -> Vec<ValidationFailure> {
    evaluate(session, false)
}

fn evaluate(session: &AllocationSession, fail_fast: bool) -> Vec<ValidationFailure> {
    let mut failures = Vec::new();
    macro_rules! push {
        ($failure:expr) => {{
            failures.push($failure);
            if fail_fast {
                return failures;
            }
        }};
    }

    // 规则0
    if session.client_id.is_none() {
        push!(ValidationFailure::NoClientSelected);
    }

    // 规则1
    if resolve_bucket(session.mineral_category, &session.duration_selection).is_none() {
        push!(ValidationFailure::NoDurationBucket);
    }

    // 规则2
    let active: Vec<_> = session.active_allocations().collect();
    if active.is_empty() {
        push!(ValidationFailure::NoActiveMill);
    }

    // 规则3（无激活磨机时规则2已覆盖，不重复报）
    if !active.is_empty() && active.iter().all(|a| a.coarse_qty + a.fine_qty == 0) {
        push!(ValidationFailure::EmptyAllocation);
    }

    // 规则4-6
    let allocated = allocated_stock(session);
    let available = session.available_stock;
    let checks = [
        (StockScope::Total, available.total() - allocated.total()),
        (StockScope::Coarse, available.coarse - allocated.coarse),
        (StockScope::Fine, available.fine - allocated.fine),
    ];
    for (scope, remaining) in checks {
        if remaining < 0 {
            push!(ValidationFailure::InsufficientStock {
                scope,
                shortfall: -remaining,
            });
        }
    }

    // 规则7
    let unavailable: Vec<String> = active
        .iter()
        .filter(|a| !a.available)
        .map(|a| a.mill_name.clone())
        .collect();
    if !unavailable.is_empty() {
        push!(ValidationFailure::MillsUnavailable { mills: unavailable });
    }

    // 规则8
    let over_capacity: Vec<String> = active
        .iter()
        .filter(|a| a.coarse_qty + a.fine_qty > a.capacity)
        .map(|a| a.mill_name.clone())
        .collect();
    if !over_capacity.is_empty() {
        push!(ValidationFailure::OverCapacity { mills: over_capacity });
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::allocation::{ClientSnapshot, DurationSelection};
    use crate::domain::client::StockLevels;
    use crate::domain::mill::Mill;
    use crate::domain::types::{DurationBucket, MineralCategory};
    use chrono::NaiveTime;

    fn session_with_client(stock: StockLevels) -> AllocationSession {
        let mills = vec![
            Mill::new("M1".to_string(), "Molino 1".to_string(), 150),
            Mill::new("M2".to_string(), "Molino 2".to_string(), 100),
        ];
        let mut session = AllocationSession::new(
            "S1".to_string(),
            &mills,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        );
        let client = ClientSnapshot {
            client_id: "C1".to_string(),
            name: "Minera Sur".to_string(),
            mineral_category: MineralCategory::A,
            stock,
        };
        session.client_id = Some(client.client_id);
        session.client_name = Some(client.name);
        session.available_stock = client.stock;
        session.duration_selection = DurationSelection::with(&[DurationBucket::A100]);
        session
    }

    fn activate(session: &mut AllocationSession, mill_id: &str, coarse: u32, fine: u32) {
        let a = session.allocation_mut(mill_id).unwrap();
        a.active = true;
        a.coarse_qty = coarse;
        a.fine_qty = fine;
    }

    #[test]
    fn test_valid_session_passes() {
        let mut session = session_with_client(StockLevels::new(100, 100));
        activate(&mut session, "M1", 60, 40);
        assert_eq!(validate_submission(&session), Ok(()));
        assert!(collect_violations(&session).is_empty());
    }

    #[test]
    fn test_no_client_reported_before_stock() {
        let mut session = session_with_client(StockLevels::new(0, 0));
        session.client_id = None;
        session.duration_selection.clear();
        activate(&mut session, "M1", 500, 0);

        let err = validate_submission(&session).unwrap_err();
        assert_eq!(err, ValidationFailure::NoClientSelected);

        let all = collect_violations(&session);
        assert_eq!(all[0], ValidationFailure::NoClientSelected);
        assert_eq!(all[1], ValidationFailure::NoDurationBucket);
        assert!(matches!(all[2], ValidationFailure::InsufficientStock { .. }));
    }

    #[test]
    fn test_bucket_from_other_category_does_not_count() {
        let mut session = session_with_client(StockLevels::new(100, 100));
        session.duration_selection = DurationSelection::with(&[DurationBucket::B150]);
        activate(&mut session, "M1", 10, 0);
        assert_eq!(
            validate_submission(&session),
            Err(ValidationFailure::NoDurationBucket)
        );
    }

    #[test]
    fn test_no_active_mill() {
        let session = session_with_client(StockLevels::new(100, 100));
        assert_eq!(
            validate_submission(&session),
            Err(ValidationFailure::NoActiveMill)
        );
        // 规则3不重复报告
        assert_eq!(collect_violations(&session), vec![ValidationFailure::NoActiveMill]);
    }

    #[test]
    fn test_active_but_empty() {
        let mut session = session_with_client(StockLevels::new(100, 100));
        activate(&mut session, "M1", 0, 0);
        assert_eq!(
            validate_submission(&session),
            Err(ValidationFailure::EmptyAllocation)
        );
    }

    #[test]
    fn test_over_allocation_coarse() {
        let mut session = session_with_client(StockLevels::new(50, 50));
        activate(&mut session, "M1", 60, 0);
        assert_eq!(
            validate_submission(&session),
            Err(ValidationFailure::InsufficientStock {
                scope: StockScope::Coarse,
                shortfall: 10
            })
        );
    }

    #[test]
    fn test_total_checked_before_subtypes() {
        let mut session = session_with_client(StockLevels::new(10, 10));
        activate(&mut session, "M1", 30, 0);
        let all = collect_violations(&session);
        assert_eq!(
            all,
            vec![
                ValidationFailure::InsufficientStock {
                    scope: StockScope::Total,
                    shortfall: 10
                },
                ValidationFailure::InsufficientStock {
                    scope: StockScope::Coarse,
                    shortfall: 20
                },
            ]
        );
    }

    #[test]
    fn test_stale_mill_listed_by_name() {
        let mut session = session_with_client(StockLevels::new(100, 100));
        activate(&mut session, "M1", 10, 0);
        activate(&mut session, "M2", 10, 0);
        session.allocation_mut("M2").unwrap().available = false;
        assert_eq!(
            validate_submission(&session),
            Err(ValidationFailure::MillsUnavailable {
                mills: vec!["Molino 2".to_string()]
            })
        );
    }

    #[test]
    fn test_inactive_unavailable_mill_ignored() {
        let mut session = session_with_client(StockLevels::new(100, 100));
        activate(&mut session, "M1", 10, 0);
        session.allocation_mut("M2").unwrap().available = false;
        assert_eq!(validate_submission(&session), Ok(()));
    }

    #[test]
    fn test_capacity_drop_rejected_without_correction() {
        let mut session = session_with_client(StockLevels::new(300, 300));
        activate(&mut session, "M1", 120, 0);
        activate(&mut session, "M2", 50, 0);
        session.allocation_mut("M1").unwrap().capacity = 100;

        assert_eq!(
            validate_submission(&session),
            Err(ValidationFailure::OverCapacity {
                mills: vec!["Molino 1".to_string()]
            })
        );
        assert_eq!(session.allocation("M1").unwrap().coarse_qty, 120);
    }

    #[test]
    fn test_stale_mill_reported_before_capacity() {
        let mut session = session_with_client(StockLevels::new(300, 300));
        activate(&mut session, "M1", 120, 0);
        {
            let m1 = session.allocation_mut("M1").unwrap();
            m1.capacity = 100;
            m1.available = false;
        }
        let all = collect_violations(&session);
        assert!(matches!(all[0], ValidationFailure::MillsUnavailable { .. }));
        assert!(matches!(all[1], ValidationFailure::OverCapacity { .. }));
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ValidationFailure::NoClientSelected.code(), "NO_CLIENT");
        assert_eq!(
            ValidationFailure::MillsUnavailable { mills: vec![] }.code(),
            "MILLS_UNAVAILABLE"
        );
        assert_eq!(
            ValidationFailure::OverCapacity { mills: vec![] }.code(),
            "OVER_CAPACITY"
        );
    }
}
