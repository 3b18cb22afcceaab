// ==========================================
// 选矿厂运营系统 - 引擎层
// ==========================================
// 职责: 分配计算、提交校验、报表汇总
// 红线: Engine 不拼 SQL，不做 I/O
// ==========================================

pub mod allocation;
pub mod duration;
pub mod report;
pub mod validation;

// 重导出核心引擎
pub use allocation::{
    allocated_stock, replicate_allocation, AllocationEngine, AllocationError, AllocationTotals,
    MillTotalsRow,
};
pub use duration::{format_end_time, parse_hhmm, resolve_bucket, DurationTable};
pub use report::{MillingReport, ReportEngine, ReportTotals};
pub use validation::{collect_violations, validate_submission, StockScope, ValidationFailure};
