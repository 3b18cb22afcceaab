// ==========================================
// 选矿厂运营系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod allocation;
pub mod client;
pub mod maintenance;
pub mod mill;
pub mod milling_log;
pub mod types;
pub mod user;

// 重导出核心类型
pub use allocation::{
    AllocationCommand, AllocationSession, ClientSnapshot, DurationSelection, MillAllocation,
};
pub use client::{Client, StockLevels};
pub use maintenance::MaintenanceRecord;
pub use mill::Mill;
pub use milling_log::{MillBreakdownEntry, MillLoad, MillingLog, MillingSubmission};
pub use types::{
    DurationBucket, MaintenanceKind, MillStatus, MineralCategory, OreSubtype, Page, PageRequest,
    UserRole,
};
pub use user::User;
