// ==========================================
// 选矿厂运营系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod client_repo;
pub mod error;
pub mod maintenance_repo;
pub mod mill_repo;
pub mod milling_log_repo;
pub mod ports;
pub mod query;
pub mod submission_repo;
pub mod user_repo;

// 重导出核心仓储
pub use client_repo::{ClientFilter, ClientRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use maintenance_repo::{MaintenanceFilter, MaintenanceRepository};
pub use mill_repo::MillRepository;
pub use milling_log_repo::{MillingLogFilter, MillingLogRepository};
pub use ports::{ClientDirectory, MillDirectory, MillingLogSink};
pub use submission_repo::SubmissionRepository;
pub use user_repo::UserRepository;
