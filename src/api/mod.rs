// ==========================================
// 选矿厂运营系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令桥调用
// ==========================================

pub mod allocation_api;
pub mod client_api;
pub mod config_api;
pub mod error;
pub mod maintenance_api;
pub mod mill_api;
pub mod report_api;
pub mod session_store;
pub mod user_api;

// 重导出核心类型
pub use allocation_api::{
    AllocationApi, AllocationView, SubmissionReceipt, ValidationIssue, ValidationReport,
};
pub use client_api::{ClientApi, ClientInput};
pub use config_api::{ConfigApi, ConfigItem};
pub use error::{ApiError, ApiResult};
pub use maintenance_api::MaintenanceApi;
pub use mill_api::MillApi;
pub use report_api::{PlantSnapshot, ReportApi};
pub use session_store::SessionStore;
pub use user_api::UserApi;
