// ==========================================
// 选矿厂运营系统 - 核心库
// ==========================================
// 职责: 客户库存、磨机分配排产、维修、报表
// 技术栈: Rust + SQLite
// 分层: domain → repository → engine → api → app
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 分配计算与校验
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 命令桥
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DurationBucket, MillStatus, MineralCategory, OreSubtype};

// 领域实体
pub use domain::{
    AllocationCommand, AllocationSession, Client, MaintenanceRecord, Mill, MillingLog, User,
};

// 引擎
pub use engine::{AllocationEngine, DurationTable, ReportEngine};

// API
pub use api::{AllocationApi, ApiError, ApiResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "选矿厂运营系统";
