// ==========================================
// 选矿厂运营系统 - 配置层
// ==========================================
// 职责: 系统配置管理（加工时长、分配上限、分页、语言）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
