// ==========================================
// 选矿厂运营系统 - 应用层
// ==========================================
// 职责: 命令桥，连接前端与后端
// ==========================================

pub mod commands;
pub mod dispatch;
pub mod state;

// 重导出
pub use dispatch::{dispatch, CommandRequest};
pub use state::{get_default_db_path, AppState};
