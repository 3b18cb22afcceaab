// ==========================================
// 选矿厂运营系统 - 前端命令（按域拆分）
// ==========================================
// 职责: 命令定义,连接前端与后端 API
// 约定: 成功返回 JSON 字符串；失败返回 ErrorResponse JSON
// ==========================================

mod allocation;
mod client;
mod common;
mod config;
mod maintenance;
mod mill;
mod report;
mod user;

pub use allocation::*;
pub use client::*;
pub use common::{map_api_error, ErrorResponse};
pub use config::*;
pub use maintenance::*;
pub use mill::*;
pub use report::*;
pub use user::*;
