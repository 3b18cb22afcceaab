// ==========================================
// 选矿厂运营系统 - 用户登记
// ==========================================
// 说明: 仅作为操作人登记，不涉及认证
// ==========================================

use crate::domain::types::UserRole;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// 对齐: app_user 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub full_name: String,
    pub role: UserRole,
    pub active: bool,
    pub created_at: NaiveDateTime,
}
