// ==========================================
// 选矿厂运营系统 - 磨机领域模型
// ==========================================
// 职责: 磨机目录（容量、状态、当前占用客户）
// 红线: 只有 FREE 状态的磨机可以被分配
// ==========================================

use crate::domain::types::MillStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Mill - 磨机
// ==========================================
// 对齐: mill 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mill {
    // ===== 主键 =====
    pub mill_id: String,             // 磨机ID
    pub name: String,                // 显示名称

    // ===== 产能 =====
    pub capacity_sacks: u32,         // 单次加工容量（袋）

    // ===== 状态 =====
    pub status: MillStatus,          // 当前状态
    pub occupant_client_id: Option<String>, // 占用客户（BUSY 时）
    pub occupant_sacks: u32,         // 占用袋数（BUSY 时）
    pub busy_since: Option<NaiveDateTime>,  // 开始运行时间

    // ===== 审计 =====
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Mill {
    /// 创建新的空闲磨机
    pub fn new(mill_id: String, name: String, capacity_sacks: u32) -> Self {
        let now = chrono::Local::now().naive_local();
        Self {
            mill_id,
            name,
            capacity_sacks,
            status: MillStatus::Free,
            occupant_client_id: None,
            occupant_sacks: 0,
            busy_since: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 是否可参与分配
    pub fn is_available(&self) -> bool {
        self.status == MillStatus::Free
    }
}
