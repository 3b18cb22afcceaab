// ==========================================
// 选矿厂运营系统 - 磨机维修记录
// ==========================================
// 职责: 维修开始/结束登记
// 红线: 维修期间磨机状态为 MAINTENANCE，不可分配
// ==========================================

use crate::domain::types::MaintenanceKind;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// MaintenanceRecord - 维修记录
// ==========================================
// 对齐: maintenance_record 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub maintenance_id: String,
    pub mill_id: String,
    pub kind: MaintenanceKind,
    pub description: String,
    pub technician: String,
    pub started_at: NaiveDateTime,
    pub finished_at: Option<NaiveDateTime>, // None 表示进行中
    pub notes: Option<String>,
}

impl MaintenanceRecord {
    pub fn is_open(&self) -> bool {
        self.finished_at.is_none()
    }

    /// 维修时长（分钟），进行中返回 None
    pub fn duration_minutes(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_minutes())
    }
}
