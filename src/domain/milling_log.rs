// ==========================================
// 选矿厂运营系统 - 磨矿登记记录
// ==========================================
// 职责: 每次提交的分配汇总 + 分磨机明细（JSON）
// 红线: 只写不改
// ==========================================

use crate::domain::types::MineralCategory;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// MillBreakdownEntry - 分磨机明细
// ==========================================
// 存储于 milling_log.breakdown_json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MillBreakdownEntry {
    pub mill_id: String,
    pub mill_name: String,
    pub coarse: u32,
    pub fine: u32,
    pub total: u32,
    pub estimated_minutes: u32,
    pub projected_end: Option<String>,
}

// ==========================================
// MillingLog - 磨矿登记
// ==========================================
// 对齐: milling_log 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MillingLog {
    pub log_id: String,
    pub client_id: String,
    pub mineral_category: MineralCategory,

    // ===== 汇总 =====
    pub total_coarse: i64,
    pub total_fine: i64,
    pub total_units: i64,

    // ===== 时间 =====
    pub estimated_minutes: u32,
    pub start_time: String,            // HH:MM
    pub projected_end: Option<String>, // HH:MM

    // ===== 明细 =====
    pub breakdown_json: serde_json::Value,
    pub observations: Option<String>,

    // ===== 审计 =====
    pub operator: String,
    pub created_at: NaiveDateTime,
}

impl MillingLog {
    /// 解析分磨机明细
    pub fn breakdown(&self) -> Result<Vec<MillBreakdownEntry>, serde_json::Error> {
        serde_json::from_value(self.breakdown_json.clone())
    }
}

// ==========================================
// MillingSubmission - 待落库的一次提交
// ==========================================
// 落库时在同一事务内: 写登记、扣减库存、占用磨机
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MillingSubmission {
    pub log: MillingLog,
    pub mill_loads: Vec<MillLoad>,
}

/// 单台磨机的占用量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MillLoad {
    pub mill_id: String,
    pub sacks: u32,
}

impl MillingSubmission {
    /// 需扣减的客户库存 (粗矿, 细矿)
    pub fn required_stock(&self) -> (i64, i64) {
        (self.log.total_coarse, self.log.total_fine)
    }
}
