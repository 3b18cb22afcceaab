// ==========================================
// 选矿厂运营系统 - 客户与库存领域模型
// ==========================================
// 职责: 客户登记、两类矿石库存
// 红线: 库存只在提交成功后扣减，本地不修改
// ==========================================

use crate::domain::types::{MineralCategory, OreSubtype};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// StockLevels - 库存（粗矿/细矿，单位：袋）
// ==========================================
// 使用有符号整数: 剩余量允许为负（超分配信号）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevels {
    pub coarse: i64,
    pub fine: i64,
}

impl StockLevels {
    pub fn new(coarse: i64, fine: i64) -> Self {
        Self { coarse, fine }
    }

    pub fn total(&self) -> i64 {
        self.coarse + self.fine
    }

    pub fn get(&self, subtype: OreSubtype) -> i64 {
        match subtype {
            OreSubtype::Coarse => self.coarse,
            OreSubtype::Fine => self.fine,
        }
    }
}

// ==========================================
// Client - 客户
// ==========================================
// 对齐: client 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub client_id: String,
    pub name: String,
    pub document_id: Option<String>,     // 证件/税号
    pub phone: Option<String>,
    pub mineral_category: MineralCategory, // 新建分配会话时的默认类别

    // ===== 库存 =====
    pub coarse_stock: i64,
    pub fine_stock: i64,

    // ===== 审计 =====
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Client {
    pub fn new(client_id: String, name: String, mineral_category: MineralCategory) -> Self {
        let now = chrono::Local::now().naive_local();
        Self {
            client_id,
            name,
            document_id: None,
            phone: None,
            mineral_category,
            coarse_stock: 0,
            fine_stock: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn stock(&self) -> StockLevels {
        StockLevels::new(self.coarse_stock, self.fine_stock)
    }
}
