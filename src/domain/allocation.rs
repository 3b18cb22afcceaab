// ==========================================
// 选矿厂运营系统 - 磨矿分配会话模型
// ==========================================
// 职责: 分配界面的工作状态（客户、矿种、档位、各磨机分配）
// 红线: 会话对象只存在于内存，不直接持久化
// 说明: 派生字段由 engine::allocation 统一重算
// ==========================================

use crate::domain::client::{Client, StockLevels};
use crate::domain::mill::Mill;
use crate::domain::types::{DurationBucket, MineralCategory, OreSubtype};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// MillAllocation - 单台磨机的分配
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MillAllocation {
    // ===== 磨机快照 =====
    pub mill_id: String,
    pub mill_name: String,
    pub capacity: u32,
    pub available: bool, // 最近一次读取的磨机状态镜像（FREE 才为 true）

    // ===== 用户输入 =====
    pub active: bool,
    pub coarse_qty: u32,
    pub fine_qty: u32,

    // ===== 派生字段 =====
    pub total: u32,
    pub estimated_minutes: u32,
    pub projected_end: Option<String>,
}

impl MillAllocation {
    /// 由磨机目录记录创建（初始为未激活）
    pub fn from_mill(mill: &Mill) -> Self {
        Self {
            mill_id: mill.mill_id.clone(),
            mill_name: mill.name.clone(),
            capacity: mill.capacity_sacks,
            available: mill.is_available(),
            active: false,
            coarse_qty: 0,
            fine_qty: 0,
            total: 0,
            estimated_minutes: 0,
            projected_end: None,
        }
    }

    /// 清零输入与派生字段（切回未激活时调用）
    pub fn clear(&mut self) {
        self.active = false;
        self.coarse_qty = 0;
        self.fine_qty = 0;
        self.total = 0;
        self.estimated_minutes = 0;
        self.projected_end = None;
    }
}

// ==========================================
// DurationSelection - 时长档位勾选
// ==========================================
// 允许同时勾选多个档位；生效规则见 engine::duration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationSelection {
    selected: BTreeSet<DurationBucket>,
}

impl DurationSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(buckets: &[DurationBucket]) -> Self {
        Self {
            selected: buckets.iter().copied().collect(),
        }
    }

    pub fn set(&mut self, bucket: DurationBucket, selected: bool) {
        if selected {
            self.selected.insert(bucket);
        } else {
            self.selected.remove(&bucket);
        }
    }

    pub fn is_selected(&self, bucket: DurationBucket) -> bool {
        self.selected.contains(&bucket)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &DurationBucket> {
        self.selected.iter()
    }
}

// ==========================================
// ClientSnapshot - 选择客户时读取的快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSnapshot {
    pub client_id: String,
    pub name: String,
    pub mineral_category: MineralCategory,
    pub stock: StockLevels,
}

impl From<&Client> for ClientSnapshot {
    fn from(client: &Client) -> Self {
        Self {
            client_id: client.client_id.clone(),
            name: client.name.clone(),
            mineral_category: client.mineral_category,
            stock: client.stock(),
        }
    }
}

// ==========================================
// AllocationSession - 分配会话
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSession {
    pub session_id: String,

    // ===== 客户 =====
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub available_stock: StockLevels, // 选择客户时读取，本地不修改

    // ===== 加工参数 =====
    pub mineral_category: MineralCategory,
    pub duration_selection: DurationSelection,
    pub start_time: NaiveTime,

    // ===== 各磨机分配（按磨机目录顺序） =====
    pub allocations: Vec<MillAllocation>,

    pub observations: String,
}

impl AllocationSession {
    /// 由磨机目录初始化会话
    pub fn new(session_id: String, mills: &[Mill], start_time: NaiveTime) -> Self {
        Self {
            session_id,
            client_id: None,
            client_name: None,
            available_stock: StockLevels::default(),
            mineral_category: MineralCategory::A,
            duration_selection: DurationSelection::new(),
            start_time,
            allocations: mills.iter().map(MillAllocation::from_mill).collect(),
            observations: String::new(),
        }
    }

    pub fn allocation(&self, mill_id: &str) -> Option<&MillAllocation> {
        self.allocations.iter().find(|a| a.mill_id == mill_id)
    }

    pub fn allocation_mut(&mut self, mill_id: &str) -> Option<&mut MillAllocation> {
        self.allocations.iter_mut().find(|a| a.mill_id == mill_id)
    }

    pub fn active_allocations(&self) -> impl Iterator<Item = &MillAllocation> {
        self.allocations.iter().filter(|a| a.active)
    }
}

// ==========================================
// AllocationCommand - 会话状态变更事件
// ==========================================
// 每个事件应用后，派生字段全量重算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationCommand {
    SelectClient { client: ClientSnapshot },
    ClearClient,
    SetMineralCategory { category: MineralCategory },
    SetBucket { bucket: DurationBucket, selected: bool },
    SetStartTime { start_time: NaiveTime },
    SetMillActive { mill_id: String, active: bool },
    ToggleMill { mill_id: String },
    SetQuantity { mill_id: String, subtype: OreSubtype, quantity: u32 },
    Replicate { source_mill_id: String },
    SyncMills { mills: Vec<Mill> },
    SetObservations { text: String },
    Reset,
}
