// ==========================================
// 选矿厂运营系统 - 领域类型定义
// ==========================================
// 职责: 矿种类别、时长档位、矿石子类、磨机状态等枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 矿种类别 (Mineral Category)
// ==========================================
// 每个类别有自己固定的加工时长档位菜单
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MineralCategory {
    A,
    B,
}

impl MineralCategory {
    /// 该类别的时长档位菜单（按优先级排列，多选时靠前者生效）
    pub fn duration_menu(&self) -> &'static [DurationBucket] {
        match self {
            MineralCategory::A => &[DurationBucket::A100, DurationBucket::A60],
            MineralCategory::B => &[DurationBucket::B120, DurationBucket::B150],
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Some(MineralCategory::A),
            "B" => Some(MineralCategory::B),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            MineralCategory::A => "A",
            MineralCategory::B => "B",
        }
    }
}

impl fmt::Display for MineralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 时长档位 (Duration Bucket)
// ==========================================
// 档位名称即默认分钟数; 实际分钟数可由配置覆写
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DurationBucket {
    A100, // A类 100 分钟
    A60,  // A类 60 分钟
    B120, // B类 120 分钟
    B150, // B类 150 分钟
}

impl DurationBucket {
    /// 档位所属矿种类别
    pub fn category(&self) -> MineralCategory {
        match self {
            DurationBucket::A100 | DurationBucket::A60 => MineralCategory::A,
            DurationBucket::B120 | DurationBucket::B150 => MineralCategory::B,
        }
    }

    /// 出厂默认分钟数
    pub fn default_minutes(&self) -> u32 {
        match self {
            DurationBucket::A100 => 100,
            DurationBucket::A60 => 60,
            DurationBucket::B120 => 120,
            DurationBucket::B150 => 150,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A100" => Some(DurationBucket::A100),
            "A60" => Some(DurationBucket::A60),
            "B120" => Some(DurationBucket::B120),
            "B150" => Some(DurationBucket::B150),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            DurationBucket::A100 => "A100",
            DurationBucket::A60 => "A60",
            DurationBucket::B120 => "B120",
            DurationBucket::B150 => "B150",
        }
    }
}

impl fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 矿石子类 (Ore Subtype)
// ==========================================
// 库存与磨机分配均按两个子类分别计数（袋）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OreSubtype {
    Coarse, // 粗矿
    Fine,   // 细矿
}

impl fmt::Display for OreSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OreSubtype::Coarse => write!(f, "COARSE"),
            OreSubtype::Fine => write!(f, "FINE"),
        }
    }
}

// ==========================================
// 磨机状态 (Mill Status)
// ==========================================
// 只有 FREE 状态的磨机可参与分配
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MillStatus {
    Free,        // 空闲
    Busy,        // 运行中
    Maintenance, // 维修中
}

impl MillStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "FREE" => Some(MillStatus::Free),
            "BUSY" => Some(MillStatus::Busy),
            "MAINTENANCE" => Some(MillStatus::Maintenance),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            MillStatus::Free => "FREE",
            MillStatus::Busy => "BUSY",
            MillStatus::Maintenance => "MAINTENANCE",
        }
    }
}

impl fmt::Display for MillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 维修类型 (Maintenance Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceKind {
    Preventive, // 预防性维修
    Corrective, // 故障维修
}

impl MaintenanceKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PREVENTIVE" => Some(MaintenanceKind::Preventive),
            "CORRECTIVE" => Some(MaintenanceKind::Corrective),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            MaintenanceKind::Preventive => "PREVENTIVE",
            MaintenanceKind::Corrective => "CORRECTIVE",
        }
    }
}

impl fmt::Display for MaintenanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 用户角色 (User Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Operator,
    Viewer,
}

impl UserRole {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Some(UserRole::Admin),
            "OPERATOR" => Some(UserRole::Operator),
            "VIEWER" => Some(UserRole::Viewer),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Operator => "OPERATOR",
            UserRole::Viewer => "VIEWER",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 分页 (Pagination)
// ==========================================

/// 单页最大条数
pub const MAX_PAGE_SIZE: u32 = 200;

/// 分页请求（页码从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// 创建分页请求，页码与页大小会被规整到合法范围
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.page_size as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

/// 分页结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
        }
    }

    /// 总页数
    pub fn total_pages(&self) -> i64 {
        if self.total <= 0 {
            return 0;
        }
        (self.total + self.page_size as i64 - 1) / self.page_size as i64
    }
}
