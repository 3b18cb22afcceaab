// ==========================================
// 选矿厂运营系统 - 加工时长表
// ==========================================
// 职责: (矿种类别, 档位勾选) → 预计分钟数; 结束时刻格式化
// 规则: 同一类别多选时，按菜单优先级“先命中者生效”
// ==========================================

use crate::domain::allocation::DurationSelection;
use crate::domain::types::{DurationBucket, MineralCategory};
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// 一天的分钟数（结束时刻按此取模跨零点）
pub const MINUTES_PER_DAY: u32 = 1440;

// ==========================================
// DurationTable - 档位分钟数表
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationTable {
    pub a100_minutes: u32,
    pub a60_minutes: u32,
    pub b120_minutes: u32,
    pub b150_minutes: u32,
}

impl Default for DurationTable {
    fn default() -> Self {
        Self {
            a100_minutes: DurationBucket::A100.default_minutes(),
            a60_minutes: DurationBucket::A60.default_minutes(),
            b120_minutes: DurationBucket::B120.default_minutes(),
            b150_minutes: DurationBucket::B150.default_minutes(),
        }
    }
}

impl DurationTable {
    pub fn minutes_for(&self, bucket: DurationBucket) -> u32 {
        match bucket {
            DurationBucket::A100 => self.a100_minutes,
            DurationBucket::A60 => self.a60_minutes,
            DurationBucket::B120 => self.b120_minutes,
            DurationBucket::B150 => self.b150_minutes,
        }
    }

    /// 解析生效的档位与分钟数
    ///
    /// 其他类别的档位即使被勾选也忽略
    pub fn resolve(
        &self,
        category: MineralCategory,
        selection: &DurationSelection,
    ) -> Option<(DurationBucket, u32)> {
        resolve_bucket(category, selection).map(|bucket| (bucket, self.minutes_for(bucket)))
    }
}

/// 按类别菜单优先级找到第一个被勾选的档位
pub fn resolve_bucket(
    category: MineralCategory,
    selection: &DurationSelection,
) -> Option<DurationBucket> {
    category
        .duration_menu()
        .iter()
        .copied()
        .find(|bucket| selection.is_selected(*bucket))
}

/// 结束时刻 = 开始时刻 + 分钟数，24 小时制 HH:MM，跨零点取模
pub fn format_end_time(start: NaiveTime, minutes: u32) -> String {
    let start_minutes = start.hour() * 60 + start.minute();
    let end = (start_minutes + minutes % MINUTES_PER_DAY) % MINUTES_PER_DAY;
    format!("{:02}:{:02}", end / 60, end % 60)
}

/// 解析 HH:MM 格式时刻
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}
