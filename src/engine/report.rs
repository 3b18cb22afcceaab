// ==========================================
// 选矿厂运营系统 - 报表汇总引擎
// ==========================================
// 职责: 对已读取的磨矿登记做汇总（总计/按客户/按类别/按日/按磨机）
// 红线: 纯汇总，不访问数据库
// ==========================================

use crate::domain::milling_log::MillingLog;
use crate::domain::types::MineralCategory;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{instrument, warn};

// ==========================================
// 汇总结构
// ==========================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    pub runs: i64,
    pub coarse: i64,
    pub fine: i64,
    pub units: i64,
    pub processing_minutes: i64,
}

impl ReportTotals {
    fn add(&mut self, log: &MillingLog) {
        self.runs += 1;
        self.coarse += log.total_coarse;
        self.fine += log.total_fine;
        self.units += log.total_units;
        self.processing_minutes += log.estimated_minutes as i64;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub client_id: String,
    pub totals: ReportTotals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub mineral_category: MineralCategory,
    pub totals: ReportTotals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub totals: ReportTotals,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MillSummary {
    pub mill_id: String,
    pub mill_name: String,
    pub runs: i64,
    pub sacks: i64,
    pub busy_minutes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MillingReport {
    pub totals: ReportTotals,
    pub by_client: Vec<ClientSummary>,
    pub by_category: Vec<CategorySummary>,
    pub by_day: Vec<DaySummary>,
    pub by_mill: Vec<MillSummary>,
    pub skipped_breakdowns: usize, // 明细 JSON 无法解析的记录数
}

// ==========================================
// ReportEngine - 报表汇总引擎
// ==========================================
#[derive(Debug, Default)]
pub struct ReportEngine;

impl ReportEngine {
    pub fn new() -> Self {
        Self
    }

    /// 汇总磨矿登记
    ///
    /// 排序: 客户按袋数降序（同量按ID升序）；类别、日期、磨机按键升序
    #[instrument(skip(self, logs), fields(count = logs.len()))]
    pub fn summarize(&self, logs: &[MillingLog]) -> MillingReport {
        let mut totals = ReportTotals::default();
        let mut by_client: BTreeMap<String, ReportTotals> = BTreeMap::new();
        let mut by_category: BTreeMap<MineralCategory, ReportTotals> = BTreeMap::new();
        let mut by_day: BTreeMap<NaiveDate, ReportTotals> = BTreeMap::new();
        let mut by_mill: BTreeMap<String, MillSummary> = BTreeMap::new();
        let mut skipped_breakdowns = 0;

        for log in logs {
            totals.add(log);
            by_client.entry(log.client_id.clone()).or_default().add(log);
            by_category.entry(log.mineral_category).or_default().add(log);
            by_day.entry(log.created_at.date()).or_default().add(log);

            match log.breakdown() {
                Ok(entries) => {
                    for entry in entries {
                        let summary = by_mill.entry(entry.mill_id.clone()).or_insert_with(|| {
                            MillSummary {
                                mill_id: entry.mill_id.clone(),
                                ..MillSummary::default()
                            }
                        });
                        summary.mill_name = entry.mill_name.clone();
                        summary.runs += 1;
                        summary.sacks += entry.total as i64;
                        summary.busy_minutes += entry.estimated_minutes as i64;
                    }
                }
                Err(e) => {
                    warn!(log_id = %log.log_id, error = %e, "磨机明细解析失败，已跳过");
                    skipped_breakdowns += 1;
                }
            }
        }

        let mut by_client: Vec<ClientSummary> = by_client
            .into_iter()
            .map(|(client_id, totals)| ClientSummary { client_id, totals })
            .collect();
        by_client.sort_by(|a, b| {
            b.totals
                .units
                .cmp(&a.totals.units)
                .then_with(|| a.client_id.cmp(&b.client_id))
        });

        MillingReport {
            totals,
            by_client,
            by_category: by_category
                .into_iter()
                .map(|(mineral_category, totals)| CategorySummary {
                    mineral_category,
                    totals,
                })
                .collect(),
            by_day: by_day
                .into_iter()
                .map(|(date, totals)| DaySummary { date, totals })
                .collect(),
            by_mill: by_mill.into_values().collect(),
            skipped_breakdowns,
        }
    }
}
