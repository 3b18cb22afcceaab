// ==========================================
// 选矿厂运营系统 - 报表 API
// ==========================================
// 职责: 磨矿汇总报表、CSV 导出、车间实时概览
// ==========================================

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::milling_log::MillingLog;
use crate::domain::types::MillStatus;
use crate::engine::report::{MillingReport, ReportEngine};
use crate::repository::client_repo::ClientRepository;
use crate::repository::maintenance_repo::{MaintenanceFilter, MaintenanceRepository};
use crate::repository::mill_repo::MillRepository;
use crate::repository::milling_log_repo::{MillingLogFilter, MillingLogRepository};

/// 车间概览
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantSnapshot {
    pub mills_free: i64,
    pub mills_busy: i64,
    pub mills_maintenance: i64,
    pub total_coarse_stock: i64,
    pub total_fine_stock: i64,
    pub open_maintenance: i64,
}

/// CSV 行
#[derive(Debug, Serialize)]
struct MillingLogCsvRow<'a> {
    log_id: &'a str,
    created_at: String,
    client_id: &'a str,
    mineral_category: &'static str,
    total_coarse: i64,
    total_fine: i64,
    total_units: i64,
    estimated_minutes: u32,
    start_time: &'a str,
    projected_end: &'a str,
    operator: &'a str,
    observations: &'a str,
}

impl<'a> From<&'a MillingLog> for MillingLogCsvRow<'a> {
    fn from(log: &'a MillingLog) -> Self {
        Self {
            log_id: &log.log_id,
            created_at: log.created_at.format(crate::db::TS_FORMAT).to_string(),
            client_id: &log.client_id,
            mineral_category: log.mineral_category.to_db_str(),
            total_coarse: log.total_coarse,
            total_fine: log.total_fine,
            total_units: log.total_units,
            estimated_minutes: log.estimated_minutes,
            start_time: &log.start_time,
            projected_end: log.projected_end.as_deref().unwrap_or(""),
            operator: &log.operator,
            observations: log.observations.as_deref().unwrap_or(""),
        }
    }
}

// ==========================================
// ReportApi - 报表 API
// ==========================================
pub struct ReportApi {
    log_repo: Arc<MillingLogRepository>,
    mill_repo: Arc<MillRepository>,
    client_repo: Arc<ClientRepository>,
    maintenance_repo: Arc<MaintenanceRepository>,
    engine: ReportEngine,
}

impl ReportApi {
    pub fn new(
        log_repo: Arc<MillingLogRepository>,
        mill_repo: Arc<MillRepository>,
        client_repo: Arc<ClientRepository>,
        maintenance_repo: Arc<MaintenanceRepository>,
    ) -> Self {
        Self {
            log_repo,
            mill_repo,
            client_repo,
            maintenance_repo,
            engine: ReportEngine::new(),
        }
    }

    fn fetch_logs(&self, from: NaiveDate, to: NaiveDate, client_id: Option<&str>) -> ApiResult<Vec<MillingLog>> {
        if from > to {
            return Err(ApiError::InvalidInput(format!(
                "日期范围无效: {} 晚于 {}",
                from, to
            )));
        }
        let filter = MillingLogFilter {
            client_id: client_id
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            mineral_category: None,
            date_from: Some(from),
            date_to: Some(to),
        };
        Ok(self.log_repo.list_matching(&filter)?)
    }

    /// 区间汇总（日期闭区间，可限定客户）
    #[instrument(skip(self))]
    pub fn milling_report(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        client_id: Option<&str>,
    ) -> ApiResult<MillingReport> {
        let logs = self.fetch_logs(from, to, client_id)?;
        Ok(self.engine.summarize(&logs))
    }

    /// 导出区间内的磨矿登记为 CSV，返回导出行数
    pub fn export_milling_logs_csv(&self, from: NaiveDate, to: NaiveDate, path: &Path) -> ApiResult<usize> {
        let logs = self.fetch_logs(from, to, None)?;

        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| ApiError::InternalError(format!("无法创建导出文件: {}", e)))?;
        for log in &logs {
            writer
                .serialize(MillingLogCsvRow::from(log))
                .map_err(|e| ApiError::InternalError(format!("写入导出文件失败: {}", e)))?;
        }
        writer
            .flush()
            .map_err(|e| ApiError::InternalError(format!("写入导出文件失败: {}", e)))?;

        info!(rows = logs.len(), path = %path.display(), "磨矿登记已导出");
        Ok(logs.len())
    }

    /// 车间实时概览
    pub fn plant_snapshot(&self) -> ApiResult<PlantSnapshot> {
        let mut snapshot = PlantSnapshot::default();
        for (status, count) in self.mill_repo.count_by_status()? {
            match status {
                MillStatus::Free => snapshot.mills_free = count,
                MillStatus::Busy => snapshot.mills_busy = count,
                MillStatus::Maintenance => snapshot.mills_maintenance = count,
            }
        }

        let (coarse, fine) = self.client_repo.total_stock()?;
        snapshot.total_coarse_stock = coarse;
        snapshot.total_fine_stock = fine;

        snapshot.open_maintenance = self.maintenance_repo.count(&MaintenanceFilter {
            mill_id: None,
            open_only: true,
        })?;
        Ok(snapshot)
    }
}
