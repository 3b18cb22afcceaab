// ==========================================
// 选矿厂运营系统 - 维修管理 API
// ==========================================
// 职责: 开始/结束维修（联动磨机状态）、维修记录查询
// ==========================================

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::maintenance::MaintenanceRecord;
use crate::domain::types::{MaintenanceKind, Page, PageRequest};
use crate::repository::maintenance_repo::{MaintenanceFilter, MaintenanceRepository};

pub struct MaintenanceApi {
    maintenance_repo: Arc<MaintenanceRepository>,
}

impl MaintenanceApi {
    pub fn new(maintenance_repo: Arc<MaintenanceRepository>) -> Self {
        Self { maintenance_repo }
    }

    /// 开始维修
    ///
    /// # 前置条件
    /// - 磨机为 FREE（运行中的磨机须先释放）
    pub fn start_maintenance(
        &self,
        mill_id: &str,
        kind: MaintenanceKind,
        description: &str,
        technician: &str,
    ) -> ApiResult<MaintenanceRecord> {
        if mill_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("磨机ID不能为空".to_string()));
        }
        if description.trim().is_empty() {
            return Err(ApiError::InvalidInput("维修说明不能为空".to_string()));
        }
        if technician.trim().is_empty() {
            return Err(ApiError::InvalidInput("维修人员不能为空".to_string()));
        }

        let record = MaintenanceRecord {
            maintenance_id: Uuid::new_v4().to_string(),
            mill_id: mill_id.trim().to_string(),
            kind,
            description: description.trim().to_string(),
            technician: technician.trim().to_string(),
            started_at: chrono::Local::now().naive_local(),
            finished_at: None,
            notes: None,
        };
        self.maintenance_repo.start(&record)?;

        info!(
            maintenance_id = %record.maintenance_id,
            mill_id = %record.mill_id,
            kind = %record.kind,
            "维修开始"
        );
        Ok(record)
    }

    /// 结束维修，磨机回到 FREE
    pub fn finish_maintenance(&self, maintenance_id: &str, notes: Option<&str>) -> ApiResult<MaintenanceRecord> {
        if maintenance_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("维修记录ID不能为空".to_string()));
        }
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());
        let record = self.maintenance_repo.finish(
            maintenance_id,
            chrono::Local::now().naive_local(),
            notes,
        )?;

        info!(
            maintenance_id = %maintenance_id,
            mill_id = %record.mill_id,
            minutes = record.duration_minutes().unwrap_or(0),
            "维修结束"
        );
        Ok(record)
    }

    pub fn get_maintenance(&self, maintenance_id: &str) -> ApiResult<MaintenanceRecord> {
        self.maintenance_repo
            .find_by_id(maintenance_id)?
            .ok_or_else(|| ApiError::NotFound(format!("MaintenanceRecord(id={})不存在", maintenance_id)))
    }

    pub fn list_maintenance(
        &self,
        filter: &MaintenanceFilter,
        page: PageRequest,
    ) -> ApiResult<Page<MaintenanceRecord>> {
        Ok(self.maintenance_repo.list(filter, page)?)
    }
}
