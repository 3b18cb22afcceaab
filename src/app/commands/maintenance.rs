use crate::app::state::AppState;
use crate::domain::types::MaintenanceKind;
use crate::repository::maintenance_repo::MaintenanceFilter;

use super::common::{invalid_input, map_api_error, page_request};

// ==========================================
// 维修管理相关命令
// ==========================================

pub fn start_maintenance(
    state: &AppState,
    mill_id: String,
    kind: String,
    description: String,
    technician: String,
) -> Result<String, String> {
    let kind = MaintenanceKind::parse(&kind)
        .ok_or_else(|| invalid_input(format!("未知维修类型: {}", kind)))?;
    let result = state
        .maintenance_api
        .start_maintenance(&mill_id, kind, &description, &technician)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn finish_maintenance(
    state: &AppState,
    maintenance_id: String,
    notes: Option<String>,
) -> Result<String, String> {
    let result = state
        .maintenance_api
        .finish_maintenance(&maintenance_id, notes.as_deref())
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn get_maintenance(state: &AppState, maintenance_id: String) -> Result<String, String> {
    let result = state
        .maintenance_api
        .get_maintenance(&maintenance_id)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn list_maintenance(
    state: &AppState,
    mill_id: Option<String>,
    open_only: Option<bool>,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<String, String> {
    let filter = MaintenanceFilter {
        mill_id: mill_id.filter(|m| !m.trim().is_empty()),
        open_only: open_only.unwrap_or(false),
    };
    let page = page_request(state, page, page_size)?;
    let result = state
        .maintenance_api
        .list_maintenance(&filter, page)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}
