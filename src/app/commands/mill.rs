use crate::app::state::AppState;

use super::common::{map_api_error, page_request, parse_mill_status};

// ==========================================
// 磨机管理相关命令
// ==========================================

pub fn create_mill(state: &AppState, mill_id: String, name: String, capacity_sacks: u32) -> Result<String, String> {
    let result = state
        .mill_api
        .create_mill(&mill_id, &name, capacity_sacks)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn get_mill(state: &AppState, mill_id: String) -> Result<String, String> {
    let result = state.mill_api.get_mill(&mill_id).map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn update_mill(state: &AppState, mill_id: String, name: String, capacity_sacks: u32) -> Result<String, String> {
    let result = state
        .mill_api
        .update_mill(&mill_id, &name, capacity_sacks)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn delete_mill(state: &AppState, mill_id: String) -> Result<String, String> {
    state.mill_api.delete_mill(&mill_id).map_err(map_api_error)?;

    serde_json::to_string(&serde_json::json!({ "deleted": mill_id }))
        .map_err(|e| format!("序列化失败: {}", e))
}

pub fn list_mills(
    state: &AppState,
    status: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<String, String> {
    let status = parse_mill_status(status.as_deref())?;
    let page = page_request(state, page, page_size)?;
    let result = state.mill_api.list_mills(status, page).map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn list_available_mills(state: &AppState) -> Result<String, String> {
    let result = state.mill_api.list_available().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

/// 磨矿结束，释放磨机
pub fn release_mill(state: &AppState, mill_id: String) -> Result<String, String> {
    let result = state.mill_api.release_mill(&mill_id).map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}
