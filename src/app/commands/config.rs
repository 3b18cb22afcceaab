use crate::app::state::AppState;

use super::common::map_api_error;

// ==========================================
// 配置管理相关命令
// ==========================================

/// 查询所有配置（生效值）
pub fn list_configs(state: &AppState) -> Result<String, String> {
    let result = state.config_api.list_configs().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

/// 查询单个配置
pub fn get_config(state: &AppState, key: String) -> Result<String, String> {
    let result = state.config_api.get_config(&key).map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

/// 更新配置
pub fn update_config(state: &AppState, key: String, value: String) -> Result<String, String> {
    state
        .config_api
        .update_config(&key, &value)
        .map_err(map_api_error)?;

    serde_json::to_string(&serde_json::json!({ "key": key, "value": value }))
        .map_err(|e| format!("序列化失败: {}", e))
}

pub fn get_config_snapshot(state: &AppState) -> Result<String, String> {
    state.config_api.get_config_snapshot().map_err(map_api_error)
}

pub fn restore_config_from_snapshot(state: &AppState, snapshot_json: String) -> Result<String, String> {
    let count = state
        .config_api
        .restore_config_from_snapshot(&snapshot_json)
        .map_err(map_api_error)?;

    serde_json::to_string(&serde_json::json!({ "restored": count }))
        .map_err(|e| format!("序列化失败: {}", e))
}
