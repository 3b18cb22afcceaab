use crate::api::client_api::ClientInput;
use crate::app::state::AppState;
use crate::repository::client_repo::ClientFilter;

use super::common::{map_api_error, page_request, parse_category};

// ==========================================
// 客户管理相关命令
// ==========================================

pub fn create_client(state: &AppState, input: ClientInput) -> Result<String, String> {
    let result = state.client_api.create_client(&input).map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn get_client(state: &AppState, client_id: String) -> Result<String, String> {
    let result = state.client_api.get_client(&client_id).map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn update_client(state: &AppState, client_id: String, input: ClientInput) -> Result<String, String> {
    let result = state
        .client_api
        .update_client(&client_id, &input)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn delete_client(state: &AppState, client_id: String) -> Result<String, String> {
    state.client_api.delete_client(&client_id).map_err(map_api_error)?;

    serde_json::to_string(&serde_json::json!({ "deleted": client_id }))
        .map_err(|e| format!("序列化失败: {}", e))
}

pub fn list_clients(
    state: &AppState,
    name_contains: Option<String>,
    mineral_category: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<String, String> {
    let filter = ClientFilter {
        name_contains,
        mineral_category: parse_category(mineral_category.as_deref())?,
    };
    let page = page_request(state, page, page_size)?;
    let result = state.client_api.list_clients(&filter, page).map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

/// 入库
pub fn receive_client_stock(state: &AppState, client_id: String, coarse: i64, fine: i64) -> Result<String, String> {
    let result = state
        .client_api
        .receive_stock(&client_id, coarse, fine)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

/// 盘点
pub fn adjust_client_stock(state: &AppState, client_id: String, coarse: i64, fine: i64) -> Result<String, String> {
    let result = state
        .client_api
        .adjust_stock(&client_id, coarse, fine)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}
