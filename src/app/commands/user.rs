use crate::app::state::AppState;
use crate::domain::types::UserRole;

use super::common::{invalid_input, map_api_error, page_request};

// ==========================================
// 用户管理相关命令
// ==========================================

fn parse_role(role: &str) -> Result<UserRole, String> {
    UserRole::parse(role).ok_or_else(|| invalid_input(format!("未知角色: {}", role)))
}

pub fn create_user(state: &AppState, username: String, full_name: String, role: String) -> Result<String, String> {
    let role = parse_role(&role)?;
    let result = state
        .user_api
        .create_user(&username, &full_name, role)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn get_user(state: &AppState, user_id: String) -> Result<String, String> {
    let result = state.user_api.get_user(&user_id).map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn update_user(state: &AppState, user_id: String, full_name: String, role: String) -> Result<String, String> {
    let role = parse_role(&role)?;
    let result = state
        .user_api
        .update_user(&user_id, &full_name, role)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn set_user_active(state: &AppState, user_id: String, active: bool) -> Result<String, String> {
    let result = state
        .user_api
        .set_user_active(&user_id, active)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn list_users(state: &AppState, page: Option<u32>, page_size: Option<u32>) -> Result<String, String> {
    let page = page_request(state, page, page_size)?;
    let result = state.user_api.list_users(page).map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}
