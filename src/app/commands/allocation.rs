use crate::app::state::AppState;
use crate::domain::allocation::AllocationCommand;
use crate::repository::milling_log_repo::MillingLogFilter;

use super::common::{map_api_error, page_request, parse_category, parse_opt_date, parse_time};

// ==========================================
// 磨矿分配相关命令
// ==========================================

/// 新建分配会话（start_time 为 HH:MM，缺省取当前时刻）
pub fn open_allocation_session(state: &AppState, start_time: Option<String>) -> Result<String, String> {
    let start_time = match start_time.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(s) => Some(parse_time(s)?),
        None => None,
    };
    let result = state
        .allocation_api
        .open_session(start_time)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn get_allocation_session(state: &AppState, session_id: String) -> Result<String, String> {
    let result = state
        .allocation_api
        .get_session(&session_id)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn close_allocation_session(state: &AppState, session_id: String) -> Result<String, String> {
    let closed = state
        .allocation_api
        .close_session(&session_id)
        .map_err(map_api_error)?;

    serde_json::to_string(&serde_json::json!({ "closed": closed }))
        .map_err(|e| format!("序列化失败: {}", e))
}

/// 应用界面命令（勾选磨机、输入袋数、复制分配等）
pub fn apply_allocation_command(
    state: &AppState,
    session_id: String,
    command: AllocationCommand,
) -> Result<String, String> {
    let result = state
        .allocation_api
        .apply_command(&session_id, command)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn select_allocation_client(
    state: &AppState,
    session_id: String,
    client_id: String,
) -> Result<String, String> {
    let result = state
        .allocation_api
        .select_client(&session_id, &client_id)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn refresh_allocation_mills(state: &AppState, session_id: String) -> Result<String, String> {
    let result = state
        .allocation_api
        .refresh_mills(&session_id)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn validate_allocation(state: &AppState, session_id: String) -> Result<String, String> {
    let result = state
        .allocation_api
        .validate(&session_id)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

/// 提交分配
pub fn submit_allocation(state: &AppState, session_id: String, operator: String) -> Result<String, String> {
    let result = state
        .allocation_api
        .submit(&session_id, &operator)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn get_milling_log(state: &AppState, log_id: String) -> Result<String, String> {
    let result = state
        .allocation_api
        .get_log(&log_id)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

/// 查询磨矿登记（日期为 YYYY-MM-DD，闭区间）
#[allow(clippy::too_many_arguments)]
pub fn list_milling_logs(
    state: &AppState,
    client_id: Option<String>,
    mineral_category: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<String, String> {
    let filter = MillingLogFilter {
        client_id: client_id.filter(|c| !c.trim().is_empty()),
        mineral_category: parse_category(mineral_category.as_deref())?,
        date_from: parse_opt_date(date_from.as_deref())?,
        date_to: parse_opt_date(date_to.as_deref())?,
    };
    let page = page_request(state, page, page_size)?;

    let result = state
        .allocation_api
        .list_logs(&filter, page)
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}
