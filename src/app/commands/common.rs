use crate::api::error::ApiError;
use crate::app::state::AppState;
use crate::domain::types::{MillStatus, MineralCategory, PageRequest};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

// ==========================================
// 公共工具：错误映射、日期/时刻解析
// ==========================================

/// 错误响应（返回给前端，作为提示框内容）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// 错误消息
    pub message: String,

    /// 详细信息（可选）
    pub details: Option<serde_json::Value>,
}

/// 将ApiError转换为JSON字符串
pub fn map_api_error(err: ApiError) -> String {
    let error_response = ErrorResponse {
        code: err.code().to_string(),
        message: err.to_string(),
        details: match &err {
            ApiError::StaleAvailability { mills } => Some(serde_json::json!({ "mills": mills })),
            ApiError::InvalidStateTransition { from, to } => {
                Some(serde_json::json!({ "from": from, "to": to }))
            }
            _ => None,
        },
    };

    serde_json::to_string(&error_response).unwrap_or_else(|_| err.to_string())
}

/// 参数错误统一走 INVALID_INPUT
pub(super) fn invalid_input(message: String) -> String {
    map_api_error(ApiError::InvalidInput(message))
}

/// 解析日期字符串
pub(super) fn parse_date(date_str: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .map_err(|e| invalid_input(format!("日期格式错误（应为YYYY-MM-DD）: {}", e)))
}

pub(super) fn parse_opt_date(date_str: Option<&str>) -> Result<Option<NaiveDate>, String> {
    date_str
        .filter(|s| !s.trim().is_empty())
        .map(parse_date)
        .transpose()
}

/// 解析时刻字符串（HH:MM）
pub(super) fn parse_time(time_str: &str) -> Result<NaiveTime, String> {
    crate::engine::duration::parse_hhmm(time_str)
        .ok_or_else(|| invalid_input(format!("时刻格式错误（应为HH:MM）: {}", time_str)))
}

/// 分页参数（未传页大小时取配置的默认值）
pub(super) fn page_request(
    state: &AppState,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<PageRequest, String> {
    let page_size = match page_size {
        Some(size) => size,
        None => state
            .config_api
            .get_default_page_size()
            .map_err(map_api_error)?,
    };
    Ok(PageRequest::new(page.unwrap_or(1), page_size))
}

pub(super) fn parse_category(value: Option<&str>) -> Result<Option<MineralCategory>, String> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            MineralCategory::parse(s).ok_or_else(|| invalid_input(format!("未知矿种类别: {}", s)))
        })
        .transpose()
}

pub(super) fn parse_mill_status(value: Option<&str>) -> Result<Option<MillStatus>, String> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(|s| MillStatus::parse(s).ok_or_else(|| invalid_input(format!("未知磨机状态: {}", s))))
        .transpose()
}
