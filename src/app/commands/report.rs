use std::path::PathBuf;

use crate::app::state::AppState;

use super::common::{map_api_error, parse_date};

// ==========================================
// 报表相关命令
// ==========================================

pub fn get_milling_report(
    state: &AppState,
    date_from: String,
    date_to: String,
    client_id: Option<String>,
) -> Result<String, String> {
    let from = parse_date(&date_from)?;
    let to = parse_date(&date_to)?;
    let result = state
        .report_api
        .milling_report(from, to, client_id.as_deref())
        .map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

pub fn export_milling_logs_csv(
    state: &AppState,
    date_from: String,
    date_to: String,
    path: String,
) -> Result<String, String> {
    let from = parse_date(&date_from)?;
    let to = parse_date(&date_to)?;
    let path = PathBuf::from(path);
    let rows = state
        .report_api
        .export_milling_logs_csv(from, to, &path)
        .map_err(map_api_error)?;

    serde_json::to_string(&serde_json::json!({
        "rows": rows,
        "path": path.to_string_lossy(),
    }))
    .map_err(|e| format!("序列化失败: {}", e))
}

pub fn get_plant_snapshot(state: &AppState) -> Result<String, String> {
    let result = state.report_api.plant_snapshot().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}
