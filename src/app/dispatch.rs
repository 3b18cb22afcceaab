// ==========================================
// 选矿厂运营系统 - 命令分发
// ==========================================
// 职责: 将 {"command": ..., "args": {...}} 请求路由到命令函数
// 约束: 未知命令或参数无法解析时返回 INVALID_INPUT 错误响应
// ==========================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::client_api::ClientInput;
use crate::app::commands::*;
use crate::app::state::AppState;
use crate::domain::allocation::AllocationCommand;

/// 命令请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub command: String,
    #[serde(default)]
    pub args: Value,
}

fn invalid_args(command: &str, err: impl std::fmt::Display) -> String {
    let response = ErrorResponse {
        code: "INVALID_INPUT".to_string(),
        message: format!("命令 {} 参数错误: {}", command, err),
        details: None,
    };
    serde_json::to_string(&response).unwrap_or(response.message)
}

fn args<T: DeserializeOwned>(command: &str, value: &Value) -> Result<T, String> {
    let value = if value.is_null() {
        Value::Object(Default::default())
    } else {
        value.clone()
    };
    serde_json::from_value(value).map_err(|e| invalid_args(command, e))
}

// ==========================================
// 参数结构
// ==========================================

#[derive(Deserialize)]
struct SessionArgs {
    session_id: String,
}

#[derive(Deserialize)]
struct OpenSessionArgs {
    start_time: Option<String>,
}

#[derive(Deserialize)]
struct ApplyCommandArgs {
    session_id: String,
    command: AllocationCommand,
}

#[derive(Deserialize)]
struct SelectClientArgs {
    session_id: String,
    client_id: String,
}

#[derive(Deserialize)]
struct SubmitArgs {
    session_id: String,
    operator: String,
}

#[derive(Deserialize)]
struct IdArgs {
    id: String,
}

#[derive(Deserialize)]
struct PageArgs {
    page: Option<u32>,
    page_size: Option<u32>,
}

#[derive(Deserialize)]
struct ListLogsArgs {
    client_id: Option<String>,
    mineral_category: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

#[derive(Deserialize)]
struct ClientArgs {
    client_id: String,
    #[serde(flatten)]
    input: ClientInput,
}

#[derive(Deserialize)]
struct ListClientsArgs {
    name_contains: Option<String>,
    mineral_category: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

#[derive(Deserialize)]
struct StockArgs {
    client_id: String,
    #[serde(default)]
    coarse: i64,
    #[serde(default)]
    fine: i64,
}

#[derive(Deserialize)]
struct MillArgs {
    mill_id: String,
    name: String,
    capacity_sacks: u32,
}

#[derive(Deserialize)]
struct ListMillsArgs {
    status: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

#[derive(Deserialize)]
struct StartMaintenanceArgs {
    mill_id: String,
    kind: String,
    description: String,
    technician: String,
}

#[derive(Deserialize)]
struct FinishMaintenanceArgs {
    maintenance_id: String,
    notes: Option<String>,
}

#[derive(Deserialize)]
struct ListMaintenanceArgs {
    mill_id: Option<String>,
    open_only: Option<bool>,
    page: Option<u32>,
    page_size: Option<u32>,
}

#[derive(Deserialize)]
struct UserArgs {
    username: String,
    full_name: String,
    role: String,
}

#[derive(Deserialize)]
struct UpdateUserArgs {
    user_id: String,
    full_name: String,
    role: String,
}

#[derive(Deserialize)]
struct UserActiveArgs {
    user_id: String,
    active: bool,
}

#[derive(Deserialize)]
struct ReportArgs {
    date_from: String,
    date_to: String,
    client_id: Option<String>,
}

#[derive(Deserialize)]
struct ExportArgs {
    date_from: String,
    date_to: String,
    path: String,
}

#[derive(Deserialize)]
struct ConfigKeyArgs {
    key: String,
}

#[derive(Deserialize)]
struct ConfigValueArgs {
    key: String,
    value: String,
}

#[derive(Deserialize)]
struct SnapshotArgs {
    snapshot_json: String,
}

// ==========================================
// 分发
// ==========================================

/// 执行一条命令，返回 JSON 字符串（成功结果或错误响应）
pub fn dispatch(state: &AppState, request: &CommandRequest) -> Result<String, String> {
    let name = request.command.as_str();
    let raw = &request.args;
    tracing::debug!(command = name, "分发命令");

    match name {
        // 磨矿分配
        "open_allocation_session" => {
            let a: OpenSessionArgs = args(name, raw)?;
            open_allocation_session(state, a.start_time)
        }
        "get_allocation_session" => {
            let a: SessionArgs = args(name, raw)?;
            get_allocation_session(state, a.session_id)
        }
        "close_allocation_session" => {
            let a: SessionArgs = args(name, raw)?;
            close_allocation_session(state, a.session_id)
        }
        "apply_allocation_command" => {
            let a: ApplyCommandArgs = args(name, raw)?;
            apply_allocation_command(state, a.session_id, a.command)
        }
        "select_allocation_client" => {
            let a: SelectClientArgs = args(name, raw)?;
            select_allocation_client(state, a.session_id, a.client_id)
        }
        "refresh_allocation_mills" => {
            let a: SessionArgs = args(name, raw)?;
            refresh_allocation_mills(state, a.session_id)
        }
        "validate_allocation" => {
            let a: SessionArgs = args(name, raw)?;
            validate_allocation(state, a.session_id)
        }
        "submit_allocation" => {
            let a: SubmitArgs = args(name, raw)?;
            submit_allocation(state, a.session_id, a.operator)
        }
        "get_milling_log" => {
            let a: IdArgs = args(name, raw)?;
            get_milling_log(state, a.id)
        }
        "list_milling_logs" => {
            let a: ListLogsArgs = args(name, raw)?;
            list_milling_logs(
                state,
                a.client_id,
                a.mineral_category,
                a.date_from,
                a.date_to,
                a.page,
                a.page_size,
            )
        }

        // 客户
        "create_client" => {
            let input: ClientInput = args(name, raw)?;
            create_client(state, input)
        }
        "get_client" => {
            let a: IdArgs = args(name, raw)?;
            get_client(state, a.id)
        }
        "update_client" => {
            let a: ClientArgs = args(name, raw)?;
            update_client(state, a.client_id, a.input)
        }
        "delete_client" => {
            let a: IdArgs = args(name, raw)?;
            delete_client(state, a.id)
        }
        "list_clients" => {
            let a: ListClientsArgs = args(name, raw)?;
            list_clients(state, a.name_contains, a.mineral_category, a.page, a.page_size)
        }
        "receive_client_stock" => {
            let a: StockArgs = args(name, raw)?;
            receive_client_stock(state, a.client_id, a.coarse, a.fine)
        }
        "adjust_client_stock" => {
            let a: StockArgs = args(name, raw)?;
            adjust_client_stock(state, a.client_id, a.coarse, a.fine)
        }

        // 磨机
        "create_mill" => {
            let a: MillArgs = args(name, raw)?;
            create_mill(state, a.mill_id, a.name, a.capacity_sacks)
        }
        "get_mill" => {
            let a: IdArgs = args(name, raw)?;
            get_mill(state, a.id)
        }
        "update_mill" => {
            let a: MillArgs = args(name, raw)?;
            update_mill(state, a.mill_id, a.name, a.capacity_sacks)
        }
        "delete_mill" => {
            let a: IdArgs = args(name, raw)?;
            delete_mill(state, a.id)
        }
        "list_mills" => {
            let a: ListMillsArgs = args(name, raw)?;
            list_mills(state, a.status, a.page, a.page_size)
        }
        "list_available_mills" => list_available_mills(state),
        "release_mill" => {
            let a: IdArgs = args(name, raw)?;
            release_mill(state, a.id)
        }

        // 维修
        "start_maintenance" => {
            let a: StartMaintenanceArgs = args(name, raw)?;
            start_maintenance(state, a.mill_id, a.kind, a.description, a.technician)
        }
        "finish_maintenance" => {
            let a: FinishMaintenanceArgs = args(name, raw)?;
            finish_maintenance(state, a.maintenance_id, a.notes)
        }
        "get_maintenance" => {
            let a: IdArgs = args(name, raw)?;
            get_maintenance(state, a.id)
        }
        "list_maintenance" => {
            let a: ListMaintenanceArgs = args(name, raw)?;
            list_maintenance(state, a.mill_id, a.open_only, a.page, a.page_size)
        }

        // 用户
        "create_user" => {
            let a: UserArgs = args(name, raw)?;
            create_user(state, a.username, a.full_name, a.role)
        }
        "get_user" => {
            let a: IdArgs = args(name, raw)?;
            get_user(state, a.id)
        }
        "update_user" => {
            let a: UpdateUserArgs = args(name, raw)?;
            update_user(state, a.user_id, a.full_name, a.role)
        }
        "set_user_active" => {
            let a: UserActiveArgs = args(name, raw)?;
            set_user_active(state, a.user_id, a.active)
        }
        "list_users" => {
            let a: PageArgs = args(name, raw)?;
            list_users(state, a.page, a.page_size)
        }

        // 报表
        "get_milling_report" => {
            let a: ReportArgs = args(name, raw)?;
            get_milling_report(state, a.date_from, a.date_to, a.client_id)
        }
        "export_milling_logs_csv" => {
            let a: ExportArgs = args(name, raw)?;
            export_milling_logs_csv(state, a.date_from, a.date_to, a.path)
        }
        "get_plant_snapshot" => get_plant_snapshot(state),

        // 配置
        "list_configs" => list_configs(state),
        "get_config" => {
            let a: ConfigKeyArgs = args(name, raw)?;
            get_config(state, a.key)
        }
        "update_config" => {
            let a: ConfigValueArgs = args(name, raw)?;
            update_config(state, a.key, a.value)
        }
        "get_config_snapshot" => get_config_snapshot(state),
        "restore_config_from_snapshot" => {
            let a: SnapshotArgs = args(name, raw)?;
            restore_config_from_snapshot(state, a.snapshot_json)
        }

        _ => Err(invalid_args(name, "未知命令")),
    }
}
