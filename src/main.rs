// ==========================================
// 选矿厂运营系统 - 主入口
// ==========================================
// 通道: stdin 每行一条 JSON 命令，stdout 每行一条 JSON 响应
// 响应: {"ok": true, "data": ...} 或 {"ok": false, "error": {...}}
// ==========================================

use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use mill_ops::app::{dispatch, get_default_db_path, AppState, CommandRequest};

/// 把命令结果包装为一行响应
fn wrap_response(result: Result<String, String>) -> String {
    let (ok, body) = match result {
        Ok(body) => (true, body),
        Err(body) => (false, body),
    };
    // 命令层返回的都是 JSON；个别兜底文本按字符串处理
    let payload = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
    let response = if ok {
        serde_json::json!({ "ok": true, "data": payload })
    } else {
        serde_json::json!({ "ok": false, "error": payload })
    };
    response.to_string()
}

async fn handle_line(state: Arc<AppState>, line: String) -> String {
    let request: CommandRequest = match serde_json::from_str(&line) {
        Ok(req) => req,
        Err(e) => {
            return wrap_response(Err(serde_json::json!({
                "code": "INVALID_INPUT",
                "message": format!("请求格式错误: {}", e),
                "details": null,
            })
            .to_string()));
        }
    };

    // 数据库访问是同步的，放到阻塞线程池执行
    let result = tokio::task::spawn_blocking(move || dispatch(&state, &request)).await;
    match result {
        Ok(result) => wrap_response(result),
        Err(e) => {
            tracing::error!("命令执行任务异常: {}", e);
            wrap_response(Err(serde_json::json!({
                "code": "INTERNAL_ERROR",
                "message": format!("内部错误: {}", e),
                "details": null,
            })
            .to_string()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    mill_ops::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", mill_ops::APP_NAME);
    tracing::info!("系统版本: {}", mill_ops::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("无法创建数据目录: {}", parent.display()))?;
        }
    }

    let state = Arc::new(AppState::new(db_path).map_err(anyhow::Error::msg)?);
    tracing::info!("AppState初始化成功，等待命令...");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("读取标准输入失败")? {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(state.clone(), line).await;
        stdout.write_all(response.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    tracing::info!("输入结束，退出");
    Ok(())
}
