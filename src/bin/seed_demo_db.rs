// ==========================================
// 演示库初始化工具
// ==========================================
// 用法: seed_demo_db [db_path]
// 行为: 备份并清空目标库，写入演示磨机、客户与用户
// ==========================================

use std::error::Error;
use std::fs;
use std::path::Path;

use chrono::Local;

use mill_ops::api::ClientInput;
use mill_ops::app::{get_default_db_path, AppState};
use mill_ops::domain::types::{MineralCategory, UserRole};

const DEMO_MILLS: &[(&str, &str, u32)] = &[
    ("M1", "Molino 1", 150),
    ("M2", "Molino 2", 150),
    ("M3", "Molino 3", 120),
    ("M4", "Molino 4", 100),
];

const DEMO_CLIENTS: &[(&str, MineralCategory, i64, i64)] = &[
    ("Minera Santa Rosa", MineralCategory::A, 400, 250),
    ("Cooperativa El Dorado", MineralCategory::A, 180, 90),
    ("Minas del Sur", MineralCategory::B, 300, 300),
];

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if path.exists() {
        let backup = format!("{}.bak.{}", db_path, Local::now().format("%Y%m%d%H%M%S"));
        fs::copy(path, &backup)?;
        fs::remove_file(path)?;
        println!("已备份旧库: {}", backup);
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);

    backup_and_reset_db(&db_path)?;

    let state = AppState::new(db_path.clone())?;

    for (mill_id, name, capacity) in DEMO_MILLS {
        state.mill_api.create_mill(mill_id, name, *capacity)?;
    }

    for (name, category, coarse, fine) in DEMO_CLIENTS {
        let client = state.client_api.create_client(&ClientInput {
            name: name.to_string(),
            document_id: None,
            phone: None,
            mineral_category: *category,
        })?;
        state
            .client_api
            .receive_stock(&client.client_id, *coarse, *fine)?;
    }

    state
        .user_api
        .create_user("admin", "Administrador", UserRole::Admin)?;
    state
        .user_api
        .create_user("operador", "Operador de turno", UserRole::Operator)?;

    let snapshot = state.report_api.plant_snapshot()?;
    println!("演示库已生成: {}", db_path);
    println!(
        "磨机空闲 {} 台，库存 粗矿 {} 袋 / 细矿 {} 袋",
        snapshot.mills_free, snapshot.total_coarse_stock, snapshot.total_fine_stock
    );
    Ok(())
}
