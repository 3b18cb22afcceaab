// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 基于临时库组装 AppState，并提供常用数据准备
// ==========================================

use std::error::Error;

use chrono::NaiveTime;
use rusqlite::Connection;
use tempfile::NamedTempFile;

use mill_ops::api::ApiError;
use mill_ops::app::AppState;
use mill_ops::db::open_sqlite_connection;
use mill_ops::domain::client::Client;
use mill_ops::domain::types::{MillStatus, MineralCategory};

use super::test_data_builder::ClientInputBuilder;

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 包含完整的 AppState（与生产相同的装配）
pub struct ApiTestEnv {
    pub db_path: String,
    pub state: AppState,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let (temp_file, db_path) = crate::test_helpers::create_test_db()?;
        let state = AppState::new(db_path.clone())?;
        Ok(Self {
            db_path,
            state,
            _temp_file: temp_file,
        })
    }

    /// 独立连接（用于直接检查落库结果）
    pub fn raw_conn(&self) -> Connection {
        open_sqlite_connection(&self.db_path).expect("无法打开测试库")
    }

    /// 登记 M1..Mn 号磨机（容量统一）
    pub fn seed_mills(&self, count: usize, capacity: u32) {
        for i in 1..=count {
            self.state
                .mill_api
                .create_mill(&format!("M{}", i), &format!("Molino {}", i), capacity)
                .expect("登记磨机失败");
        }
    }

    /// 登记客户并入库
    pub fn seed_client(&self, name: &str, category: MineralCategory, coarse: i64, fine: i64) -> Client {
        let client = self
            .state
            .client_api
            .create_client(&ClientInputBuilder::new(name).category(category).build())
            .expect("登记客户失败");
        if coarse > 0 || fine > 0 {
            self.state
                .client_api
                .receive_stock(&client.client_id, coarse, fine)
                .expect("入库失败")
        } else {
            client
        }
    }

    pub fn mill_status(&self, mill_id: &str) -> MillStatus {
        self.state.mill_api.get_mill(mill_id).expect("查询磨机失败").status
    }

    pub fn milling_log_count(&self) -> i64 {
        self.raw_conn()
            .query_row("SELECT COUNT(*) FROM milling_log", [], |row| row.get(0))
            .expect("统计登记失败")
    }
}

pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("非法时刻")
}

/// 断言错误代码
pub fn assert_api_code(err: &ApiError, code: &str) {
    assert_eq!(err.code(), code, "错误代码不符: {:?}", err);
}
