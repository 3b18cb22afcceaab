// ==========================================
// 选矿厂运营系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 约束: 所有仓储共用一个连接；分配会话由 SessionStore 持有
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{
    AllocationApi, ClientApi, ConfigApi, MaintenanceApi, MillApi, ReportApi, SessionStore, UserApi,
};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::{
    ClientRepository, MaintenanceRepository, MillRepository, MillingLogRepository,
    SubmissionRepository, UserRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 磨矿分配API
    pub allocation_api: Arc<AllocationApi>,

    /// 客户管理API
    pub client_api: Arc<ClientApi>,

    /// 磨机管理API
    pub mill_api: Arc<MillApi>,

    /// 维修管理API
    pub maintenance_api: Arc<MaintenanceApi>,

    /// 用户管理API
    pub user_api: Arc<UserApi>,

    /// 报表API
    pub report_api: Arc<ReportApi>,

    /// 配置管理API
    pub config_api: Arc<ConfigApi>,

    /// 进行中的分配会话
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表（幂等）
    /// 2. 初始化所有Repository
    /// 3. 创建所有API实例
    /// 4. 按配置切换界面语言
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;

        Self::from_connection(db_path, Arc::new(Mutex::new(conn)))
    }

    /// 基于已建表的连接组装（测试可直接传入内存库）
    pub fn from_connection(db_path: String, conn: Arc<Mutex<Connection>>) -> Result<Self, String> {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let client_repo = Arc::new(ClientRepository::new(conn.clone()));
        let mill_repo = Arc::new(MillRepository::new(conn.clone()));
        let log_repo = Arc::new(MillingLogRepository::new(conn.clone()));
        let submission_repo = Arc::new(SubmissionRepository::new(conn.clone()));
        let maintenance_repo = Arc::new(MaintenanceRepository::new(conn.clone()));
        let user_repo = Arc::new(UserRepository::new(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let sessions = Arc::new(SessionStore::new());

        let allocation_api = Arc::new(AllocationApi::new(
            mill_repo.clone(),
            client_repo.clone(),
            submission_repo,
            log_repo.clone(),
            config_manager.clone(),
            sessions.clone(),
        ));
        let client_api = Arc::new(ClientApi::new(client_repo.clone()));
        let mill_api = Arc::new(MillApi::new(mill_repo.clone()));
        let maintenance_api = Arc::new(MaintenanceApi::new(maintenance_repo.clone()));
        let user_api = Arc::new(UserApi::new(user_repo));
        let report_api = Arc::new(ReportApi::new(log_repo, mill_repo, client_repo, maintenance_repo));
        let config_api = Arc::new(ConfigApi::new(config_manager.clone()));

        match config_manager.get_locale() {
            Ok(locale) => {
                crate::i18n::set_locale(&locale);
            }
            Err(e) => tracing::warn!("读取界面语言失败(使用默认语言): {}", e),
        }

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            allocation_api,
            client_api,
            mill_api,
            maintenance_api,
            user_api,
            report_api,
            config_api,
            sessions,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 MILL_OPS_DB_PATH（非空时）
/// - 开发环境: 用户数据目录/mill-ops-dev/mill_ops.db
/// - 生产环境: 用户数据目录/mill-ops/mill_ops.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("MILL_OPS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./mill_ops.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("mill-ops-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("mill-ops");
        }

        // 目录创建失败时由打开数据库报错
        std::fs::create_dir_all(&path).ok();
        path = path.join("mill_ops.db");
    }

    path.to_string_lossy().to_string()
}
