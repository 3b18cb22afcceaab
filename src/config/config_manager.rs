// ==========================================
// 选矿厂运营系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 缺省: 未配置的键使用编译期默认值
// ==========================================

use crate::db::open_sqlite_connection;
use crate::engine::duration::DurationTable;
use crate::i18n::SUPPORTED_LOCALES;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 按数据库路径创建
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn get_u32_or_default(&self, key: &str, default: u32) -> RepositoryResult<u32> {
        let value = match self.get_global_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };
        match value.trim().parse::<u32>() {
            Ok(v) if v > 0 => Ok(v),
            _ => {
                tracing::warn!(config_key = key, raw_value = %value, "配置值非法，使用默认值");
                Ok(default)
            }
        }
    }

    // ===== 类型化读取 =====

    /// 各时长档位的实际分钟数
    pub fn get_duration_table(&self) -> RepositoryResult<DurationTable> {
        let defaults = DurationTable::default();
        Ok(DurationTable {
            a100_minutes: self.get_u32_or_default(config_keys::DURATION_A100, defaults.a100_minutes)?,
            a60_minutes: self.get_u32_or_default(config_keys::DURATION_A60, defaults.a60_minutes)?,
            b120_minutes: self.get_u32_or_default(config_keys::DURATION_B120, defaults.b120_minutes)?,
            b150_minutes: self.get_u32_or_default(config_keys::DURATION_B150, defaults.b150_minutes)?,
        })
    }

    /// 分配界面展示的磨机数上限
    pub fn get_max_mills(&self) -> RepositoryResult<u32> {
        self.get_u32_or_default(config_keys::MAX_MILLS, defaults::MAX_MILLS)
    }

    pub fn get_default_page_size(&self) -> RepositoryResult<u32> {
        self.get_u32_or_default(config_keys::DEFAULT_PAGE_SIZE, defaults::DEFAULT_PAGE_SIZE)
    }

    pub fn get_locale(&self) -> RepositoryResult<String> {
        let value = self.get_global_config_value(config_keys::UI_LOCALE)?;
        Ok(value
            .filter(|v| SUPPORTED_LOCALES.contains(&v.as_str()))
            .unwrap_or_else(|| defaults::UI_LOCALE.to_string()))
    }

    // ===== 写入 =====

    /// 写入配置（已知键会先校验取值）
    pub fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(RepositoryError::FieldValueError {
                field: "key".to_string(),
                message: "配置键不能为空".to_string(),
            });
        }
        validate_value(key, value)?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 全部 global 配置（已写入的键，按键排序）
    pub fn list_all(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows.into_iter().collect())
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let config_map = self.list_all()?;
        Ok(serde_json::to_string(&config_map)?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 覆盖同名 global 配置，快照外的键保持不变
    /// - 任一取值非法则整体不生效
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> RepositoryResult<usize> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;
        for (key, value) in &config_map {
            validate_value(key, value)?;
        }

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for (key, value) in &config_map {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
                params![key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }
}

fn validate_value(key: &str, value: &str) -> RepositoryResult<()> {
    let invalid = |message: &str| RepositoryError::FieldValueError {
        field: key.to_string(),
        message: message.to_string(),
    };

    match key {
        config_keys::DURATION_A100
        | config_keys::DURATION_A60
        | config_keys::DURATION_B120
        | config_keys::DURATION_B150
        | config_keys::MAX_MILLS
        | config_keys::DEFAULT_PAGE_SIZE => match value.trim().parse::<u32>() {
            Ok(v) if v > 0 => Ok(()),
            _ => Err(invalid("必须为正整数")),
        },
        config_keys::UI_LOCALE if !SUPPORTED_LOCALES.contains(&value) => {
            Err(invalid("不支持的语言"))
        }
        _ => Ok(()),
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 加工时长（分钟）
    pub const DURATION_A100: &str = "duration.a100_minutes";
    pub const DURATION_A60: &str = "duration.a60_minutes";
    pub const DURATION_B120: &str = "duration.b120_minutes";
    pub const DURATION_B150: &str = "duration.b150_minutes";

    // 分配
    pub const MAX_MILLS: &str = "allocation.max_mills";

    // 分页
    pub const DEFAULT_PAGE_SIZE: &str = "pagination.default_page_size";

    // 界面
    pub const UI_LOCALE: &str = "ui.locale";
}

pub mod defaults {
    pub const MAX_MILLS: u32 = 4;
    pub const DEFAULT_PAGE_SIZE: u32 = 20;
    pub const UI_LOCALE: &str = "zh-CN";
}
