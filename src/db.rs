// ==========================================
// 选矿厂运营系统 - SQLite 连接与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 统一建表入口，启动与测试共用同一份 schema
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 时间戳存储格式
pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开内存库并建表（测试与演示用）
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 建表（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL DEFAULT 'global',
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS client (
            client_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            document_id TEXT,
            phone TEXT,
            mineral_category TEXT NOT NULL,
            coarse_stock INTEGER NOT NULL DEFAULT 0 CHECK (coarse_stock >= 0),
            fine_stock INTEGER NOT NULL DEFAULT 0 CHECK (fine_stock >= 0),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_client_name ON client(name);

        CREATE TABLE IF NOT EXISTS mill (
            mill_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            capacity_sacks INTEGER NOT NULL CHECK (capacity_sacks > 0),
            status TEXT NOT NULL DEFAULT 'FREE',
            occupant_client_id TEXT REFERENCES client(client_id) ON DELETE SET NULL,
            occupant_sacks INTEGER NOT NULL DEFAULT 0,
            busy_since TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_mill_status ON mill(status);

        CREATE TABLE IF NOT EXISTS milling_log (
            log_id TEXT PRIMARY KEY,
            client_id TEXT NOT NULL REFERENCES client(client_id),
            mineral_category TEXT NOT NULL,
            total_coarse INTEGER NOT NULL,
            total_fine INTEGER NOT NULL,
            total_units INTEGER NOT NULL,
            estimated_minutes INTEGER NOT NULL,
            start_time TEXT NOT NULL,
            projected_end TEXT,
            breakdown_json TEXT NOT NULL,
            observations TEXT,
            operator TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_milling_log_client ON milling_log(client_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_milling_log_created ON milling_log(created_at);

        CREATE TABLE IF NOT EXISTS maintenance_record (
            maintenance_id TEXT PRIMARY KEY,
            mill_id TEXT NOT NULL REFERENCES mill(mill_id) ON DELETE CASCADE,
            kind TEXT NOT NULL,
            description TEXT NOT NULL,
            technician TEXT NOT NULL,
            started_at TEXT NOT NULL,
            finished_at TEXT,
            notes TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_maintenance_mill ON maintenance_record(mill_id, started_at);

        CREATE TABLE IF NOT EXISTS app_user (
            user_id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            full_name TEXT NOT NULL,
            role TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}
