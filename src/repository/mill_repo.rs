// ==========================================
// 选矿厂运营系统 - 磨机数据仓储
// ==========================================
// 职责: mill 表 CRUD、状态流转（占用/释放）
// 红线: 状态前置条件由 API 层判断，这里只做条件更新
// ==========================================

use crate::domain::mill::Mill;
use crate::domain::types::{MillStatus, Page, PageRequest};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::query::{format_ts, page_clause, parse_enum, parse_opt_ts, parse_ts, WhereBuilder};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

pub(crate) const MILL_COLUMNS: &str = "mill_id, name, capacity_sacks, status, occupant_client_id, \
     occupant_sacks, busy_since, created_at, updated_at";

pub(crate) fn map_mill(row: &Row) -> rusqlite::Result<Mill> {
    Ok(Mill {
        mill_id: row.get(0)?,
        name: row.get(1)?,
        capacity_sacks: row.get(2)?,
        status: parse_enum(3, &row.get::<_, String>(3)?, MillStatus::parse)?,
        occupant_client_id: row.get(4)?,
        occupant_sacks: row.get(5)?,
        busy_since: parse_opt_ts(6, row.get(6)?)?,
        created_at: parse_ts(7, &row.get::<_, String>(7)?)?,
        updated_at: parse_ts(8, &row.get::<_, String>(8)?)?,
    })
}

/// 事务内读取磨机状态（提交/维修共用）
pub(crate) fn read_status(conn: &Connection, mill_id: &str) -> RepositoryResult<MillStatus> {
    let status: Option<String> = conn
        .query_row(
            "SELECT status FROM mill WHERE mill_id = ?1",
            params![mill_id],
            |row| row.get(0),
        )
        .optional()?;
    let status = status.ok_or_else(|| RepositoryError::not_found("Mill", mill_id))?;
    Ok(parse_enum(0, &status, MillStatus::parse)?)
}

// ==========================================
// MillRepository - 磨机仓储
// ==========================================
pub struct MillRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MillRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, mill: &Mill) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            &format!("INSERT INTO mill ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)", MILL_COLUMNS),
            params![
                mill.mill_id,
                mill.name,
                mill.capacity_sacks,
                mill.status.to_db_str(),
                mill.occupant_client_id,
                mill.occupant_sacks,
                mill.busy_since.as_ref().map(format_ts),
                format_ts(&mill.created_at),
                format_ts(&mill.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, mill_id: &str) -> RepositoryResult<Option<Mill>> {
        let conn = self.get_conn()?;
        let mill = conn
            .query_row(
                &format!("SELECT {} FROM mill WHERE mill_id = ?1", MILL_COLUMNS),
                params![mill_id],
                map_mill,
            )
            .optional()?;
        Ok(mill)
    }

    /// 全部磨机（按 mill_id 排序，分配会话的磨机列表来源）
    pub fn list_all(&self) -> RepositoryResult<Vec<Mill>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM mill ORDER BY mill_id", MILL_COLUMNS))?;
        let mills = stmt
            .query_map([], map_mill)?
            .collect::<rusqlite::Result<Vec<Mill>>>()?;
        Ok(mills)
    }

    pub fn count(&self, status: Option<MillStatus>) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let mut w = WhereBuilder::new();
        w.push_opt("status = ?", status.map(|s| s.to_db_str()));
        let total = conn.query_row(
            &format!("SELECT COUNT(*) FROM mill{}", w.sql()),
            params_from_iter(w.params()),
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// 分页查询（可按状态过滤）
    pub fn list(&self, status: Option<MillStatus>, page: PageRequest) -> RepositoryResult<Page<Mill>> {
        let total = self.count(status)?;

        let conn = self.get_conn()?;
        let mut w = WhereBuilder::new();
        w.push_opt("status = ?", status.map(|s| s.to_db_str()));
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM mill{} ORDER BY mill_id{}",
            MILL_COLUMNS,
            w.sql(),
            page_clause(&page)
        ))?;
        let items = stmt
            .query_map(params_from_iter(w.params()), map_mill)?
            .collect::<rusqlite::Result<Vec<Mill>>>()?;
        Ok(Page::new(items, total, page))
    }

    /// 按状态统计数量
    pub fn count_by_status(&self) -> RepositoryResult<Vec<(MillStatus, i64)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM mill GROUP BY status ORDER BY status")?;
        let rows = stmt
            .query_map([], |row| {
                let status: String = row.get(0)?;
                Ok((parse_enum(0, &status, MillStatus::parse)?, row.get(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// 更新名称与容量
    pub fn update_profile(&self, mill_id: &str, name: &str, capacity_sacks: u32) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE mill SET name = ?2, capacity_sacks = ?3, updated_at = ?4 WHERE mill_id = ?1",
            params![mill_id, name, capacity_sacks, format_ts(&now())],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("Mill", mill_id));
        }
        Ok(())
    }

    /// 释放磨机: BUSY -> FREE，清空占用信息
    pub fn release(&self, mill_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let status = read_status(&conn, mill_id)?;
        if status != MillStatus::Busy {
            return Err(RepositoryError::InvalidStateTransition {
                from: status.to_string(),
                to: MillStatus::Free.to_string(),
            });
        }
        conn.execute(
            r#"
            UPDATE mill
            SET status = 'FREE', occupant_client_id = NULL, occupant_sacks = 0,
                busy_since = NULL, updated_at = ?2
            WHERE mill_id = ?1
            "#,
            params![mill_id, format_ts(&now())],
        )?;
        Ok(())
    }

    /// 删除磨机（仅 FREE）
    pub fn delete(&self, mill_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let status = read_status(&conn, mill_id)?;
        if status != MillStatus::Free {
            return Err(RepositoryError::MillNotAvailable {
                mill_id: mill_id.to_string(),
                status: status.to_string(),
            });
        }
        conn.execute("DELETE FROM mill WHERE mill_id = ?1", params![mill_id])?;
        Ok(())
    }
}

fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}
