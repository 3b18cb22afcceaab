// ==========================================
// 选矿厂运营系统 - 维修记录数据仓储
// ==========================================
// 职责: maintenance_record 读写
// 红线: 开始/结束维修与磨机状态变更在同一事务内
// ==========================================

use crate::domain::maintenance::MaintenanceRecord;
use crate::domain::types::{MaintenanceKind, MillStatus, Page, PageRequest};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::mill_repo::read_status;
use crate::repository::query::{format_ts, page_clause, parse_enum, parse_opt_ts, parse_ts, WhereBuilder};
use chrono::NaiveDateTime;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const MAINTENANCE_COLUMNS: &str =
    "maintenance_id, mill_id, kind, description, technician, started_at, finished_at, notes";

#[derive(Debug, Clone, Default)]
pub struct MaintenanceFilter {
    pub mill_id: Option<String>,
    pub open_only: bool,
}

impl MaintenanceFilter {
    fn to_where(&self) -> WhereBuilder {
        let mut w = WhereBuilder::new();
        w.push_opt("mill_id = ?", self.mill_id.clone());
        if self.open_only {
            w.push_raw("finished_at IS NULL");
        }
        w
    }
}

fn map_record(row: &Row) -> rusqlite::Result<MaintenanceRecord> {
    Ok(MaintenanceRecord {
        maintenance_id: row.get(0)?,
        mill_id: row.get(1)?,
        kind: parse_enum(2, &row.get::<_, String>(2)?, MaintenanceKind::parse)?,
        description: row.get(3)?,
        technician: row.get(4)?,
        started_at: parse_ts(5, &row.get::<_, String>(5)?)?,
        finished_at: parse_opt_ts(6, row.get(6)?)?,
        notes: row.get(7)?,
    })
}

// ==========================================
// MaintenanceRepository - 维修记录仓储
// ==========================================
pub struct MaintenanceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MaintenanceRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 开始维修: 磨机须为 FREE，置为 MAINTENANCE
    pub fn start(&self, record: &MaintenanceRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let status = read_status(&tx, &record.mill_id)?;
        if status != MillStatus::Free {
            return Err(RepositoryError::MillNotAvailable {
                mill_id: record.mill_id.clone(),
                status: status.to_string(),
            });
        }

        tx.execute(
            &format!(
                "INSERT INTO maintenance_record ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                MAINTENANCE_COLUMNS
            ),
            params![
                record.maintenance_id,
                record.mill_id,
                record.kind.to_db_str(),
                record.description,
                record.technician,
                format_ts(&record.started_at),
                record.finished_at.as_ref().map(format_ts),
                record.notes,
            ],
        )?;
        tx.execute(
            "UPDATE mill SET status = 'MAINTENANCE', updated_at = ?2 WHERE mill_id = ?1",
            params![record.mill_id, format_ts(&record.started_at)],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// 结束维修: 记录须为进行中，磨机回到 FREE
    pub fn finish(
        &self,
        maintenance_id: &str,
        finished_at: NaiveDateTime,
        notes: Option<&str>,
    ) -> RepositoryResult<MaintenanceRecord> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut record = tx
            .query_row(
                &format!(
                    "SELECT {} FROM maintenance_record WHERE maintenance_id = ?1",
                    MAINTENANCE_COLUMNS
                ),
                params![maintenance_id],
                map_record,
            )
            .optional()?
            .ok_or_else(|| RepositoryError::not_found("MaintenanceRecord", maintenance_id))?;

        if !record.is_open() {
            return Err(RepositoryError::InvalidStateTransition {
                from: "FINISHED".to_string(),
                to: "FINISHED".to_string(),
            });
        }

        let notes = notes.map(str::to_string).or(record.notes.take());
        tx.execute(
            "UPDATE maintenance_record SET finished_at = ?2, notes = ?3 WHERE maintenance_id = ?1",
            params![maintenance_id, format_ts(&finished_at), notes],
        )?;
        tx.execute(
            "UPDATE mill SET status = 'FREE', updated_at = ?2 WHERE mill_id = ?1 AND status = 'MAINTENANCE'",
            params![record.mill_id, format_ts(&finished_at)],
        )?;

        tx.commit()?;

        record.finished_at = Some(finished_at);
        record.notes = notes;
        Ok(record)
    }

    pub fn find_by_id(&self, maintenance_id: &str) -> RepositoryResult<Option<MaintenanceRecord>> {
        let conn = self.get_conn()?;
        let record = conn
            .query_row(
                &format!(
                    "SELECT {} FROM maintenance_record WHERE maintenance_id = ?1",
                    MAINTENANCE_COLUMNS
                ),
                params![maintenance_id],
                map_record,
            )
            .optional()?;
        Ok(record)
    }

    pub fn count(&self, filter: &MaintenanceFilter) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let w = filter.to_where();
        let total = conn.query_row(
            &format!("SELECT COUNT(*) FROM maintenance_record{}", w.sql()),
            params_from_iter(w.params()),
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// 分页查询（最近开始的在前）
    pub fn list(&self, filter: &MaintenanceFilter, page: PageRequest) -> RepositoryResult<Page<MaintenanceRecord>> {
        let total = self.count(filter)?;

        let conn = self.get_conn()?;
        let w = filter.to_where();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM maintenance_record{} ORDER BY started_at DESC, maintenance_id{}",
            MAINTENANCE_COLUMNS,
            w.sql(),
            page_clause(&page)
        ))?;
        let items = stmt
            .query_map(params_from_iter(w.params()), map_record)?
            .collect::<rusqlite::Result<Vec<MaintenanceRecord>>>()?;
        Ok(Page::new(items, total, page))
    }
}
