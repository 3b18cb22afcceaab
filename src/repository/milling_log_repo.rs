// ==========================================
// 选矿厂运营系统 - 磨矿登记数据仓储
// ==========================================
// 职责: milling_log 查询（过滤、分页、区间）
// 红线: 登记只在提交事务内写入，不提供更新
// ==========================================

use crate::domain::milling_log::MillingLog;
use crate::domain::types::{MineralCategory, Page, PageRequest};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::query::{format_ts, page_clause, parse_enum, parse_ts, WhereBuilder};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const LOG_COLUMNS: &str = "log_id, client_id, mineral_category, total_coarse, total_fine, \
     total_units, estimated_minutes, start_time, projected_end, breakdown_json, observations, \
     operator, created_at";

/// 登记查询过滤条件（日期为闭区间，按 created_at 的日期部分）
#[derive(Debug, Clone, Default)]
pub struct MillingLogFilter {
    pub client_id: Option<String>,
    pub mineral_category: Option<MineralCategory>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl MillingLogFilter {
    fn to_where(&self) -> WhereBuilder {
        let mut w = WhereBuilder::new();
        w.push_opt("client_id = ?", self.client_id.clone());
        w.push_opt(
            "mineral_category = ?",
            self.mineral_category.map(|c| c.to_db_str()),
        );
        w.push_opt(
            "created_at >= ?",
            self.date_from.map(|d| format!("{} 00:00:00", d.format("%Y-%m-%d"))),
        );
        w.push_opt(
            "created_at <= ?",
            self.date_to.map(|d| format!("{} 23:59:59", d.format("%Y-%m-%d"))),
        );
        w
    }
}

fn map_log(row: &Row) -> rusqlite::Result<MillingLog> {
    let breakdown: String = row.get(9)?;
    let breakdown_json = serde_json::from_str(&breakdown)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?;

    Ok(MillingLog {
        log_id: row.get(0)?,
        client_id: row.get(1)?,
        mineral_category: parse_enum(2, &row.get::<_, String>(2)?, MineralCategory::parse)?,
        total_coarse: row.get(3)?,
        total_fine: row.get(4)?,
        total_units: row.get(5)?,
        estimated_minutes: row.get(6)?,
        start_time: row.get(7)?,
        projected_end: row.get(8)?,
        breakdown_json,
        observations: row.get(10)?,
        operator: row.get(11)?,
        created_at: parse_ts(12, &row.get::<_, String>(12)?)?,
    })
}

/// 写入一条登记（调用方负责事务）
pub(crate) fn insert_log(conn: &Connection, log: &MillingLog) -> RepositoryResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO milling_log ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            LOG_COLUMNS
        ),
        params![
            log.log_id,
            log.client_id,
            log.mineral_category.to_db_str(),
            log.total_coarse,
            log.total_fine,
            log.total_units,
            log.estimated_minutes,
            log.start_time,
            log.projected_end,
            log.breakdown_json.to_string(),
            log.observations,
            log.operator,
            format_ts(&log.created_at),
        ],
    )?;
    Ok(())
}

// ==========================================
// MillingLogRepository - 磨矿登记仓储
// ==========================================
pub struct MillingLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MillingLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_id(&self, log_id: &str) -> RepositoryResult<Option<MillingLog>> {
        let conn = self.get_conn()?;
        let log = conn
            .query_row(
                &format!("SELECT {} FROM milling_log WHERE log_id = ?1", LOG_COLUMNS),
                params![log_id],
                map_log,
            )
            .optional()?;
        Ok(log)
    }

    pub fn count(&self, filter: &MillingLogFilter) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let w = filter.to_where();
        let total = conn.query_row(
            &format!("SELECT COUNT(*) FROM milling_log{}", w.sql()),
            params_from_iter(w.params()),
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// 分页查询（最新在前）
    pub fn list(&self, filter: &MillingLogFilter, page: PageRequest) -> RepositoryResult<Page<MillingLog>> {
        let total = self.count(filter)?;
        let items = self.query(filter, "created_at DESC, log_id DESC", &page_clause(&page))?;
        Ok(Page::new(items, total, page))
    }

    /// 不分页查询（报表用，时间正序）
    pub fn list_matching(&self, filter: &MillingLogFilter) -> RepositoryResult<Vec<MillingLog>> {
        self.query(filter, "created_at ASC, log_id ASC", "")
    }

    fn query(&self, filter: &MillingLogFilter, order_by: &str, tail: &str) -> RepositoryResult<Vec<MillingLog>> {
        let conn = self.get_conn()?;
        let w = filter.to_where();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM milling_log{} ORDER BY {}{}",
            LOG_COLUMNS,
            w.sql(),
            order_by,
            tail
        ))?;
        let logs = stmt
            .query_map(params_from_iter(w.params()), map_log)?
            .collect::<rusqlite::Result<Vec<MillingLog>>>()?;
        Ok(logs)
    }
}
