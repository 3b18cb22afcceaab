// ==========================================
// 选矿厂运营系统 - 客户数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: client 表 CRUD、库存增减、过滤分页
// ==========================================

use crate::domain::client::Client;
use crate::domain::types::{MineralCategory, Page, PageRequest};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::query::{format_ts, page_clause, parse_enum, parse_ts, WhereBuilder};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const CLIENT_COLUMNS: &str = "client_id, name, document_id, phone, mineral_category, \
     coarse_stock, fine_stock, created_at, updated_at";

/// 客户列表过滤条件
#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    pub name_contains: Option<String>,
    pub mineral_category: Option<MineralCategory>,
}

impl ClientFilter {
    fn to_where(&self) -> WhereBuilder {
        let mut w = WhereBuilder::new();
        if let Some(name) = self.name_contains.as_ref().filter(|s| !s.trim().is_empty()) {
            w.push("name LIKE ? ESCAPE '\\'", format!("%{}%", escape_like(name.trim())));
        }
        w.push_opt(
            "mineral_category = ?",
            self.mineral_category.map(|c| c.to_db_str().to_string()),
        );
        w
    }
}

/// LIKE 通配符转义
pub(crate) fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub(crate) fn map_client(row: &Row) -> rusqlite::Result<Client> {
    Ok(Client {
        client_id: row.get(0)?,
        name: row.get(1)?,
        document_id: row.get(2)?,
        phone: row.get(3)?,
        mineral_category: parse_enum(4, &row.get::<_, String>(4)?, MineralCategory::parse)?,
        coarse_stock: row.get(5)?,
        fine_stock: row.get(6)?,
        created_at: parse_ts(7, &row.get::<_, String>(7)?)?,
        updated_at: parse_ts(8, &row.get::<_, String>(8)?)?,
    })
}

// ==========================================
// ClientRepository - 客户仓储
// ==========================================
pub struct ClientRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ClientRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新建客户
    pub fn insert(&self, client: &Client) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            &format!("INSERT INTO client ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)", CLIENT_COLUMNS),
            params![
                client.client_id,
                client.name,
                client.document_id,
                client.phone,
                client.mineral_category.to_db_str(),
                client.coarse_stock,
                client.fine_stock,
                format_ts(&client.created_at),
                format_ts(&client.updated_at),
            ],
        )?;
        Ok(())
    }

    /// 按ID查询
    pub fn find_by_id(&self, client_id: &str) -> RepositoryResult<Option<Client>> {
        let conn = self.get_conn()?;
        let client = conn
            .query_row(
                &format!("SELECT {} FROM client WHERE client_id = ?1", CLIENT_COLUMNS),
                params![client_id],
                map_client,
            )
            .optional()?;
        Ok(client)
    }

    /// 更新客户资料（不含库存）
    pub fn update_profile(&self, client: &Client) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE client
            SET name = ?2, document_id = ?3, phone = ?4, mineral_category = ?5, updated_at = ?6
            WHERE client_id = ?1
            "#,
            params![
                client.client_id,
                client.name,
                client.document_id,
                client.phone,
                client.mineral_category.to_db_str(),
                format_ts(&client.updated_at),
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("Client", &client.client_id));
        }
        Ok(())
    }

    /// 入库: 库存增加（可为负用于冲销，但结果不得小于 0，由 CHECK 约束保证）
    pub fn add_stock(&self, client_id: &str, coarse: i64, fine: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE client
            SET coarse_stock = coarse_stock + ?2,
                fine_stock = fine_stock + ?3,
                updated_at = ?4
            WHERE client_id = ?1
            "#,
            params![client_id, coarse, fine, format_ts(&chrono::Local::now().naive_local())],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("Client", client_id));
        }
        Ok(())
    }

    /// 盘点: 库存设为绝对值
    pub fn set_stock(&self, client_id: &str, coarse: i64, fine: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE client SET coarse_stock = ?2, fine_stock = ?3, updated_at = ?4 WHERE client_id = ?1",
            params![client_id, coarse, fine, format_ts(&chrono::Local::now().naive_local())],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("Client", client_id));
        }
        Ok(())
    }

    /// 删除客户（存在磨矿登记时由外键阻止）
    pub fn delete(&self, client_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM client WHERE client_id = ?1", params![client_id])?;
        if rows == 0 {
            return Err(RepositoryError::not_found("Client", client_id));
        }
        Ok(())
    }

    /// 条件计数
    pub fn count(&self, filter: &ClientFilter) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let w = filter.to_where();
        let total = conn.query_row(
            &format!("SELECT COUNT(*) FROM client{}", w.sql()),
            params_from_iter(w.params()),
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// 分页查询（按名称排序）
    pub fn list(&self, filter: &ClientFilter, page: PageRequest) -> RepositoryResult<Page<Client>> {
        let total = self.count(filter)?;

        let conn = self.get_conn()?;
        let w = filter.to_where();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM client{} ORDER BY name, client_id{}",
            CLIENT_COLUMNS,
            w.sql(),
            page_clause(&page)
        ))?;
        let items = stmt
            .query_map(params_from_iter(w.params()), map_client)?
            .collect::<rusqlite::Result<Vec<Client>>>()?;

        Ok(Page::new(items, total, page))
    }

    /// 全部客户库存合计 (粗矿, 细矿)
    pub fn total_stock(&self) -> RepositoryResult<(i64, i64)> {
        let conn = self.get_conn()?;
        let totals = conn.query_row(
            "SELECT COALESCE(SUM(coarse_stock), 0), COALESCE(SUM(fine_stock), 0) FROM client",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(totals)
    }
}
