// ==========================================
// 选矿厂运营系统 - SQL 构建与行映射工具
// ==========================================
// 职责: 动态 WHERE 子句（参数化）、分页片段、时间戳/枚举列解析
// 约束: 所有过滤值都走参数绑定，不拼接进 SQL
// ==========================================

use crate::db::TS_FORMAT;
use crate::domain::types::PageRequest;
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::ToSql;
use thiserror::Error;

/// 列值无法解析为领域类型
#[derive(Error, Debug)]
#[error("列值无法解析: {0}")]
pub struct InvalidColumnValue(pub String);

// ==========================================
// WhereBuilder - 动态过滤条件
// ==========================================
#[derive(Default)]
pub struct WhereBuilder {
    clauses: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加带一个参数的条件，例如 `("client_id = ?", id)`
    pub fn push<T: ToSql + 'static>(&mut self, clause: &str, value: T) -> &mut Self {
        self.clauses.push(clause.to_string());
        self.params.push(Box::new(value));
        self
    }

    /// 添加无参数条件，例如 `finished_at IS NULL`
    pub fn push_raw(&mut self, clause: &str) -> &mut Self {
        self.clauses.push(clause.to_string());
        self
    }

    /// 可选参数条件
    pub fn push_opt<T: ToSql + 'static>(&mut self, clause: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.push(clause, v);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// 生成 ` WHERE a AND b`（无条件时为空串）
    pub fn sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn params(&self) -> impl Iterator<Item = &Box<dyn ToSql>> {
        self.params.iter()
    }
}

/// 分页片段 ` LIMIT n OFFSET m`
pub fn page_clause(request: &PageRequest) -> String {
    format!(" LIMIT {} OFFSET {}", request.limit(), request.offset())
}

// ==========================================
// 列解析
// ==========================================

pub fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

pub fn parse_ts(idx: usize, value: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TS_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::new(InvalidColumnValue(format!("{}: {}", value, e))),
        )
    })
}

pub fn parse_opt_ts(idx: usize, value: Option<String>) -> rusqlite::Result<Option<NaiveDateTime>> {
    value.map(|v| parse_ts(idx, &v)).transpose()
}

/// 用领域类型的 `parse` 解析文本列
pub fn parse_enum<T>(idx: usize, value: &str, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    parse(value).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::new(InvalidColumnValue(value.to_string())),
        )
    })
}
