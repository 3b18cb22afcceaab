// ==========================================
// 选矿厂运营系统 - 用户数据仓储
// ==========================================

use crate::domain::types::{Page, PageRequest, UserRole};
use crate::domain::user::User;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::query::{format_ts, page_clause, parse_enum, parse_ts};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const USER_COLUMNS: &str = "user_id, username, full_name, role, active, created_at";

fn map_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        user_id: row.get(0)?,
        username: row.get(1)?,
        full_name: row.get(2)?,
        role: parse_enum(3, &row.get::<_, String>(3)?, UserRole::parse)?,
        active: row.get(4)?,
        created_at: parse_ts(5, &row.get::<_, String>(5)?)?,
    })
}

pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新建用户（username 唯一）
    pub fn insert(&self, user: &User) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            &format!("INSERT INTO app_user ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)", USER_COLUMNS),
            params![
                user.user_id,
                user.username,
                user.full_name,
                user.role.to_db_str(),
                user.active,
                format_ts(&user.created_at),
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, user_id: &str) -> RepositoryResult<Option<User>> {
        self.find_one("user_id", user_id)
    }

    pub fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        self.find_one("username", username)
    }

    fn find_one(&self, column: &'static str, value: &str) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM app_user WHERE {} = ?1", USER_COLUMNS, column),
                params![value],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    /// 更新姓名与角色
    pub fn update_profile(&self, user_id: &str, full_name: &str, role: UserRole) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE app_user SET full_name = ?2, role = ?3 WHERE user_id = ?1",
            params![user_id, full_name, role.to_db_str()],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("User", user_id));
        }
        Ok(())
    }

    /// 启用/停用
    pub fn set_active(&self, user_id: &str, active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE app_user SET active = ?2 WHERE user_id = ?1",
            params![user_id, active],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("User", user_id));
        }
        Ok(())
    }

    pub fn list(&self, page: PageRequest) -> RepositoryResult<Page<User>> {
        let conn = self.get_conn()?;
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM app_user", [], |row| row.get(0))?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM app_user ORDER BY username{}",
            USER_COLUMNS,
            page_clause(&page)
        ))?;
        let items = stmt
            .query_map([], map_user)?
            .collect::<rusqlite::Result<Vec<User>>>()?;
        Ok(Page::new(items, total, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn setup() -> UserRepository {
        UserRepository::new(Arc::new(Mutex::new(open_in_memory().unwrap())))
    }

    fn user(id: &str, username: &str) -> User {
        User {
            user_id: id.to_string(),
            username: username.to_string(),
            full_name: "Operador".to_string(),
            role: UserRole::Operator,
            active: true,
            created_at: chrono::Local::now().naive_local(),
        }
    }

    #[test]
    fn test_username_unique() {
        let repo = setup();
        repo.insert(&user("U1", "jperez")).unwrap();
        let err = repo.insert(&user("U2", "jperez")).unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }

    #[test]
    fn test_update_and_deactivate() {
        let repo = setup();
        repo.insert(&user("U1", "jperez")).unwrap();
        repo.update_profile("U1", "Juan Perez", UserRole::Admin).unwrap();
        repo.set_active("U1", false).unwrap();

        let u = repo.find_by_username("jperez").unwrap().unwrap();
        assert_eq!(u.full_name, "Juan Perez");
        assert_eq!(u.role, UserRole::Admin);
        assert!(!u.active);

        assert!(matches!(
            repo.set_active("U9", true),
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_list_paged_by_username() {
        let repo = setup();
        repo.insert(&user("U1", "zeta")).unwrap();
        repo.insert(&user("U2", "alfa")).unwrap();

        let page = repo.list(PageRequest::new(1, 1)).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].username, "alfa");
        assert_eq!(page.total_pages(), 2);
    }
}
