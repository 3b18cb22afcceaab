// ==========================================
// 选矿厂运营系统 - 用户管理 API
// ==========================================

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::{Page, PageRequest, UserRole};
use crate::domain::user::User;
use crate::repository::user_repo::UserRepository;

pub struct UserApi {
    user_repo: Arc<UserRepository>,
}

impl UserApi {
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    /// 新建用户（用户名唯一，不区分前后空格）
    pub fn create_user(&self, username: &str, full_name: &str, role: UserRole) -> ApiResult<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ApiError::InvalidInput("用户名不能为空".to_string()));
        }
        if full_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("姓名不能为空".to_string()));
        }
        if self.user_repo.find_by_username(username)?.is_some() {
            return Err(ApiError::BusinessRuleViolation(format!("用户名{}已存在", username)));
        }

        let user = User {
            user_id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            full_name: full_name.trim().to_string(),
            role,
            active: true,
            created_at: chrono::Local::now().naive_local(),
        };
        self.user_repo.insert(&user)?;
        info!(user_id = %user.user_id, username = %user.username, role = %role, "用户已创建");
        Ok(user)
    }

    pub fn get_user(&self, user_id: &str) -> ApiResult<User> {
        self.user_repo
            .find_by_id(user_id)?
            .ok_or_else(|| ApiError::NotFound(format!("User(id={})不存在", user_id)))
    }

    pub fn update_user(&self, user_id: &str, full_name: &str, role: UserRole) -> ApiResult<User> {
        if full_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("姓名不能为空".to_string()));
        }
        self.user_repo.update_profile(user_id, full_name.trim(), role)?;
        self.get_user(user_id)
    }

    pub fn set_user_active(&self, user_id: &str, active: bool) -> ApiResult<User> {
        self.user_repo.set_active(user_id, active)?;
        info!(user_id = %user_id, active = active, "用户状态变更");
        self.get_user(user_id)
    }

    pub fn list_users(&self, page: PageRequest) -> ApiResult<Page<User>> {
        Ok(self.user_repo.list(page)?)
    }
}
