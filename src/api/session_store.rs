// ==========================================
// 选矿厂运营系统 - 分配会话存储
// ==========================================
// 职责: 持有进行中的分配会话（按 session_id）
// 红线: 由 AppState 构造注入，不做进程级全局单例
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::allocation::AllocationSession;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, AllocationSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ApiResult<MutexGuard<HashMap<String, AllocationSession>>> {
        self.sessions
            .lock()
            .map_err(|e| ApiError::InternalError(format!("会话存储锁获取失败: {}", e)))
    }

    pub fn insert(&self, session: AllocationSession) -> ApiResult<()> {
        self.lock()?.insert(session.session_id.clone(), session);
        Ok(())
    }

    /// 读取会话副本
    pub fn get(&self, session_id: &str) -> ApiResult<AllocationSession> {
        self.lock()?
            .get(session_id)
            .cloned()
            .ok_or_else(|| session_not_found(session_id))
    }

    /// 在锁内修改会话；闭包返回错误时，已做的修改仍保留在会话中
    pub fn update<R, F>(&self, session_id: &str, f: F) -> ApiResult<R>
    where
        F: FnOnce(&mut AllocationSession) -> ApiResult<R>,
    {
        let mut sessions = self.lock()?;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        f(session)
    }

    pub fn remove(&self, session_id: &str) -> ApiResult<bool> {
        Ok(self.lock()?.remove(session_id).is_some())
    }

    pub fn len(&self) -> ApiResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> ApiResult<bool> {
        Ok(self.len()? == 0)
    }
}

fn session_not_found(session_id: &str) -> ApiError {
    ApiError::NotFound(format!("分配会话(id={})不存在", session_id))
}
