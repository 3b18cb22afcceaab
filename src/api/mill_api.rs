// ==========================================
// 选矿厂运营系统 - 磨机管理 API
// ==========================================
// 职责: 磨机档案 CRUD、释放、可用列表
// ==========================================

use std::sync::Arc;

use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::mill::Mill;
use crate::domain::types::{MillStatus, Page, PageRequest};
use crate::repository::mill_repo::MillRepository;

// ==========================================
// MillApi - 磨机管理 API
// ==========================================
pub struct MillApi {
    mill_repo: Arc<MillRepository>,
}

impl MillApi {
    pub fn new(mill_repo: Arc<MillRepository>) -> Self {
        Self { mill_repo }
    }

    fn check_profile(name: &str, capacity_sacks: u32) -> ApiResult<()> {
        if name.trim().is_empty() {
            return Err(ApiError::InvalidInput("磨机名称不能为空".to_string()));
        }
        if capacity_sacks == 0 {
            return Err(ApiError::InvalidInput("磨机容量必须大于0".to_string()));
        }
        Ok(())
    }

    /// 新建磨机（mill_id 由调用方指定，便于与现场编号一致）
    pub fn create_mill(&self, mill_id: &str, name: &str, capacity_sacks: u32) -> ApiResult<Mill> {
        if mill_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("磨机ID不能为空".to_string()));
        }
        Self::check_profile(name, capacity_sacks)?;

        let mill = Mill::new(mill_id.trim().to_string(), name.trim().to_string(), capacity_sacks);
        self.mill_repo.insert(&mill)?;
        info!(mill_id = %mill.mill_id, capacity = capacity_sacks, "磨机已创建");
        Ok(mill)
    }

    pub fn get_mill(&self, mill_id: &str) -> ApiResult<Mill> {
        if mill_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("磨机ID不能为空".to_string()));
        }
        self.mill_repo
            .find_by_id(mill_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Mill(id={})不存在", mill_id)))
    }

    pub fn update_mill(&self, mill_id: &str, name: &str, capacity_sacks: u32) -> ApiResult<Mill> {
        Self::check_profile(name, capacity_sacks)?;
        self.mill_repo.update_profile(mill_id, name.trim(), capacity_sacks)?;
        info!(mill_id = %mill_id, capacity = capacity_sacks, "磨机已更新");
        self.get_mill(mill_id)
    }

    /// 删除磨机（仅 FREE）
    pub fn delete_mill(&self, mill_id: &str) -> ApiResult<()> {
        self.mill_repo.delete(mill_id)?;
        info!(mill_id = %mill_id, "磨机已删除");
        Ok(())
    }

    pub fn list_mills(&self, status: Option<MillStatus>, page: PageRequest) -> ApiResult<Page<Mill>> {
        Ok(self.mill_repo.list(status, page)?)
    }

    pub fn count_mills(&self, status: Option<MillStatus>) -> ApiResult<i64> {
        Ok(self.mill_repo.count(status)?)
    }

    /// 当前空闲的磨机
    pub fn list_available(&self) -> ApiResult<Vec<Mill>> {
        Ok(self
            .mill_repo
            .list_all()?
            .into_iter()
            .filter(Mill::is_available)
            .collect())
    }

    /// 磨矿结束，释放磨机（BUSY -> FREE）
    pub fn release_mill(&self, mill_id: &str) -> ApiResult<Mill> {
        self.mill_repo.release(mill_id)?;
        info!(mill_id = %mill_id, "磨机已释放");
        self.get_mill(mill_id)
    }
}
