// ==========================================
// 选矿厂运营系统 - 客户管理 API
// ==========================================
// 职责: 客户档案 CRUD、入库与盘点
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::client::Client;
use crate::domain::types::{MineralCategory, Page, PageRequest};
use crate::repository::client_repo::{ClientFilter, ClientRepository};

/// 客户新建/修改请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInput {
    pub name: String,
    pub document_id: Option<String>,
    pub phone: Option<String>,
    pub mineral_category: MineralCategory,
}

impl ClientInput {
    fn validate(&self) -> ApiResult<()> {
        if self.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("客户名称不能为空".to_string()));
        }
        Ok(())
    }
}

fn blank_to_none(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ==========================================
// ClientApi - 客户管理 API
// ==========================================
pub struct ClientApi {
    client_repo: Arc<ClientRepository>,
}

impl ClientApi {
    pub fn new(client_repo: Arc<ClientRepository>) -> Self {
        Self { client_repo }
    }

    /// 新建客户（库存初始为 0）
    pub fn create_client(&self, input: &ClientInput) -> ApiResult<Client> {
        input.validate()?;

        let mut client = Client::new(
            Uuid::new_v4().to_string(),
            input.name.trim().to_string(),
            input.mineral_category,
        );
        client.document_id = blank_to_none(&input.document_id);
        client.phone = blank_to_none(&input.phone);

        self.client_repo.insert(&client)?;
        info!(client_id = %client.client_id, name = %client.name, "客户已创建");
        Ok(client)
    }

    pub fn get_client(&self, client_id: &str) -> ApiResult<Client> {
        if client_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("客户ID不能为空".to_string()));
        }
        self.client_repo
            .find_by_id(client_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Client(id={})不存在", client_id)))
    }

    /// 修改档案（不改库存）
    pub fn update_client(&self, client_id: &str, input: &ClientInput) -> ApiResult<Client> {
        input.validate()?;
        let mut client = self.get_client(client_id)?;

        client.name = input.name.trim().to_string();
        client.document_id = blank_to_none(&input.document_id);
        client.phone = blank_to_none(&input.phone);
        client.mineral_category = input.mineral_category;
        client.updated_at = chrono::Local::now().naive_local();

        self.client_repo.update_profile(&client)?;
        info!(client_id = %client_id, "客户已更新");
        Ok(client)
    }

    pub fn delete_client(&self, client_id: &str) -> ApiResult<()> {
        if client_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("客户ID不能为空".to_string()));
        }
        self.client_repo.delete(client_id)?;
        info!(client_id = %client_id, "客户已删除");
        Ok(())
    }

    pub fn list_clients(&self, filter: &ClientFilter, page: PageRequest) -> ApiResult<Page<Client>> {
        Ok(self.client_repo.list(filter, page)?)
    }

    pub fn count_clients(&self, filter: &ClientFilter) -> ApiResult<i64> {
        Ok(self.client_repo.count(filter)?)
    }

    /// 入库（袋数均不得为负，且至少一项大于 0）
    pub fn receive_stock(&self, client_id: &str, coarse: i64, fine: i64) -> ApiResult<Client> {
        if coarse < 0 || fine < 0 {
            return Err(ApiError::InvalidInput("入库袋数不能为负".to_string()));
        }
        if coarse == 0 && fine == 0 {
            return Err(ApiError::InvalidInput("入库袋数不能全为0".to_string()));
        }
        self.client_repo.add_stock(client_id, coarse, fine)?;
        info!(client_id = %client_id, coarse = coarse, fine = fine, "客户入库");
        self.get_client(client_id)
    }

    /// 盘点（设为绝对值）
    pub fn adjust_stock(&self, client_id: &str, coarse: i64, fine: i64) -> ApiResult<Client> {
        if coarse < 0 || fine < 0 {
            return Err(ApiError::InvalidInput("库存不能为负".to_string()));
        }
        self.client_repo.set_stock(client_id, coarse, fine)?;
        info!(client_id = %client_id, coarse = coarse, fine = fine, "客户库存盘点");
        self.get_client(client_id)
    }
}
