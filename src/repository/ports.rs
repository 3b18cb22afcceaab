// ==========================================
// 选矿厂运营系统 - 分配计算的外部协作接口
// ==========================================
// 分配 API 只依赖这三个 trait，便于测试替换
// - MillDirectory: 磨机清单与实时状态
// - ClientDirectory: 客户与库存
// - MillingLogSink: 原子提交
// ==========================================

use crate::domain::client::Client;
use crate::domain::mill::Mill;
use crate::domain::milling_log::MillingSubmission;
use crate::repository::client_repo::ClientRepository;
use crate::repository::error::RepositoryResult;
use crate::repository::mill_repo::MillRepository;
use crate::repository::submission_repo::SubmissionRepository;

pub trait MillDirectory: Send + Sync {
    /// 全部磨机（按 mill_id 排序）
    fn list_mills(&self) -> RepositoryResult<Vec<Mill>>;
}

pub trait ClientDirectory: Send + Sync {
    fn find_client(&self, client_id: &str) -> RepositoryResult<Option<Client>>;
}

pub trait MillingLogSink: Send + Sync {
    /// 原子写入，返回登记ID
    fn submit(&self, submission: &MillingSubmission) -> RepositoryResult<String>;
}

impl MillDirectory for MillRepository {
    fn list_mills(&self) -> RepositoryResult<Vec<Mill>> {
        self.list_all()
    }
}

impl ClientDirectory for ClientRepository {
    fn find_client(&self, client_id: &str) -> RepositoryResult<Option<Client>> {
        self.find_by_id(client_id)
    }
}

impl MillingLogSink for SubmissionRepository {
    fn submit(&self, submission: &MillingSubmission) -> RepositoryResult<String> {
        SubmissionRepository::submit(self, submission)
    }
}
