// ==========================================
// 选矿厂运营系统 - 磨矿分配 API
// ==========================================
// 职责: 分配会话生命周期、命令应用、提交校验与原子提交、登记查询
// 流程: open_session -> apply_command* -> validate -> submit
// ==========================================

use std::sync::Arc;

use chrono::{Local, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::session_store::SessionStore;
use crate::config::ConfigManager;
use crate::domain::allocation::{AllocationCommand, AllocationSession, ClientSnapshot};
use crate::domain::milling_log::{MillBreakdownEntry, MillLoad, MillingLog, MillingSubmission};
use crate::domain::types::{Page, PageRequest};
use crate::engine::allocation::{AllocationEngine, AllocationTotals};
use crate::engine::validation::{collect_violations, validate_submission};
use crate::repository::error::RepositoryError;
use crate::repository::milling_log_repo::{MillingLogFilter, MillingLogRepository};
use crate::repository::ports::{ClientDirectory, MillDirectory, MillingLogSink};

// ==========================================
// 返回结构
// ==========================================

/// 会话视图（会话状态 + 汇总）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationView {
    pub session: AllocationSession,
    pub totals: AllocationTotals,
}

/// 单条校验问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,
}

/// 校验结果（列出全部问题，供界面逐条提示）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub issues: Vec<ValidationIssue>,
}

/// 提交回执
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub log_id: String,
    pub total_units: i64,
    pub estimated_minutes: u32,
    pub projected_end: Option<String>,
    pub mills: Vec<String>,
}

// ==========================================
// AllocationApi - 磨矿分配 API
// ==========================================
pub struct AllocationApi {
    mills: Arc<dyn MillDirectory>,
    clients: Arc<dyn ClientDirectory>,
    sink: Arc<dyn MillingLogSink>,
    log_repo: Arc<MillingLogRepository>,
    config: Arc<ConfigManager>,
    sessions: Arc<SessionStore>,
}

impl AllocationApi {
    pub fn new(
        mills: Arc<dyn MillDirectory>,
        clients: Arc<dyn ClientDirectory>,
        sink: Arc<dyn MillingLogSink>,
        log_repo: Arc<MillingLogRepository>,
        config: Arc<ConfigManager>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            mills,
            clients,
            sink,
            log_repo,
            config,
            sessions,
        }
    }

    /// 按当前配置的时长表构造引擎
    fn engine(&self) -> ApiResult<AllocationEngine> {
        Ok(AllocationEngine::with_table(self.config.get_duration_table()?))
    }

    fn view(&self, engine: &AllocationEngine, session: &AllocationSession) -> AllocationView {
        AllocationView {
            session: session.clone(),
            totals: engine.compute_totals(session),
        }
    }

    // ==========================================
    // 会话生命周期
    // ==========================================

    /// 新建分配会话
    ///
    /// # 参数
    /// - start_time: 开始时刻，缺省取当前时刻（精确到分钟）
    pub fn open_session(&self, start_time: Option<NaiveTime>) -> ApiResult<AllocationView> {
        let max_mills = self.config.get_max_mills()? as usize;
        let mills: Vec<_> = self.mills.list_mills()?.into_iter().take(max_mills).collect();
        if mills.is_empty() {
            return Err(ApiError::BusinessRuleViolation("尚未登记任何磨机".to_string()));
        }

        let start_time = start_time.unwrap_or_else(current_minute);
        let engine = self.engine()?;
        let mut session = AllocationSession::new(Uuid::new_v4().to_string(), &mills, start_time);
        engine.refresh_derived(&mut session);

        let view = self.view(&engine, &session);
        self.sessions.insert(session)?;
        info!(session_id = %view.session.session_id, mills = mills.len(), "分配会话已创建");
        Ok(view)
    }

    pub fn get_session(&self, session_id: &str) -> ApiResult<AllocationView> {
        let engine = self.engine()?;
        let session = self.sessions.get(session_id)?;
        Ok(self.view(&engine, &session))
    }

    pub fn close_session(&self, session_id: &str) -> ApiResult<bool> {
        self.sessions.remove(session_id)
    }

    // ==========================================
    // 会话操作
    // ==========================================

    /// 应用一条界面命令并返回重算后的视图
    ///
    /// SelectClient / SyncMills 携带客户库存与磨机目录快照，只能由
    /// select_client / refresh_mills 从目录读取后下发，这里拒绝。
    pub fn apply_command(&self, session_id: &str, command: AllocationCommand) -> ApiResult<AllocationView> {
        if matches!(command, AllocationCommand::SelectClient { .. } | AllocationCommand::SyncMills { .. }) {
            warn!(session_id, "拒绝外部下发的目录快照命令");
            return Err(ApiError::InvalidInput(
                "客户与磨机快照须通过 select_client / refresh_mills 获取".to_string(),
            ));
        }
        self.apply_internal(session_id, command)
    }

    fn apply_internal(&self, session_id: &str, command: AllocationCommand) -> ApiResult<AllocationView> {
        let engine = self.engine()?;
        self.sessions.update(session_id, |session| {
            engine.apply(session, command)?;
            Ok(self.view(&engine, session))
        })
    }

    /// 选择客户（从客户目录读取最新库存）
    pub fn select_client(&self, session_id: &str, client_id: &str) -> ApiResult<AllocationView> {
        if client_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("客户ID不能为空".to_string()));
        }
        let client = self
            .clients
            .find_client(client_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Client(id={})不存在", client_id)))?;

        self.apply_internal(
            session_id,
            AllocationCommand::SelectClient {
                client: ClientSnapshot::from(&client),
            },
        )
    }

    /// 刷新磨机可用状态
    pub fn refresh_mills(&self, session_id: &str) -> ApiResult<AllocationView> {
        let mills = self.mills.list_mills()?;
        self.apply_internal(session_id, AllocationCommand::SyncMills { mills })
    }

    /// 列出全部校验问题（不提交）
    pub fn validate(&self, session_id: &str) -> ApiResult<ValidationReport> {
        let session = self.sessions.get(session_id)?;
        let issues: Vec<ValidationIssue> = collect_violations(&session)
            .into_iter()
            .map(|f| ValidationIssue {
                code: f.code().to_string(),
                message: f.message(),
            })
            .collect();
        Ok(ValidationReport {
            ok: issues.is_empty(),
            issues,
        })
    }

    // ==========================================
    // 提交
    // ==========================================

    /// 提交分配
    ///
    /// 步骤:
    /// 1. 刷新磨机状态
    /// 2. 按规则顺序校验（失败不落库、不清空会话）
    /// 3. 单事务落库（登记 + 扣库存 + 占用磨机）
    /// 4. 成功后重置会话
    #[instrument(skip(self), fields(session_id = %session_id))]
    pub fn submit(&self, session_id: &str, operator: &str) -> ApiResult<SubmissionReceipt> {
        if operator.trim().is_empty() {
            return Err(ApiError::InvalidInput("操作人不能为空".to_string()));
        }

        let engine = self.engine()?;
        let mills = self.mills.list_mills()?;

        let (submission, mill_names) = self.sessions.update(session_id, |session| {
            engine.apply(session, AllocationCommand::SyncMills { mills })?;
            if let Err(failure) = validate_submission(session) {
                warn!(code = failure.code(), "提交校验未通过");
                return Err(failure.into());
            }
            Ok(build_submission(&engine, session, operator))
        })?;

        let log_id = self.sink.submit(&submission).map_err(|e| {
            warn!(error = %e, "提交事务回滚");
            map_submission_error(e, &submission, &mill_names)
        })?;

        self.sessions
            .update(session_id, |session| Ok(engine.apply(session, AllocationCommand::Reset)?))?;

        info!(log_id = %log_id, operator = operator, "磨矿分配已提交");
        Ok(SubmissionReceipt {
            log_id,
            total_units: submission.log.total_units,
            estimated_minutes: submission.log.estimated_minutes,
            projected_end: submission.log.projected_end.clone(),
            mills: submission.mill_loads.iter().map(|l| l.mill_id.clone()).collect(),
        })
    }

    // ==========================================
    // 登记查询
    // ==========================================

    pub fn get_log(&self, log_id: &str) -> ApiResult<MillingLog> {
        if log_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("登记ID不能为空".to_string()));
        }
        self.log_repo
            .find_by_id(log_id)?
            .ok_or_else(|| ApiError::NotFound(format!("MillingLog(id={})不存在", log_id)))
    }

    pub fn list_logs(&self, filter: &MillingLogFilter, page: PageRequest) -> ApiResult<Page<MillingLog>> {
        if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
            if from > to {
                return Err(ApiError::InvalidInput("开始日期晚于结束日期".to_string()));
            }
        }
        Ok(self.log_repo.list(filter, page)?)
    }
}

fn current_minute() -> NaiveTime {
    let now = Local::now().time();
    NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(now)
}

/// 由已通过校验的会话生成待落库提交，同时返回 mill_id -> 名称 映射
fn build_submission(
    engine: &AllocationEngine,
    session: &AllocationSession,
    operator: &str,
) -> (MillingSubmission, Vec<(String, String)>) {
    let totals = engine.compute_totals(session);

    let used: Vec<_> = session
        .active_allocations()
        .filter(|a| a.coarse_qty + a.fine_qty > 0)
        .collect();

    let breakdown: Vec<MillBreakdownEntry> = used
        .iter()
        .map(|a| MillBreakdownEntry {
            mill_id: a.mill_id.clone(),
            mill_name: a.mill_name.clone(),
            coarse: a.coarse_qty,
            fine: a.fine_qty,
            total: a.coarse_qty + a.fine_qty,
            estimated_minutes: a.estimated_minutes,
            projected_end: a.projected_end.clone(),
        })
        .collect();

    let mill_loads = used
        .iter()
        .map(|a| MillLoad {
            mill_id: a.mill_id.clone(),
            sacks: a.coarse_qty + a.fine_qty,
        })
        .collect();
    let names = used
        .iter()
        .map(|a| (a.mill_id.clone(), a.mill_name.clone()))
        .collect();

    let observations = session.observations.trim();
    let log = MillingLog {
        log_id: Uuid::new_v4().to_string(),
        client_id: session.client_id.clone().unwrap_or_default(),
        mineral_category: session.mineral_category,
        total_coarse: totals.total_coarse,
        total_fine: totals.total_fine,
        total_units: totals.total_units,
        estimated_minutes: totals.estimated_minutes,
        start_time: totals.start_time,
        projected_end: totals.projected_end,
        breakdown_json: serde_json::json!(breakdown),
        observations: (!observations.is_empty()).then(|| observations.to_string()),
        operator: operator.trim().to_string(),
        created_at: Local::now().naive_local(),
    };

    (MillingSubmission { log, mill_loads }, names)
}

/// 事务内失败映射为界面可区分的错误
fn map_submission_error(
    err: RepositoryError,
    submission: &MillingSubmission,
    mill_names: &[(String, String)],
) -> ApiError {
    match err {
        RepositoryError::MillNotAvailable { mill_id, .. } => {
            let name = mill_names
                .iter()
                .find(|(id, _)| *id == mill_id)
                .map(|(_, name)| name.clone())
                .unwrap_or(mill_id);
            ApiError::StaleAvailability { mills: vec![name] }
        }
        RepositoryError::InsufficientStock { .. } => ApiError::Validation {
            code: "INSUFFICIENT_STOCK".to_string(),
            message: err.to_string(),
        },
        RepositoryError::NotFound { .. } => err.into(),
        other => ApiError::SubmissionFailed(format!(
            "log_id={}: {}",
            submission.log.log_id, other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::domain::client::Client;
    use crate::domain::mill::Mill;
    use crate::domain::types::{DurationBucket, MillStatus, MineralCategory, OreSubtype};
    use crate::repository::error::RepositoryResult;
    use std::sync::Mutex;

    // ===== 测试替身 =====

    struct FakeMills(Mutex<Vec<Mill>>);

    impl MillDirectory for FakeMills {
        fn list_mills(&self) -> RepositoryResult<Vec<Mill>> {
            Ok(self.0.lock().unwrap().clone())
        }
    }

    struct FakeClients(Vec<Client>);

    impl ClientDirectory for FakeClients {
        fn find_client(&self, client_id: &str) -> RepositoryResult<Option<Client>> {
            Ok(self.0.iter().find(|c| c.client_id == client_id).cloned())
        }
    }

    /// 记录提交；fail=true 时模拟事务回滚
    struct FakeSink {
        fail: bool,
        submitted: Mutex<Vec<MillingSubmission>>,
    }

    impl MillingLogSink for FakeSink {
        fn submit(&self, submission: &MillingSubmission) -> RepositoryResult<String> {
            if self.fail {
                return Err(RepositoryError::DatabaseTransactionError("disk full".to_string()));
            }
            self.submitted.lock().unwrap().push(submission.clone());
            Ok(submission.log.log_id.clone())
        }
    }

    struct Fixture {
        api: AllocationApi,
        mills: Arc<FakeMills>,
        sink: Arc<FakeSink>,
    }

    fn fixture(fail: bool) -> Fixture {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        let mills = Arc::new(FakeMills(Mutex::new(vec![
            Mill::new("M1".to_string(), "Molino 1".to_string(), 100),
            Mill::new("M2".to_string(), "Molino 2".to_string(), 100),
        ])));
        let mut client = Client::new("C1".to_string(), "Minera Sur".to_string(), MineralCategory::A);
        client.coarse_stock = 80;
        client.fine_stock = 40;
        let sink = Arc::new(FakeSink {
            fail,
            submitted: Mutex::new(Vec::new()),
        });
        let api = AllocationApi::new(
            mills.clone(),
            Arc::new(FakeClients(vec![client])),
            sink.clone(),
            Arc::new(MillingLogRepository::new(conn.clone())),
            Arc::new(ConfigManager::from_connection(conn).unwrap()),
            Arc::new(SessionStore::new()),
        );
        Fixture { api, mills, sink }
    }

    fn prepared_session(api: &AllocationApi) -> String {
        let view = api
            .open_session(NaiveTime::from_hms_opt(23, 30, 0))
            .unwrap();
        let id = view.session.session_id;
        api.select_client(&id, "C1").unwrap();
        api.apply_command(
            &id,
            AllocationCommand::SetBucket {
                bucket: DurationBucket::A100,
                selected: true,
            },
        )
        .unwrap();
        api.apply_command(
            &id,
            AllocationCommand::SetQuantity {
                mill_id: "M1".to_string(),
                subtype: OreSubtype::Coarse,
                quantity: 50,
            },
        )
        .unwrap();
        id
    }

    #[test]
    fn test_submit_success_resets_session() {
        let f = fixture(false);
        let id = prepared_session(&f.api);

        let receipt = f.api.submit(&id, "operador").unwrap();
        assert_eq!(receipt.total_units, 50);
        assert_eq!(receipt.estimated_minutes, 100);
        assert_eq!(receipt.projected_end.as_deref(), Some("01:10"));
        assert_eq!(receipt.mills, vec!["M1"]);

        let submitted = f.sink.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        let breakdown = submitted[0].log.breakdown().unwrap();
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].coarse, 50);

        let view = f.api.get_session(&id).unwrap();
        assert!(view.session.client_id.is_none());
        assert_eq!(view.totals.total_units, 0);
        assert!(view.session.duration_selection.is_empty());
    }

    #[test]
    fn test_failed_transaction_keeps_session() {
        let f = fixture(true);
        let id = prepared_session(&f.api);

        let err = f.api.submit(&id, "operador").unwrap_err();
        assert_eq!(err.code(), "SUBMISSION_FAILED");

        let view = f.api.get_session(&id).unwrap();
        assert_eq!(view.session.client_id.as_deref(), Some("C1"));
        assert_eq!(view.totals.total_units, 50);
    }

    #[test]
    fn test_stale_mill_rejected_before_sink() {
        let f = fixture(false);
        let id = prepared_session(&f.api);
        f.mills.0.lock().unwrap()[0].status = MillStatus::Busy;

        let err = f.api.submit(&id, "operador").unwrap_err();
        match err {
            ApiError::StaleAvailability { mills } => assert_eq!(mills, vec!["Molino 1"]),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(f.sink.submitted.lock().unwrap().is_empty());

        // 磨机仍保持选中
        let view = f.api.get_session(&id).unwrap();
        assert!(view.session.allocation("M1").unwrap().active);
    }

    #[test]
    fn test_validate_lists_all_issues_in_order() {
        let f = fixture(false);
        let view = f.api.open_session(None).unwrap();
        let report = f.api.validate(&view.session.session_id).unwrap();
        assert!(!report.ok);
        let codes: Vec<&str> = report.issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["NO_CLIENT", "NO_DURATION_BUCKET", "NO_ACTIVE_MILL"]);

        let err = f.api.submit(&view.session.session_id, "op").unwrap_err();
        assert_eq!(err.code(), "NO_CLIENT");
    }

    #[test]
    fn test_unknown_client_and_mill() {
        let f = fixture(false);
        let id = f.api.open_session(None).unwrap().session.session_id;
        assert!(matches!(f.api.select_client(&id, "C9"), Err(ApiError::NotFound(_))));
        assert!(matches!(
            f.api.apply_command(&id, AllocationCommand::ToggleMill { mill_id: "M9".to_string() }),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(f.api.get_session("nope"), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_snapshot_commands_rejected_from_callers() {
        let f = fixture(false);
        let id = f.api.open_session(None).unwrap().session.session_id;

        let forged_client = ClientSnapshot {
            client_id: "C1".to_string(),
            name: "Minera Sur".to_string(),
            mineral_category: MineralCategory::A,
            stock: crate::domain::client::StockLevels::new(1_000_000, 1_000_000),
        };
        let err = f
            .api
            .apply_command(&id, AllocationCommand::SelectClient { client: forged_client })
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");

        let forged_mills = vec![Mill::new("M1".to_string(), "Molino 1".to_string(), 10_000)];
        let err = f
            .api
            .apply_command(&id, AllocationCommand::SyncMills { mills: forged_mills })
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");

        // 会话未被改动
        let view = f.api.get_session(&id).unwrap();
        assert!(view.session.client_id.is_none());
        assert_eq!(view.session.allocation("M1").unwrap().capacity, 100);

        // 专用接口仍可用
        f.api.select_client(&id, "C1").unwrap();
        let view = f.api.refresh_mills(&id).unwrap();
        assert_eq!(view.session.available_stock.coarse, 80);
    }

    #[test]
    fn test_max_mills_limits_session() {
        let f = fixture(false);
        f.api
            .config
            .set_value(crate::config::config_keys::MAX_MILLS, "1")
            .unwrap();
        let view = f.api.open_session(None).unwrap();
        assert_eq!(view.session.allocations.len(), 1);
    }
}
