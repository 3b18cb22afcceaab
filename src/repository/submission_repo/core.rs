use crate::domain::milling_log::MillingSubmission;
use crate::domain::types::MillStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::mill_repo::read_status;
use crate::repository::milling_log_repo::insert_log;
use crate::repository::query::format_ts;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

// ==========================================
// SubmissionRepository - 磨矿提交仓储
// ==========================================
pub struct SubmissionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SubmissionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 原子提交
    ///
    /// # 返回
    /// - `Ok(log_id)`: 已落库
    /// - `Err(InsufficientStock)`: 事务内复核库存不足
    /// - `Err(MillNotAvailable)`: 事务内发现磨机已非 FREE
    /// - `Err(NotFound)`: 客户或磨机不存在
    pub fn submit(&self, submission: &MillingSubmission) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let log = &submission.log;
        let (required_coarse, required_fine) = submission.required_stock();

        // 1) 复核库存
        let stock: Option<(i64, i64)> = tx
            .query_row(
                "SELECT coarse_stock, fine_stock FROM client WHERE client_id = ?1",
                params![log.client_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (available_coarse, available_fine) =
            stock.ok_or_else(|| RepositoryError::not_found("Client", &log.client_id))?;

        if required_coarse > available_coarse || required_fine > available_fine {
            return Err(RepositoryError::InsufficientStock {
                client_id: log.client_id.clone(),
                required_coarse,
                required_fine,
                available_coarse,
                available_fine,
            });
        }

        // 2) 复核磨机状态
        for load in &submission.mill_loads {
            let status = read_status(&tx, &load.mill_id)?;
            if status != MillStatus::Free {
                return Err(RepositoryError::MillNotAvailable {
                    mill_id: load.mill_id.clone(),
                    status: status.to_string(),
                });
            }
        }

        // 3) 写登记
        insert_log(&tx, log)?;

        // 4) 扣库存
        let now = format_ts(&log.created_at);
        tx.execute(
            r#"
            UPDATE client
            SET coarse_stock = coarse_stock - ?2,
                fine_stock = fine_stock - ?3,
                updated_at = ?4
            WHERE client_id = ?1
            "#,
            params![log.client_id, required_coarse, required_fine, now],
        )?;

        // 5) 占用磨机
        for load in &submission.mill_loads {
            tx.execute(
                r#"
                UPDATE mill
                SET status = 'BUSY', occupant_client_id = ?2, occupant_sacks = ?3,
                    busy_since = ?4, updated_at = ?4
                WHERE mill_id = ?1
                "#,
                params![load.mill_id, log.client_id, load.sacks, now],
            )?;
            debug!(mill_id = %load.mill_id, sacks = load.sacks, "磨机占用");
        }

        tx.commit()?;

        info!(
            log_id = %log.log_id,
            client_id = %log.client_id,
            mills = submission.mill_loads.len(),
            units = log.total_units,
            "磨矿登记已提交"
        );
        Ok(log.log_id.clone())
    }
}
