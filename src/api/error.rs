// ==========================================
// 选矿厂运营系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository/Engine错误为用户可读的错误消息
// 约束: 任何错误都不致命，最终映射为前端提示
// ==========================================

use crate::engine::allocation::AllocationError;
use crate::engine::validation::ValidationFailure;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 分配提交错误
    // ==========================================
    /// 提交前校验失败（code 为稳定错误码）
    #[error("{message}")]
    Validation { code: String, message: String },

    /// 磨机状态已变化（选中的磨机不再空闲）
    #[error("磨机不可用: {}", .mills.join(", "))]
    StaleAvailability { mills: Vec<String> },

    /// 提交事务已回滚
    #[error("提交失败: {0}")]
    SubmissionFailed(String),

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 稳定错误码（前端提示分类用）
    pub fn code(&self) -> &str {
        match self {
            ApiError::Validation { code, .. } => code,
            ApiError::StaleAvailability { .. } => "STALE_AVAILABILITY",
            ApiError::SubmissionFailed(_) => "SUBMISSION_FAILED",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BusinessRuleViolation(_) => "BUSINESS_RULE_VIOLATION",
            ApiError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::DatabaseConnectionError(_) => "DATABASE_CONNECTION_ERROR",
            ApiError::DatabaseTransactionError(_) => "DATABASE_TRANSACTION_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Other(_) => "OTHER_ERROR",
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将Repository层的技术错误转换为用户可读的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 数据库错误
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::CheckConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("取值约束违反: {}", msg))
            }

            // 业务规则错误
            RepositoryError::BusinessRuleViolation(msg) => ApiError::BusinessRuleViolation(msg),
            RepositoryError::InvalidStateTransition { from, to } => {
                ApiError::InvalidStateTransition { from, to }
            }
            RepositoryError::MillNotAvailable { mill_id, status } => {
                ApiError::BusinessRuleViolation(format!("磨机{}当前状态为{}", mill_id, status))
            }
            RepositoryError::InsufficientStock {
                client_id,
                required_coarse,
                required_fine,
                available_coarse,
                available_fine,
            } => ApiError::BusinessRuleViolation(format!(
                "客户{}库存不足: 需要粗矿{}/细矿{}, 现有粗矿{}/细矿{}",
                client_id, required_coarse, required_fine, available_coarse, available_fine
            )),

            // 数据质量错误
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }

            // 通用错误
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<AllocationError> for ApiError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::UnknownMill(mill_id) => {
                ApiError::NotFound(format!("磨机(id={})不在当前分配中", mill_id))
            }
        }
    }
}

impl From<ValidationFailure> for ApiError {
    fn from(failure: ValidationFailure) -> Self {
        match failure {
            ValidationFailure::MillsUnavailable { mills } => ApiError::StaleAvailability { mills },
            other => ApiError::Validation {
                code: other.code().to_string(),
                message: other.message(),
            },
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::validation::StockScope;

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "Client".to_string(),
            id: "C001".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Client"));
                assert!(msg.contains("C001"));
            }
            _ => panic!("Expected NotFound"),
        }

        let api_err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert_eq!(api_err.code(), "DATABASE_CONNECTION_ERROR");

        let api_err: ApiError = RepositoryError::UniqueConstraintViolation("x".to_string()).into();
        assert_eq!(api_err.code(), "BUSINESS_RULE_VIOLATION");
    }

    #[test]
    fn test_validation_failure_conversion() {
        let api_err: ApiError = ValidationFailure::NoClientSelected.into();
        assert_eq!(api_err.code(), "NO_CLIENT");

        let api_err: ApiError = ValidationFailure::InsufficientStock {
            scope: StockScope::Coarse,
            shortfall: 10,
        }
        .into();
        assert_eq!(api_err.code(), "INSUFFICIENT_STOCK");

        let api_err: ApiError = ValidationFailure::MillsUnavailable {
            mills: vec!["Molino 2".to_string()],
        }
        .into();
        match api_err {
            ApiError::StaleAvailability { mills } => assert_eq!(mills, vec!["Molino 2"]),
            _ => panic!("Expected StaleAvailability"),
        }
    }

    #[test]
    fn test_unknown_mill_is_not_found() {
        let api_err: ApiError = AllocationError::UnknownMill("M9".to_string()).into();
        assert_eq!(api_err.code(), "NOT_FOUND");
        assert!(api_err.to_string().contains("M9"));
    }
}
