// ==========================================
// 水泥窑配料优化系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换下层错误为用户友好的错误消息
// ==========================================

use crate::importer::error::ImportError;
use crate::oracle::error::OracleError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("调整建议已应用，不能重复应用: recommendation_id={0}")]
    RecommendationAlreadyApplied(String),

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("快照写入冲突: plant_id={plant_id}, expected_latest={expected:?}, actual_latest={actual:?}")]
    StoreWriteConflict {
        plant_id: String,
        expected: Option<i64>,
        actual: Option<i64>,
    },

    // ==========================================
    // 建议生成方错误（可恢复，不产生写入）
    // ==========================================
    #[error("建议生成超时: {timeout_ms}ms")]
    OracleTimeout { timeout_ms: u64 },

    #[error("建议生成不可用: {0}")]
    OracleUnavailable(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::StoreWriteConflict {
                plant_id,
                expected,
                actual,
            } => ApiError::StoreWriteConflict {
                plant_id,
                expected,
                actual,
            },
            RepositoryError::RecommendationAlreadyApplied(id) => {
                ApiError::RecommendationAlreadyApplied(id)
            }
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::DatabaseError(format!("外键约束违反: {}", msg))
            }
        }
    }
}

impl From<OracleError> for ApiError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::Timeout { timeout_ms } => ApiError::OracleTimeout { timeout_ms },
            OracleError::Unavailable(msg) => ApiError::OracleUnavailable(msg),
            OracleError::InvalidResponse(msg) => {
                ApiError::OracleUnavailable(format!("返回格式错误: {}", msg))
            }
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::ImportError(err.to_string())
    }
}

/// API层Result类型别名
pub type ApiResult<T> = Result<T, ApiError>;
