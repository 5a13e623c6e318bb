// ==========================================
// 水泥窑配料优化系统 - 建议生成方错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 建议生成方调用错误（均可恢复，不产生任何写入）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("建议生成超时: timeout_ms={timeout_ms}")]
    Timeout { timeout_ms: u64 },

    #[error("建议生成服务不可用: {0}")]
    Unavailable(String),

    #[error("建议生成返回格式错误: {0}")]
    InvalidResponse(String),
}

/// 单个调整值解析错误（调用方降级为 0%，不向上抛出）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdjustmentParseError {
    #[error("字段缺失")]
    Missing,

    #[error("无法解析为数值: {0:?}")]
    Unparseable(String),

    #[error("数值非有限: {0}")]
    NonFinite(String),

    #[error("类型不支持: {0}")]
    UnsupportedType(String),
}
