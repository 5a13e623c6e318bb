// ==========================================
// 水泥窑配料优化系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供命令行/上层集成调用
// ==========================================

pub mod error;
pub mod plant_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use plant_api::{LiveMetrics, PlantApi};
