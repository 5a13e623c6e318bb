// ==========================================
// 水泥窑配料优化系统 - 应用层
// ==========================================
// 职责: 装配数据库、配置、建议生成方与 API
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
